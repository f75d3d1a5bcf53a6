//! Cross-page contract between module pages and the trophy store.
//!
//! Every module page is a separate load. Its bootstrap builds a
//! [`PageSession`] over the shared storage slot, acts on the returned
//! [`PageEntry`] (render, or redirect away from a locked certificate page),
//! and from then on reaches the store only through [`CrossPageSignal`].
//!
//! ```
//! use issperience_core::prelude::*;
//!
//! let slot = MemorySlot::new();
//! let mut cupola = PageSession::bootstrap(ModulePage::CupolaView, StoreConfig::default(), slot.clone());
//! let response = cupola.award("cupolaViewer", 1);
//! assert_eq!(response.status, AwardStatus::Unlocked);
//!
//! // A later page load sees the same progress.
//! let certificate = PageSession::bootstrap(ModulePage::AstronautCertificate, StoreConfig::default(), slot);
//! assert!(certificate.query("cupolaViewer"));
//! assert!(matches!(certificate.enter_page(), PageEntry::Redirect { to: ModulePage::Home, .. }));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use issperience_logic::catalogue::Trophy;
use issperience_logic::unlock::{GateDecision, Projection};

use crate::config::StoreConfig;
use crate::persistence::Preferences;
use crate::store::{AchievementStore, AwardObserver, AwardResult};
use crate::storage::StorageSlot;

// ============================================================================
// API SURFACE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AwardStatus {
    Unlocked,
    AlreadyUnlocked,
    UnknownId,
}

/// Reply to an award call. `score` is the score after the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardResponse {
    pub status: AwardStatus,
    pub score: u32,
    pub ceiling: u32,
}

/// Everything a page needs to draw badges and locks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub achievements: BTreeMap<String, bool>,
    pub score: u32,
    pub ceiling: u32,
}

/// The operations module pages may call.
pub trait CrossPageSignal {
    /// Report a qualifying event. Safe to call more than once.
    fn award(&mut self, id: &str, weight: u32) -> AwardResponse;

    fn query(&self, id: &str) -> bool;

    fn query_all(&self) -> Snapshot;

    /// Whether the certificate generator is reachable.
    fn is_feature_unlocked(&self) -> bool;
}

// ============================================================================
// MODULE PAGES
// ============================================================================

/// Independently loaded pages of the experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ModulePage {
    Home = 0,
    CupolaView = 1,
    LunarObservatory = 2,
    EarthCheck = 3,
    ZeroGTraining = 4,
    KnowledgeCenter = 5,
    /// Gated behind a full score.
    AstronautCertificate = 6,
}

impl ModulePage {
    pub fn all() -> &'static [ModulePage] {
        &[
            Self::Home,
            Self::CupolaView,
            Self::LunarObservatory,
            Self::EarthCheck,
            Self::ZeroGTraining,
            Self::KnowledgeCenter,
            Self::AstronautCertificate,
        ]
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Self::Home => "index",
            Self::CupolaView => "cupola-view",
            Self::LunarObservatory => "lunar-observatory",
            Self::EarthCheck => "earth-check",
            Self::ZeroGTraining => "zero-g-training",
            Self::KnowledgeCenter => "knowledge-center",
            Self::AstronautCertificate => "astronaut-certificate",
        }
    }

    /// Trophies this page can award.
    pub fn trophies(&self) -> &'static [Trophy] {
        match self {
            Self::CupolaView => &[Trophy::CupolaViewer],
            Self::LunarObservatory => &[Trophy::LunarObservatory],
            Self::EarthCheck => &[Trophy::EarthCheckModule],
            Self::ZeroGTraining => &[Trophy::ZeroGTraining],
            Self::KnowledgeCenter => &[Trophy::KnowledgeQuiz, Trophy::KnowledgeNbl],
            Self::Home | Self::AstronautCertificate => &[],
        }
    }

    pub fn is_gated(&self) -> bool {
        matches!(self, Self::AstronautCertificate)
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.slug() == slug)
    }
}

/// What a page does right after loading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PageEntry {
    Render { projection: Projection },
    /// Show `message`, then navigate to `to`.
    Redirect { to: ModulePage, message: String },
}

// ============================================================================
// PAGE SESSION
// ============================================================================

/// The store as seen by one page load.
pub struct PageSession<S: StorageSlot> {
    page: ModulePage,
    store: AchievementStore<S>,
}

impl<S: StorageSlot> PageSession<S> {
    /// Load the shared state for `page`.
    pub fn bootstrap(page: ModulePage, config: StoreConfig, slot: S) -> Self {
        let store = AchievementStore::initialize(config, slot);
        log::debug!("Page {} loaded", page.slug());
        Self { page, store }
    }

    pub fn page(&self) -> ModulePage {
        self.page
    }

    /// Render or redirect, decided from the current unlock state.
    pub fn enter_page(&self) -> PageEntry {
        if self.page.is_gated() {
            if let GateDecision::Redirect { required, earned } = self.store.certificate_gate() {
                log::info!(
                    "Certificate locked ({}/{}), redirecting to {}",
                    earned,
                    required,
                    ModulePage::Home.slug()
                );
                return PageEntry::Redirect {
                    to: ModulePage::Home,
                    message: issperience_logic::unlock::locked_message(required),
                };
            }
        }
        PageEntry::Render {
            projection: self.store.projection(),
        }
    }

    /// Award one of this page's trophies at its catalogue weight.
    pub fn award_trophy(&mut self, trophy: Trophy) -> AwardResponse {
        if !self.page.trophies().contains(&trophy) {
            log::warn!(
                "Page {} awarding {} it does not own",
                self.page.slug(),
                trophy.key()
            );
        }
        let weight = self.store.catalogue().weight_of(trophy.key()).unwrap_or(0);
        self.award(trophy.key(), weight)
    }

    pub fn projection(&self) -> Projection {
        self.store.projection()
    }

    pub fn subscribe(&mut self, observer: impl AwardObserver + 'static) {
        self.store.subscribe(observer);
    }

    pub fn preferences(&self) -> Preferences {
        self.store.preferences()
    }

    /// Sound toggle shared with the audio service.
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.store.set_sound_enabled(enabled);
    }
}

impl<S: StorageSlot> CrossPageSignal for PageSession<S> {
    fn award(&mut self, id: &str, weight: u32) -> AwardResponse {
        let ceiling = self.store.ceiling();
        match self.store.award(id, weight) {
            AwardResult::Unlocked { new_score, ceiling } => AwardResponse {
                status: AwardStatus::Unlocked,
                score: new_score,
                ceiling,
            },
            AwardResult::AlreadyUnlocked { score, ceiling } => AwardResponse {
                status: AwardStatus::AlreadyUnlocked,
                score,
                ceiling,
            },
            AwardResult::UnknownAchievement => AwardResponse {
                status: AwardStatus::UnknownId,
                score: self.store.state().score(),
                ceiling,
            },
        }
    }

    fn query(&self, id: &str) -> bool {
        self.store.query(id)
    }

    fn query_all(&self) -> Snapshot {
        let state = self.store.state();
        Snapshot {
            achievements: state.achievements().clone(),
            score: state.score(),
            ceiling: self.store.ceiling(),
        }
    }

    fn is_feature_unlocked(&self) -> bool {
        self.store.is_feature_unlocked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySlot;

    fn session(page: ModulePage, slot: &MemorySlot) -> PageSession<MemorySlot> {
        PageSession::bootstrap(page, StoreConfig::default(), slot.clone())
    }

    #[test]
    fn test_status_wire_names() {
        let json = |s: AwardStatus| serde_json::to_string(&s).unwrap();
        assert_eq!(json(AwardStatus::Unlocked), "\"unlocked\"");
        assert_eq!(json(AwardStatus::AlreadyUnlocked), "\"already-unlocked\"");
        assert_eq!(json(AwardStatus::UnknownId), "\"unknown-id\"");
    }

    #[test]
    fn test_response_shape() {
        let slot = MemorySlot::new();
        let mut page = session(ModulePage::ZeroGTraining, &slot);
        let value = serde_json::to_value(page.award("zeroGTraining", 6)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "status": "unlocked", "score": 6, "ceiling": 12 })
        );
    }

    #[test]
    fn test_unknown_id_reports_current_score() {
        let slot = MemorySlot::new();
        let mut page = session(ModulePage::CupolaView, &slot);
        page.award("cupolaViewer", 1);
        assert_eq!(
            page.award("cupolaViewr", 1),
            AwardResponse {
                status: AwardStatus::UnknownId,
                score: 1,
                ceiling: 12
            }
        );
    }

    #[test]
    fn test_certificate_redirects_until_complete() {
        let slot = MemorySlot::new();
        match session(ModulePage::AstronautCertificate, &slot).enter_page() {
            PageEntry::Redirect { to, message } => {
                assert_eq!(to, ModulePage::Home);
                assert!(message.contains("12/12"));
            }
            other => panic!("expected redirect, got {:?}", other),
        }

        let mut home = session(ModulePage::Home, &slot);
        for trophy in Trophy::all() {
            home.award(trophy.key(), trophy.info().weight);
        }
        assert!(home.is_feature_unlocked());

        match session(ModulePage::AstronautCertificate, &slot).enter_page() {
            PageEntry::Render { projection } => assert_eq!(projection.badge_text(), "12/12"),
            other => panic!("expected render, got {:?}", other),
        }
    }

    #[test]
    fn test_ungated_pages_always_render() {
        let slot = MemorySlot::new();
        for page in ModulePage::all().iter().filter(|p| !p.is_gated()) {
            assert!(matches!(
                session(*page, &slot).enter_page(),
                PageEntry::Render { .. }
            ));
        }
    }

    #[test]
    fn test_page_trophies_cover_catalogue() {
        let mut owned: Vec<Trophy> = ModulePage::all()
            .iter()
            .flat_map(|p| p.trophies().iter().copied())
            .collect();
        owned.sort_by_key(|t| *t as u8);
        assert_eq!(owned, Trophy::all().to_vec());
    }

    #[test]
    fn test_award_trophy_uses_catalogue_weight() {
        let slot = MemorySlot::new();
        let mut page = session(ModulePage::EarthCheck, &slot);
        let response = page.award_trophy(Trophy::EarthCheckModule);
        assert_eq!(response.status, AwardStatus::Unlocked);
        assert_eq!(response.score, 2);
    }

    #[test]
    fn test_slug_roundtrip() {
        for page in ModulePage::all() {
            assert_eq!(ModulePage::from_slug(page.slug()), Some(*page));
        }
        assert!(ModulePage::from_slug("nowhere").is_none());
    }
}
