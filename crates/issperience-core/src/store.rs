//! Achievement store - the per-session source of truth for trophies.
//!
//! One store is built per page load from the durable slot. Every mutation
//! goes through [`AchievementStore::award`], [`AchievementStore::reset`] or
//! [`AchievementStore::set_sound_enabled`] and is written through before the
//! call returns. A failed write is logged and retried with the next
//! mutation; the in-memory state stays authoritative either way.

use serde::Serialize;

use issperience_logic::catalogue::Catalogue;
use issperience_logic::progress::{AwardOutcome, ProgressState, Restored};
use issperience_logic::unlock::{self, CardState, GateDecision, Projection};

use crate::config::StoreConfig;
use crate::persistence::{PersistenceBridge, Preferences, SaveError};
use crate::storage::StorageSlot;

/// Result of [`AchievementStore::award`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AwardResult {
    Unlocked { new_score: u32, ceiling: u32 },
    AlreadyUnlocked { score: u32, ceiling: u32 },
    /// The id is not in the catalogue. Nothing changed.
    UnknownAchievement,
}

/// Published to observers on every first-time unlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwardEvent {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub weight: u32,
    pub score: u32,
    pub ceiling: u32,
}

impl AwardEvent {
    /// The gated feature opened with this unlock.
    pub fn completes_catalogue(&self) -> bool {
        self.score >= self.ceiling
    }
}

/// Page services reacting to unlocks (notification toast, sound, badge).
pub trait AwardObserver {
    fn on_unlocked(&mut self, event: &AwardEvent);
}

impl<F: FnMut(&AwardEvent)> AwardObserver for F {
    fn on_unlocked(&mut self, event: &AwardEvent) {
        self(event)
    }
}

pub struct AchievementStore<S: StorageSlot> {
    catalogue: Catalogue,
    state: ProgressState,
    preferences: Preferences,
    bridge: PersistenceBridge<S>,
    observers: Vec<Box<dyn AwardObserver>>,
    /// Last write-through failed; the next mutation rewrites the full blob.
    unsaved: bool,
}

impl<S: StorageSlot> AchievementStore<S> {
    /// Load from `slot`, falling back to a fresh state. Never fails.
    pub fn initialize(config: StoreConfig, slot: S) -> Self {
        let bridge = PersistenceBridge::with_key(slot, config.storage_key);
        let catalogue = config.catalogue;

        let (state, preferences) = match bridge.load() {
            Some(data) => {
                let preferences = data.preferences();
                let restored = data.into_state(&catalogue);
                report_repairs(&restored, bridge.key());
                (restored.state, preferences)
            }
            None => (ProgressState::fresh(&catalogue), Preferences::default()),
        };

        log::info!(
            "Loaded trophy state: {}/{} trophies",
            state.score(),
            catalogue.ceiling()
        );

        Self {
            catalogue,
            state,
            preferences,
            bridge,
            observers: Vec::new(),
            unsaved: false,
        }
    }

    /// Load with the ISS catalogue under the default key.
    pub fn open(slot: S) -> Self {
        Self::initialize(StoreConfig::default(), slot)
    }

    /// Unlock `id` once, writing through on the first unlock.
    ///
    /// The catalogue weight is what gets added; a different `weight` from
    /// the caller is logged and ignored.
    pub fn award(&mut self, id: &str, weight: u32) -> AwardResult {
        let ceiling = self.ceiling();

        match self.state.award(&self.catalogue, id) {
            AwardOutcome::UnknownAchievement => {
                log::error!("Award for unknown achievement {:?} ignored", id);
                AwardResult::UnknownAchievement
            }
            AwardOutcome::AlreadyUnlocked { score } => {
                log::debug!("Achievement {} already unlocked", id);
                AwardResult::AlreadyUnlocked { score, ceiling }
            }
            AwardOutcome::Unlocked {
                score,
                weight: applied,
            } => {
                if applied != weight {
                    log::warn!(
                        "Award for {} passed weight {}, catalogue weight {} used",
                        id,
                        weight,
                        applied
                    );
                }
                self.persist();

                let event = self.event_for(id, score);
                log::info!(
                    "Trophy earned: {} ({}/{})",
                    event.display_name,
                    score,
                    ceiling
                );
                for observer in &mut self.observers {
                    observer.on_unlocked(&event);
                }

                AwardResult::Unlocked {
                    new_score: score,
                    ceiling,
                }
            }
        }
    }

    /// Whether a catalogue achievement is unlocked. Unknown ids are `false`.
    pub fn query(&self, id: &str) -> bool {
        self.catalogue.contains(id) && self.state.is_unlocked(id)
    }

    /// Read-only snapshot.
    pub fn query_all(&self) -> ProgressState {
        self.state.clone()
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Lock every achievement, zero the score, write through.
    pub fn reset(&mut self) {
        self.state.reset(&self.catalogue);
        self.persist();
        log::info!("Trophy progress reset");
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        if self.preferences.sound_enabled != enabled {
            self.preferences.sound_enabled = enabled;
            self.persist();
        }
    }

    pub fn subscribe(&mut self, observer: impl AwardObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Retry the write-through now.
    pub fn flush(&mut self) -> Result<(), SaveError> {
        self.bridge.save(&self.state, self.preferences)?;
        self.unsaved = false;
        Ok(())
    }

    /// The last write-through failed and has not been retried successfully.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn ceiling(&self) -> u32 {
        self.catalogue.ceiling()
    }

    pub fn storage_key(&self) -> &str {
        self.bridge.key()
    }

    pub fn slot(&self) -> &S {
        self.bridge.slot()
    }

    // ── Unlock policy over the current state ──

    pub fn is_feature_unlocked(&self) -> bool {
        unlock::is_feature_unlocked(&self.state, self.ceiling())
    }

    pub fn projection(&self) -> Projection {
        unlock::projection(&self.state, self.ceiling())
    }

    pub fn certificate_gate(&self) -> GateDecision {
        unlock::certificate_gate(&self.state, self.ceiling())
    }

    pub fn certificate_card(&self) -> CardState {
        unlock::certificate_card(&self.state, self.ceiling())
    }

    fn persist(&mut self) {
        match self.bridge.save(&self.state, self.preferences) {
            Ok(()) => {
                if self.unsaved {
                    log::info!("Trophy state saved after earlier failure");
                }
                self.unsaved = false;
            }
            Err(e) => {
                log::warn!(
                    "Could not save trophy state under {}: {}",
                    self.bridge.key(),
                    e
                );
                self.unsaved = true;
            }
        }
    }

    fn event_for(&self, id: &str, score: u32) -> AwardEvent {
        let (display_name, description, weight) = match self.catalogue.get(id) {
            Some(def) => (def.display_name.clone(), def.description.clone(), def.weight),
            None => (id.to_string(), String::new(), 0),
        };
        AwardEvent {
            id: id.to_string(),
            display_name,
            description,
            weight,
            score,
            ceiling: self.ceiling(),
        }
    }
}

fn report_repairs(restored: &Restored, key: &str) {
    if let Some(fix) = restored.score_correction {
        log::warn!(
            "Saved score {} under {} disagrees with unlocked trophies, using {}",
            fix.stored,
            key,
            fix.recomputed
        );
    }
    if !restored.unknown_ids.is_empty() {
        log::warn!(
            "Keeping unrecognised achievement ids from {}: {}",
            key,
            restored.unknown_ids.join(", ")
        );
    }
    if !restored.missing_ids.is_empty() {
        log::debug!(
            "Achievements not in saved state, starting locked: {}",
            restored.missing_ids.join(", ")
        );
    }
}
