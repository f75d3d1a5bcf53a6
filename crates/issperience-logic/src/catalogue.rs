//! Trophy catalogue — which achievements exist and what they are worth.
//!
//! The catalogue is data: the ISS module pages award the six trophies in
//! [`Trophy`], but any validated list of [`AchievementDef`]s can back a
//! session. The ceiling (maximum attainable score) is always the sum of the
//! catalogue weights.
//!
//! | Key | Name | Weight |
//! |-----|------|--------|
//! | `cupolaViewer` | Earth Observer | 1 |
//! | `lunarObservatory` | Lunar Explorer | 1 |
//! | `earthCheckModule` | Earth Watcher | 2 |
//! | `zeroGTraining` | Zero-G Expert | 6 |
//! | `knowledgeQuiz` | ISS Scholar | 1 |
//! | `knowledgeNBL` | NBL Trainee | 1 |
//!
//! ```
//! use issperience_logic::catalogue::{Catalogue, Trophy};
//!
//! let catalogue = Catalogue::iss();
//! assert_eq!(catalogue.ceiling(), 12);
//! assert_eq!(catalogue.weight_of(Trophy::ZeroGTraining.key()), Some(6));
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// ISS TROPHIES
// ============================================================================

/// Trophies awarded by the ISS module pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Trophy {
    /// Cupola view — 3 seconds looking at the Earth globe.
    CupolaViewer = 0,
    /// Lunar observatory — 3 seconds looking at the Moon.
    LunarObservatory = 1,
    /// Earth check — 10 seconds after satellite imagery loads.
    EarthCheckModule = 2,
    /// Zero-G training — 30 seconds in the training module.
    ZeroGTraining = 3,
    /// Knowledge center — quiz completion.
    KnowledgeQuiz = 4,
    /// Knowledge center — 3 seconds in the Neutral Buoyancy Laboratory.
    KnowledgeNbl = 5,
}

/// Static trophy metadata.
#[derive(Debug, Clone)]
pub struct TrophyInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub weight: u32,
}

impl Trophy {
    pub fn all() -> &'static [Trophy] {
        &[
            Self::CupolaViewer,
            Self::LunarObservatory,
            Self::EarthCheckModule,
            Self::ZeroGTraining,
            Self::KnowledgeQuiz,
            Self::KnowledgeNbl,
        ]
    }

    pub fn info(&self) -> TrophyInfo {
        match self {
            Self::CupolaViewer => TrophyInfo {
                key: "cupolaViewer",
                name: "Earth Observer",
                description: "Viewed Earth from the Cupola",
                weight: 1,
            },
            Self::LunarObservatory => TrophyInfo {
                key: "lunarObservatory",
                name: "Lunar Explorer",
                description: "Explored the Moon",
                weight: 1,
            },
            Self::EarthCheckModule => TrophyInfo {
                key: "earthCheckModule",
                name: "Earth Watcher",
                description: "Monitored Earth from space",
                weight: 2,
            },
            Self::ZeroGTraining => TrophyInfo {
                key: "zeroGTraining",
                name: "Zero-G Expert",
                description: "Mastered zero gravity training",
                weight: 6,
            },
            Self::KnowledgeQuiz => TrophyInfo {
                key: "knowledgeQuiz",
                name: "ISS Scholar",
                description: "Completed ISS Knowledge quiz",
                weight: 1,
            },
            Self::KnowledgeNbl => TrophyInfo {
                key: "knowledgeNBL",
                name: "NBL Trainee",
                description: "Experienced Neutral Buoyancy Laboratory",
                weight: 1,
            },
        }
    }

    /// Stable storage key for this trophy.
    pub fn key(&self) -> &'static str {
        self.info().key
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.key() == key)
    }
}

// ============================================================================
// CATALOGUE
// ============================================================================

/// One achievement a session can unlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementDef {
    /// Stable key used in storage and in award calls.
    pub id: String,
    pub display_name: String,
    pub description: String,
    /// Points added to the score the first time this achievement unlocks.
    pub weight: u32,
}

impl AchievementDef {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        weight: u32,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: description.into(),
            weight,
        }
    }
}

impl From<Trophy> for AchievementDef {
    fn from(trophy: Trophy) -> Self {
        let info = trophy.info();
        Self::new(info.key, info.name, info.description, info.weight)
    }
}

/// Validated, ordered set of achievements with a precomputed ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogue {
    entries: Vec<AchievementDef>,
    ceiling: u32,
}

impl Catalogue {
    /// Build a catalogue, rejecting empty ids, duplicates and zero weights.
    pub fn new(entries: Vec<AchievementDef>) -> Result<Self, CatalogueError> {
        if entries.is_empty() {
            return Err(CatalogueError::Empty);
        }

        let mut seen = HashSet::new();
        let mut ceiling: u32 = 0;
        for (index, def) in entries.iter().enumerate() {
            if def.id.trim().is_empty() {
                return Err(CatalogueError::EmptyId { index });
            }
            if !seen.insert(def.id.as_str()) {
                return Err(CatalogueError::DuplicateId(def.id.clone()));
            }
            if def.weight == 0 {
                return Err(CatalogueError::ZeroWeight(def.id.clone()));
            }
            ceiling = ceiling
                .checked_add(def.weight)
                .ok_or(CatalogueError::CeilingOverflow)?;
        }

        Ok(Self { entries, ceiling })
    }

    /// The canonical ISS catalogue (ceiling 12).
    pub fn iss() -> Self {
        let entries: Vec<AchievementDef> =
            Trophy::all().iter().copied().map(AchievementDef::from).collect();
        let ceiling = entries.iter().map(|d| d.weight).sum();
        Self { entries, ceiling }
    }

    pub fn get(&self, id: &str) -> Option<&AchievementDef> {
        self.entries.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn weight_of(&self, id: &str) -> Option<u32> {
        self.get(id).map(|d| d.weight)
    }

    /// Maximum attainable score.
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AchievementDef> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|d| d.id.as_str())
    }

    pub fn entries(&self) -> &[AchievementDef] {
        &self.entries
    }
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::iss()
    }
}

/// Why a catalogue was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueError {
    Empty,
    EmptyId { index: usize },
    DuplicateId(String),
    ZeroWeight(String),
    CeilingOverflow,
}

impl fmt::Display for CatalogueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogueError::Empty => write!(f, "Catalogue has no achievements"),
            CatalogueError::EmptyId { index } => {
                write!(f, "Achievement at position {} has an empty id", index)
            }
            CatalogueError::DuplicateId(id) => write!(f, "Duplicate achievement id: {}", id),
            CatalogueError::ZeroWeight(id) => {
                write!(f, "Achievement {} must be worth at least one point", id)
            }
            CatalogueError::CeilingOverflow => write!(f, "Sum of weights overflows the score"),
        }
    }
}

impl std::error::Error for CatalogueError {}
