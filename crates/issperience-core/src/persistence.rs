//! Save/Load of trophy progress to a durable slot.
//!
//! The whole state is one JSON blob under a fixed key, written in full on
//! every mutation. The layout stays readable by the original module pages:
//!
//! ```json
//! { "version": 1, "soundEnabled": true, "trophies": 3,
//!   "trophyProgress": { "cupolaViewer": true, "earthCheckModule": true } }
//! ```
//!
//! Loading fails open: an empty slot, unparsable JSON, a missing or
//! wrong-typed `trophies`/`trophyProgress`, or a newer save version all
//! come back as "no saved state". A wrong-typed `soundEnabled` or `version`
//! only falls back to its default.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use issperience_logic::catalogue::Catalogue;
use issperience_logic::progress::{ProgressState, Restored};

use crate::storage::{StorageError, StorageSlot};

/// Storage key shared by every module page.
pub const DEFAULT_STORAGE_KEY: &str = "issExplorerState";

/// Version number for the saved blob (increment when the layout changes)
const SAVE_VERSION: u32 = 1;

/// Settings owned by other page services but saved in the same blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub sound_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sound_enabled: true,
        }
    }
}

/// Serialized form of the blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    /// Save format version; blobs from before versioning count as 1.
    #[serde(default = "legacy_version", deserialize_with = "version_or_legacy")]
    pub version: u32,
    /// Missing, null or not a bool means the default (sound on).
    #[serde(default, deserialize_with = "lenient")]
    pub sound_enabled: Option<bool>,
    #[serde(rename = "trophies")]
    pub score: u32,
    #[serde(rename = "trophyProgress")]
    pub achievements: BTreeMap<String, bool>,
}

fn legacy_version() -> u32 {
    1
}

/// Accept any JSON value, keeping it only if it has the expected type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn version_or_legacy<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient(deserializer)?.unwrap_or_else(legacy_version))
}

impl SaveData {
    pub fn new(state: &ProgressState, preferences: Preferences) -> Self {
        Self {
            version: SAVE_VERSION,
            sound_enabled: Some(preferences.sound_enabled),
            score: state.score(),
            achievements: state.achievements().clone(),
        }
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            sound_enabled: self.sound_enabled.unwrap_or(true),
        }
    }

    /// Rebuild progress against `catalogue`.
    pub fn into_state(self, catalogue: &Catalogue) -> Restored {
        ProgressState::restore(catalogue, self.achievements, self.score)
    }
}

/// Encode a state as a blob.
pub fn encode(state: &ProgressState, preferences: Preferences) -> Result<String, SaveError> {
    Ok(serde_json::to_string(&SaveData::new(state, preferences))?)
}

/// Decode a blob, rejecting versions newer than this build understands.
pub fn decode(blob: &str) -> Result<SaveData, LoadError> {
    let data: SaveData = serde_json::from_str(blob)?;
    if data.version > SAVE_VERSION {
        return Err(LoadError::VersionMismatch {
            expected: SAVE_VERSION,
            found: data.version,
        });
    }
    Ok(data)
}

/// Reads and writes the blob through a [`StorageSlot`].
pub struct PersistenceBridge<S: StorageSlot> {
    slot: S,
    key: String,
}

impl<S: StorageSlot> PersistenceBridge<S> {
    pub fn new(slot: S) -> Self {
        Self::with_key(slot, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(slot: S, key: impl Into<String>) -> Self {
        Self {
            slot,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Write the full state, replacing whatever was saved before.
    pub fn save(&mut self, state: &ProgressState, preferences: Preferences) -> Result<(), SaveError> {
        let blob = encode(state, preferences)?;
        self.slot.write(&self.key, &blob)?;
        Ok(())
    }

    /// Load with errors reported; `Ok(None)` when nothing was saved.
    pub fn try_load(&self) -> Result<Option<SaveData>, LoadError> {
        match self.slot.read(&self.key)? {
            Some(blob) => decode(&blob).map(Some),
            None => Ok(None),
        }
    }

    /// Load, treating every failure as "no saved state".
    pub fn load(&self) -> Option<SaveData> {
        match self.try_load() {
            Ok(Some(data)) => Some(data),
            Ok(None) => {
                log::debug!("No saved trophy state under {}", self.key);
                None
            }
            Err(e) => {
                log::warn!("Ignoring saved trophy state under {}: {}", self.key, e);
                None
            }
        }
    }

    /// Delete the saved blob.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.slot.remove(&self.key)
    }
}

/// Errors that can occur while saving
#[derive(Debug)]
pub enum SaveError {
    Storage(StorageError),
    Encode(serde_json::Error),
}

impl From<StorageError> for SaveError {
    fn from(e: StorageError) -> Self {
        SaveError::Storage(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Encode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Storage(e) => write!(f, "Persistence unavailable: {}", e),
            SaveError::Encode(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for SaveError {}

/// Errors that can occur while loading
#[derive(Debug)]
pub enum LoadError {
    Storage(StorageError),
    Corrupt(serde_json::Error),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<StorageError> for LoadError {
    fn from(e: StorageError) -> Self {
        LoadError::Storage(e)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Corrupt(e)
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Storage(e) => write!(f, "Persistence unavailable: {}", e),
            LoadError::Corrupt(e) => write!(f, "Corrupt saved state: {}", e),
            LoadError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for LoadError {}
