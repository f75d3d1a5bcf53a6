//! Store configuration — storage key and achievement catalogue.
//!
//! The defaults are the ISS catalogue under `issExplorerState`. A site can
//! ship its own catalogue as JSON in the same shape as `data/trophies.json`:
//!
//! ```json
//! { "storageKey": "issExplorerState",
//!   "achievements": [ { "id": "cupolaViewer", "displayName": "Earth Observer",
//!                       "description": "Viewed Earth from the Cupola", "weight": 1 } ] }
//! ```

use std::path::Path;

use serde::Deserialize;

use issperience_logic::catalogue::{AchievementDef, Catalogue, CatalogueError};

use crate::persistence::DEFAULT_STORAGE_KEY;

/// Bundled catalogue, identical to the built-in default.
pub const BUNDLED_CATALOGUE_JSON: &str = include_str!("../../../data/trophies.json");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_key: String,
    pub catalogue: Catalogue,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            catalogue: Catalogue::iss(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(default)]
    storage_key: Option<String>,
    achievements: Vec<AchievementDef>,
}

impl StoreConfig {
    pub fn with_catalogue(catalogue: Catalogue) -> Self {
        Self {
            catalogue,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config. A missing `storageKey` uses the default.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(json)?;
        let storage_key = file
            .storage_key
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        if storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }

        Ok(Self {
            storage_key,
            catalogue: Catalogue::new(file.achievements)?,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_json(BUNDLED_CATALOGUE_JSON)
    }
}

/// Errors that can occur while reading a config
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Catalogue(CatalogueError),
    EmptyStorageKey,
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<CatalogueError> for ConfigError {
    fn from(e: CatalogueError) -> Self {
        ConfigError::Catalogue(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Catalogue(e) => write!(f, "Invalid catalogue: {}", e),
            ConfigError::EmptyStorageKey => write!(f, "Storage key must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}
