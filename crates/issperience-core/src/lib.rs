//! ISSperience Core - trophy store shared by every module page
//!
//! Each module page (Cupola view, Lunar observatory, Earth check, Zero-G
//! training, Knowledge center, Astronaut certificate) is a separate load.
//! They share progress through one durable storage slot:
//!
//! - **Storage**: key-value slots (`MemorySlot`, `FileSlot`) with whole-blob
//!   atomic writes
//! - **Persistence**: JSON save/load of progress, failing open to a fresh state
//! - **Store**: idempotent awards, score bookkeeping, write-through, observers
//! - **Signal**: the award/query contract pages call, plus page entry gating
//!
//! The rules themselves (catalogue, state machine, unlock policy) live in
//! `issperience-logic`.
//!
//! # Example
//!
//! ```rust
//! use issperience_core::prelude::*;
//!
//! let slot = MemorySlot::new();
//! let mut store = AchievementStore::open(slot.clone());
//! store.award("zeroGTraining", 6);
//!
//! // Next page load
//! let store = AchievementStore::open(slot);
//! assert_eq!(store.projection().badge_text(), "6/12");
//! ```

pub mod config;
pub mod persistence;
pub mod signal;
pub mod storage;
pub mod store;

pub use issperience_logic as logic;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::config::StoreConfig;
    pub use crate::persistence::{PersistenceBridge, Preferences};
    pub use crate::signal::{
        AwardResponse, AwardStatus, CrossPageSignal, ModulePage, PageEntry, PageSession, Snapshot,
    };
    pub use crate::storage::{FileSlot, MemorySlot, StorageSlot};
    pub use crate::store::{AchievementStore, AwardEvent, AwardObserver, AwardResult};
    pub use issperience_logic::catalogue::{AchievementDef, Catalogue, Trophy};
}
