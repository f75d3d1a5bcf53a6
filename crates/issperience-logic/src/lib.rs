//! Pure trophy logic for ISSperience.
//!
//! This crate holds the achievement rules that do not depend on storage,
//! rendering or a page runtime. Functions take plain data and return
//! results, so every rule is unit-testable in isolation and shared by all
//! module pages through `issperience-core`.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalogue`] | Achievement definitions, weights, ceiling, ISS trophies |
//! | [`progress`] | Locked → Unlocked state machine and score bookkeeping |
//! | [`unlock`] | Certificate gate, badge/progress projections |

pub mod catalogue;
pub mod progress;
pub mod unlock;
