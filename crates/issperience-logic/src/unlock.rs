//! Unlock policy — access decisions and display projections.
//!
//! Everything here is a pure function of a [`ProgressState`] and the
//! catalogue ceiling. The only gated feature is the astronaut certificate,
//! which opens once the score reaches the ceiling.
//!
//! ```
//! use issperience_logic::catalogue::Catalogue;
//! use issperience_logic::progress::ProgressState;
//! use issperience_logic::unlock::{certificate_gate, projection, GateDecision};
//!
//! let catalogue = Catalogue::iss();
//! let state = ProgressState::fresh(&catalogue);
//! assert_eq!(projection(&state, catalogue.ceiling()).badge_text(), "0/12");
//! assert!(matches!(
//!     certificate_gate(&state, catalogue.ceiling()),
//!     GateDecision::Redirect { required: 12, earned: 0 }
//! ));
//! ```

use serde::{Deserialize, Serialize};

use crate::progress::ProgressState;

/// Whether the gated feature is reachable.
pub fn is_feature_unlocked(state: &ProgressState, ceiling: u32) -> bool {
    state.score() >= ceiling
}

// ============================================================================
// PROJECTIONS
// ============================================================================

/// Numbers behind the trophy badge and progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub earned: u32,
    pub ceiling: u32,
    /// 0.0–100.0
    pub percentage: f32,
}

impl Projection {
    /// Badge label, e.g. `7/12`.
    pub fn badge_text(&self) -> String {
        format!("{}/{}", self.earned, self.ceiling)
    }

    pub fn is_complete(&self) -> bool {
        self.earned >= self.ceiling
    }
}

/// Project a state for badge/progress rendering.
///
/// A zero ceiling projects as complete (100%).
pub fn projection(state: &ProgressState, ceiling: u32) -> Projection {
    let earned = state.score();
    let percentage = if ceiling == 0 {
        100.0
    } else {
        (earned as f32 / ceiling as f32 * 100.0).clamp(0.0, 100.0)
    };

    Projection {
        earned,
        ceiling,
        percentage,
    }
}

/// Lock badge and button for the certificate card on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CardState {
    pub locked: bool,
    pub badge_label: &'static str,
    pub button_label: &'static str,
    pub button_enabled: bool,
}

pub fn certificate_card(state: &ProgressState, ceiling: u32) -> CardState {
    if is_feature_unlocked(state, ceiling) {
        CardState {
            locked: false,
            badge_label: "Available",
            button_label: "Enter Module",
            button_enabled: true,
        }
    } else {
        CardState {
            locked: true,
            badge_label: "Locked",
            button_label: "Coming Soon",
            button_enabled: false,
        }
    }
}

// ============================================================================
// GATE
// ============================================================================

/// What the certificate page should do on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateDecision {
    /// Score meets the ceiling; show the certificate generator.
    Render,
    /// Send the visitor back to the home view.
    Redirect { required: u32, earned: u32 },
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Render)
    }

    /// Prompt shown before redirecting, stating the required score.
    pub fn message(&self) -> Option<String> {
        match self {
            GateDecision::Render => None,
            GateDecision::Redirect { required, .. } => Some(locked_message(*required)),
        }
    }
}

pub fn certificate_gate(state: &ProgressState, ceiling: u32) -> GateDecision {
    if is_feature_unlocked(state, ceiling) {
        GateDecision::Render
    } else {
        GateDecision::Redirect {
            required: ceiling,
            earned: state.score(),
        }
    }
}

pub fn locked_message(ceiling: u32) -> String {
    format!(
        "Earn all {}/{} trophies to unlock your Astronaut Certificate.",
        ceiling, ceiling
    )
}
