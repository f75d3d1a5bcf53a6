//! Progress state machine — which achievements are unlocked and the score.
//!
//! Each achievement moves `Locked → Unlocked` exactly once; the only way
//! back is a whole-state [`ProgressState::reset`]. The score is stored
//! alongside the unlock map but is never set directly: every mutation
//! updates both together so that
//!
//! ```text
//! score == Σ weight(a) for every unlocked catalogue achievement a
//! ```
//!
//! holds after every call.
//!
//! ```
//! use issperience_logic::catalogue::Catalogue;
//! use issperience_logic::progress::{AwardOutcome, ProgressState};
//!
//! let catalogue = Catalogue::iss();
//! let mut state = ProgressState::fresh(&catalogue);
//! assert_eq!(
//!     state.award(&catalogue, "cupolaViewer"),
//!     AwardOutcome::Unlocked { score: 1, weight: 1 }
//! );
//! assert_eq!(
//!     state.award(&catalogue, "cupolaViewer"),
//!     AwardOutcome::AlreadyUnlocked { score: 1 }
//! );
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalogue::Catalogue;

/// Unlock map plus the score it implies.
///
/// Ids that are not in the catalogue may be present after a restore (saved
/// by a page with a newer catalogue). They are carried along so they are not
/// lost on the next save, but they never contribute to the score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressState {
    achievements: BTreeMap<String, bool>,
    score: u32,
}

/// Result of awarding one achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AwardOutcome {
    /// First unlock; `weight` points were added.
    Unlocked { score: u32, weight: u32 },
    /// Already unlocked; nothing changed.
    AlreadyUnlocked { score: u32 },
    /// Id is not in the catalogue, or its weight does not fit the score;
    /// nothing changed.
    UnknownAchievement,
}

impl AwardOutcome {
    pub fn is_new_unlock(&self) -> bool {
        matches!(self, AwardOutcome::Unlocked { .. })
    }
}

/// State rebuilt from saved data, with what had to be repaired.
#[derive(Debug, Clone)]
pub struct Restored {
    pub state: ProgressState,
    /// Saved ids the catalogue does not know.
    pub unknown_ids: Vec<String>,
    /// Catalogue ids absent from the saved map (defaulted to locked).
    pub missing_ids: Vec<String>,
    /// Set when the saved score disagreed with the unlock map.
    pub score_correction: Option<ScoreCorrection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreCorrection {
    pub stored: u32,
    pub recomputed: u32,
}

impl ProgressState {
    /// All catalogue achievements locked, score 0.
    pub fn fresh(catalogue: &Catalogue) -> Self {
        Self {
            achievements: catalogue.ids().map(|id| (id.to_string(), false)).collect(),
            score: 0,
        }
    }

    /// Rebuild from a saved unlock map.
    ///
    /// The score is recomputed from catalogue weights; `stored_score` is only
    /// compared against it so the caller can report drift.
    pub fn restore(
        catalogue: &Catalogue,
        saved: BTreeMap<String, bool>,
        stored_score: u32,
    ) -> Restored {
        let mut state = Self::fresh(catalogue);
        let mut unknown_ids = Vec::new();

        let missing_ids = catalogue
            .ids()
            .filter(|id| !saved.contains_key(*id))
            .map(str::to_string)
            .collect();

        for (id, unlocked) in saved {
            if !catalogue.contains(&id) {
                unknown_ids.push(id.clone());
            }
            state.achievements.insert(id, unlocked);
        }

        state.score = state.expected_score(catalogue);
        let score_correction = (stored_score != state.score).then_some(ScoreCorrection {
            stored: stored_score,
            recomputed: state.score,
        });

        Restored {
            state,
            unknown_ids,
            missing_ids,
            score_correction,
        }
    }

    /// Unlock `id` if it is known and still locked.
    pub fn award(&mut self, catalogue: &Catalogue, id: &str) -> AwardOutcome {
        let Some(weight) = catalogue.weight_of(id) else {
            return AwardOutcome::UnknownAchievement;
        };

        if self.is_unlocked(id) {
            return AwardOutcome::AlreadyUnlocked { score: self.score };
        }

        // Only overflows when `catalogue` is not the one this state was built from.
        let Some(score) = self.score.checked_add(weight) else {
            return AwardOutcome::UnknownAchievement;
        };
        self.achievements.insert(id.to_string(), true);
        self.score = score;

        AwardOutcome::Unlocked { score, weight }
    }

    /// Lock everything again. Ids outside the catalogue are dropped.
    pub fn reset(&mut self, catalogue: &Catalogue) {
        *self = Self::fresh(catalogue);
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.achievements.get(id).copied().unwrap_or(false)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn achievements(&self) -> &BTreeMap<String, bool> {
        &self.achievements
    }

    pub fn unlocked_ids(&self) -> impl Iterator<Item = &str> {
        self.achievements
            .iter()
            .filter(|(_, unlocked)| **unlocked)
            .map(|(id, _)| id.as_str())
    }

    /// Number of unlocked achievements the catalogue knows about.
    pub fn unlocked_count(&self, catalogue: &Catalogue) -> usize {
        catalogue.ids().filter(|id| self.is_unlocked(id)).count()
    }

    /// Score implied by the unlock map.
    pub fn expected_score(&self, catalogue: &Catalogue) -> u32 {
        catalogue
            .iter()
            .filter(|def| self.is_unlocked(&def.id))
            .map(|def| def.weight)
            .sum()
    }

    /// Whether the stored score matches the unlock map.
    pub fn is_consistent(&self, catalogue: &Catalogue) -> bool {
        self.score == self.expected_score(catalogue) && self.score <= catalogue.ceiling()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::AchievementDef;

    fn small_catalogue() -> Catalogue {
        Catalogue::new(vec![
            AchievementDef::new("a", "A", "", 1),
            AchievementDef::new("b", "B", "", 2),
            AchievementDef::new("c", "C", "", 6),
        ])
        .unwrap()
    }

    #[test]
    fn test_fresh_is_all_locked() {
        let catalogue = Catalogue::iss();
        let state = ProgressState::fresh(&catalogue);
        assert_eq!(state.score(), 0);
        assert_eq!(state.achievements().len(), catalogue.len());
        assert!(state.achievements().values().all(|u| !u));
        assert_eq!(state.unlocked_ids().count(), 0);
    }

    #[test]
    fn test_award_adds_weight_once() {
        let catalogue = small_catalogue();
        let mut state = ProgressState::fresh(&catalogue);
        assert_eq!(
            state.award(&catalogue, "b"),
            AwardOutcome::Unlocked { score: 2, weight: 2 }
        );
        for _ in 0..5 {
            assert_eq!(
                state.award(&catalogue, "b"),
                AwardOutcome::AlreadyUnlocked { score: 2 }
            );
        }
        assert_eq!(state.score(), 2);
        assert!(state.is_unlocked("b"));
    }

    #[test]
    fn test_unknown_id_changes_nothing() {
        let catalogue = small_catalogue();
        let mut state = ProgressState::fresh(&catalogue);
        state.award(&catalogue, "a");
        let before = state.clone();
        assert_eq!(
            state.award(&catalogue, "not-a-real-id"),
            AwardOutcome::UnknownAchievement
        );
        assert_eq!(state, before);
        assert!(!state.achievements().contains_key("not-a-real-id"));
    }

    #[test]
    fn test_reset_locks_everything() {
        let catalogue = small_catalogue();
        let mut state = ProgressState::fresh(&catalogue);
        state.award(&catalogue, "a");
        state.award(&catalogue, "c");
        state.reset(&catalogue);
        assert_eq!(state, ProgressState::fresh(&catalogue));
        // Awardable again after a reset
        assert!(state.award(&catalogue, "a").is_new_unlock());
    }

    #[test]
    fn test_restore_recomputes_score() {
        let catalogue = small_catalogue();
        let saved = BTreeMap::from([("a".to_string(), true), ("c".to_string(), true)]);
        let restored = ProgressState::restore(&catalogue, saved, 99);
        assert_eq!(restored.state.score(), 7);
        assert_eq!(
            restored.score_correction,
            Some(ScoreCorrection {
                stored: 99,
                recomputed: 7
            })
        );
        assert_eq!(restored.missing_ids, vec!["b".to_string()]);
        assert!(restored.state.is_consistent(&catalogue));
    }

    #[test]
    fn test_restore_keeps_unknown_ids_out_of_score() {
        let catalogue = small_catalogue();
        let saved = BTreeMap::from([
            ("a".to_string(), true),
            ("b".to_string(), false),
            ("c".to_string(), false),
            ("earthCheckEast".to_string(), true),
        ]);
        let restored = ProgressState::restore(&catalogue, saved, 1);
        assert!(restored.score_correction.is_none());
        assert_eq!(restored.unknown_ids, vec!["earthCheckEast".to_string()]);
        assert_eq!(restored.state.score(), 1);
        assert!(restored.state.achievements().contains_key("earthCheckEast"));
        assert_eq!(restored.state.unlocked_count(&catalogue), 1);
    }

    #[test]
    fn test_restore_of_fresh_state_is_identity() {
        let catalogue = Catalogue::iss();
        let mut state = ProgressState::fresh(&catalogue);
        state.award(&catalogue, "zeroGTraining");
        let restored =
            ProgressState::restore(&catalogue, state.achievements().clone(), state.score());
        assert_eq!(restored.state, state);
        assert!(restored.unknown_ids.is_empty());
        assert!(restored.missing_ids.is_empty());
    }

    #[test]
    fn test_award_from_mismatched_catalogue_does_not_overflow() {
        let heavy = Catalogue::new(vec![AchievementDef::new("a", "A", "", u32::MAX)]).unwrap();
        let mut state = ProgressState::fresh(&heavy);
        state.award(&heavy, "a");
        assert_eq!(state.score(), u32::MAX);

        let before = state.clone();
        let other = small_catalogue();
        assert_eq!(state.award(&other, "b"), AwardOutcome::UnknownAchievement);
        assert_eq!(state, before);
        assert!(!state.is_unlocked("b"));
    }

    #[test]
    fn test_restore_locked_entry_stays_locked() {
        let catalogue = small_catalogue();
        let saved = BTreeMap::from([("a".to_string(), false)]);
        let restored = ProgressState::restore(&catalogue, saved, 0);
        assert!(!restored.state.is_unlocked("a"));
        assert_eq!(restored.state.score(), 0);
        assert_eq!(restored.missing_ids.len(), 2);
    }
}
