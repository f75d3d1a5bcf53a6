//! Integration tests for the award state machine.
//!
//! Exercises: Catalogue → ProgressState::award → unlock policy, over the
//! ISS trophy walkthrough and seeded random award sequences.
//!
//! All tests are pure logic — no storage, no page runtime.

use issperience_logic::catalogue::{AchievementDef, Catalogue, Trophy};
use issperience_logic::progress::{AwardOutcome, ProgressState};
use issperience_logic::unlock::{certificate_gate, is_feature_unlocked, projection};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

// ── Helpers ────────────────────────────────────────────────────────────

/// Candidate ids for random sequences: every trophy plus a few typos.
fn candidate_ids(catalogue: &Catalogue) -> Vec<String> {
    let mut ids: Vec<String> = catalogue.ids().map(str::to_string).collect();
    ids.extend(
        ["earthCheckEast", "earthCheckWest", "zeroGLevel1", ""]
            .iter()
            .map(|s| s.to_string()),
    );
    ids
}

// ── Walkthrough ────────────────────────────────────────────────────────

#[test]
fn iss_walkthrough_reaches_certificate() {
    let catalogue = Catalogue::iss();
    let ceiling = catalogue.ceiling();
    let mut state = ProgressState::fresh(&catalogue);

    assert_eq!(
        state.award(&catalogue, "cupolaViewer"),
        AwardOutcome::Unlocked { score: 1, weight: 1 }
    );
    assert_eq!(
        state.award(&catalogue, "cupolaViewer"),
        AwardOutcome::AlreadyUnlocked { score: 1 }
    );
    assert_eq!(
        state.award(&catalogue, "zeroGTraining"),
        AwardOutcome::Unlocked { score: 7, weight: 6 }
    );
    assert!(!is_feature_unlocked(&state, ceiling));

    for trophy in [
        Trophy::LunarObservatory,
        Trophy::EarthCheckModule,
        Trophy::KnowledgeQuiz,
    ] {
        assert!(state.award(&catalogue, trophy.key()).is_new_unlock());
        assert!(!is_feature_unlocked(&state, ceiling));
    }
    assert_eq!(state.score(), 11);

    assert_eq!(
        state.award(&catalogue, Trophy::KnowledgeNbl.key()),
        AwardOutcome::Unlocked {
            score: 12,
            weight: 1
        }
    );
    assert!(is_feature_unlocked(&state, ceiling));
    assert!(certificate_gate(&state, ceiling).is_allowed());
    assert_eq!(projection(&state, ceiling).percentage, 100.0);
}

#[test]
fn unlock_order_does_not_matter() {
    let catalogue = Catalogue::iss();
    let mut rng = StdRng::seed_from_u64(7);
    let reference = {
        let mut s = ProgressState::fresh(&catalogue);
        for id in catalogue.ids() {
            s.award(&catalogue, id);
        }
        s
    };

    for _ in 0..20 {
        let mut ids: Vec<&str> = catalogue.ids().collect();
        ids.shuffle(&mut rng);
        let mut state = ProgressState::fresh(&catalogue);
        for id in ids {
            state.award(&catalogue, id);
        }
        assert_eq!(state, reference);
    }
}

// ── Properties ─────────────────────────────────────────────────────────

#[test]
fn score_invariant_holds_after_every_award() {
    let catalogue = Catalogue::iss();
    let ids = candidate_ids(&catalogue);

    for seed in 0..50u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = ProgressState::fresh(&catalogue);
        let steps = rng.gen_range(1..40);

        for _ in 0..steps {
            let id = ids.choose(&mut rng).unwrap();
            let before = state.clone();
            let outcome = state.award(&catalogue, id);

            assert!(
                state.is_consistent(&catalogue),
                "seed {}: score {} drifted after awarding {:?}",
                seed,
                state.score(),
                id
            );
            assert!(state.score() <= catalogue.ceiling());

            match outcome {
                AwardOutcome::Unlocked { score, weight } => {
                    assert_eq!(score, before.score() + weight);
                    assert!(!before.is_unlocked(id));
                    assert!(state.is_unlocked(id));
                }
                AwardOutcome::AlreadyUnlocked { score } => {
                    assert_eq!(score, before.score());
                    assert_eq!(state, before);
                }
                AwardOutcome::UnknownAchievement => {
                    assert!(!catalogue.contains(id));
                    assert_eq!(state, before);
                }
            }
        }
    }
}

#[test]
fn repeated_awards_add_weight_once() {
    let catalogue = Catalogue::iss();
    for def in catalogue.iter() {
        let mut state = ProgressState::fresh(&catalogue);
        for n in 0..10 {
            let outcome = state.award(&catalogue, &def.id);
            if n == 0 {
                assert!(outcome.is_new_unlock());
            } else {
                assert_eq!(
                    outcome,
                    AwardOutcome::AlreadyUnlocked { score: def.weight }
                );
            }
        }
        assert_eq!(state.score(), def.weight);
    }
}

#[test]
fn gate_closed_below_ceiling_for_every_subset() {
    let catalogue = Catalogue::new(
        [1, 1, 2, 2, 2, 1, 1]
            .iter()
            .enumerate()
            .map(|(i, w)| AchievementDef::new(format!("a{}", i), format!("A{}", i), "", *w))
            .collect(),
    )
    .unwrap();
    let ids: Vec<&str> = catalogue.ids().collect();

    for mask in 0u32..(1 << ids.len()) {
        let mut state = ProgressState::fresh(&catalogue);
        for (bit, id) in ids.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                state.award(&catalogue, id);
            }
        }
        let all = mask == (1 << ids.len()) - 1;
        assert_eq!(
            is_feature_unlocked(&state, catalogue.ceiling()),
            all,
            "mask {:07b} score {}",
            mask,
            state.score()
        );
    }
}
