//! Eligibility gates and candidate scoring.
//!
//! Every library movement either fails a hard gate (equipment, level,
//! limitations) and is dropped for the whole session, or receives an additive
//! score. Eligible movements are then ranked by score, ties keeping library
//! order.

use crate::config::ScoringWeights;
use crate::fatigue::FatigueReport;
use crate::library::MovementLibrary;
use crate::{Error, Goal, Intensity, Modality, Movement, Profile, Result, ScoredCandidate};

/// Equipment tags that every athlete has
const ALWAYS_AVAILABLE: [&str; 2] = ["none", "bodyweight"];

/// Why a movement fails eligibility, `None` if it passes every gate
pub fn ineligibility_reason(
    movement: &Movement,
    profile: &Profile,
    fatigue: &FatigueReport,
) -> Option<&'static str> {
    // Skill sessions may reach one level above the athlete
    let tolerance = u8::from(profile.goal == Goal::Skill);
    if movement.difficulty.rank() > profile.fitness_level.rank() + tolerance {
        return Some("too difficult");
    }

    let missing_equipment = movement
        .equipment
        .iter()
        .filter(|tag| !ALWAYS_AVAILABLE.contains(&tag.as_str()))
        .any(|tag| !profile.equipment_available.contains(tag));
    if missing_equipment {
        return Some("missing equipment");
    }

    let key = movement.key();
    if profile.limitations.avoid_movements.contains(&key) {
        return Some("avoided movement");
    }

    if movement
        .patterns
        .iter()
        .any(|p| profile.limitations.avoid_patterns.contains(p))
    {
        return Some("avoided pattern");
    }

    if profile.goal == Goal::Skill && fatigue.is_recent(&key) {
        return Some("recently practiced");
    }

    None
}

/// Hard eligibility check
pub fn can_do_movement(movement: &Movement, profile: &Profile, fatigue: &FatigueReport) -> bool {
    ineligibility_reason(movement, profile, fatigue).is_none()
}

/// Additive desirability score for an eligible movement
pub fn score_movement(
    movement: &Movement,
    profile: &Profile,
    fatigue: &FatigueReport,
    weights: &ScoringWeights,
) -> f64 {
    let mut score = 0.0;

    if movement.has_effect(profile.goal.as_str()) {
        score += weights.goal_match;
    }
    if profile.goal == Goal::Mixed && movement.effects.len() >= 2 {
        score += weights.mixed_compound;
    }
    if profile.preferred_modalities.contains(&movement.modality) {
        score += weights.preferred_modality;
    }
    if fatigue.is_recent(&movement.key()) {
        score -= weights.recent_penalty;
    }

    // Penalized once per overworked pattern the movement carries
    for pattern in &movement.patterns {
        score -= weights.pattern_fatigue * f64::from(fatigue.pattern_count(pattern));
    }

    if movement.difficulty == profile.fitness_level {
        score += weights.level_match;
    } else if movement.difficulty < profile.fitness_level {
        score += weights.below_level;
    }

    match profile.intensity {
        Intensity::Low => {
            if movement.has_effect("power") || movement.modality == Modality::Weightlifting {
                score -= weights.intensity_adjust;
            }
        }
        Intensity::High => {
            if movement.has_effect("power") || movement.has_effect("engine") {
                score += weights.intensity_adjust;
            }
        }
        Intensity::Moderate => {}
    }

    if movement.modality == Modality::Recovery {
        score -= weights.recovery_penalty;
    }

    score
}

/// Score every eligible movement and rank them, best first
///
/// The sort is stable so equal scores keep library order. Fails when no
/// movement passes eligibility.
pub fn rank_candidates<'a>(
    library: &'a MovementLibrary,
    profile: &Profile,
    fatigue: &FatigueReport,
    weights: &ScoringWeights,
) -> Result<Vec<ScoredCandidate<'a>>> {
    let mut ranked: Vec<ScoredCandidate<'a>> = library
        .iter()
        .filter(|movement| match ineligibility_reason(movement, profile, fatigue) {
            Some(reason) => {
                tracing::debug!("Excluding {}: {}", movement.name, reason);
                false
            }
            None => true,
        })
        .map(|movement| ScoredCandidate {
            movement,
            score: score_movement(movement, profile, fatigue, weights),
        })
        .collect();

    if ranked.is_empty() {
        return Err(Error::NoEligibleMovements);
    }

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    tracing::info!(
        "Ranked {} of {} movements (top: {} at {:.1})",
        ranked.len(),
        library.len(),
        ranked[0].movement.name,
        ranked[0].score
    );

    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::get_default_library;
    use crate::{Level, Limitations};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn full_equipment_profile() -> Profile {
        let equipment = [
            "rower", "bike", "jump rope", "ski erg", "box", "pull-up bar", "kettlebell",
            "barbell", "dumbbell", "wall ball", "sandbag", "none",
        ];
        Profile {
            fitness_level: Level::Advanced,
            equipment_available: equipment.iter().map(|s| s.to_string()).collect(),
            ..Profile::default()
        }
    }

    fn test_movement() -> Movement {
        Movement {
            name: "Test Lift".into(),
            modality: Modality::Weightlifting,
            patterns: ["hip hinge", "pull"].iter().map(|s| s.to_string()).collect(),
            difficulty: Level::Intermediate,
            effects: ["strength", "power"].iter().map(|s| s.to_string()).collect(),
            equipment: BTreeSet::from(["barbell".to_string()]),
            variations: vec![],
        }
    }

    #[test]
    fn test_level_gate() {
        let library = get_default_library();
        let profile = Profile {
            fitness_level: Level::Beginner,
            ..full_equipment_profile()
        };
        let fatigue = FatigueReport::default();
        let deadlift = library.get("deadlift").unwrap();
        assert_eq!(ineligibility_reason(deadlift, &profile, &fatigue), Some("too difficult"));

        let skill = Profile {
            goal: Goal::Skill,
            ..profile.clone()
        };
        assert!(can_do_movement(deadlift, &skill, &fatigue));
        let muscle_up = library.get("muscle-up").unwrap();
        assert!(!can_do_movement(muscle_up, &skill, &fatigue));
    }

    #[test]
    fn test_equipment_gate() {
        let library = get_default_library();
        let profile = Profile::default();
        let fatigue = FatigueReport::default();
        assert!(!can_do_movement(library.get("row").unwrap(), &profile, &fatigue));
        assert!(can_do_movement(library.get("air squat").unwrap(), &profile, &fatigue));

        let mut bodyweight = test_movement();
        bodyweight.equipment = BTreeSet::from(["bodyweight".to_string()]);
        bodyweight.difficulty = Level::Beginner;
        assert!(can_do_movement(&bodyweight, &profile, &fatigue));
    }

    #[test]
    fn test_limitation_gates() {
        let library = get_default_library();
        let fatigue = FatigueReport::default();
        let profile = Profile {
            limitations: Limitations {
                avoid_patterns: BTreeSet::from(["overhead".to_string()]),
                avoid_movements: BTreeSet::from(["deadlift".to_string()]),
            },
            ..full_equipment_profile()
        };
        assert_eq!(
            ineligibility_reason(library.get("Deadlift").unwrap(), &profile, &fatigue),
            Some("avoided movement")
        );
        assert_eq!(
            ineligibility_reason(library.get("Thruster").unwrap(), &profile, &fatigue),
            Some("avoided pattern")
        );
        assert!(can_do_movement(library.get("Back Squat").unwrap(), &profile, &fatigue));
    }

    #[test]
    fn test_skill_goal_excludes_recent() {
        let library = get_default_library();
        let mut fatigue = FatigueReport::default();
        fatigue.recent_movements.insert("pull-up".into());
        let skill = Profile {
            goal: Goal::Skill,
            ..full_equipment_profile()
        };
        let pull_up = library.get("pull-up").unwrap();
        assert_eq!(
            ineligibility_reason(pull_up, &skill, &fatigue),
            Some("recently practiced")
        );
        assert!(can_do_movement(pull_up, &full_equipment_profile(), &fatigue));
    }

    #[test]
    fn test_score_components() {
        let weights = ScoringWeights::default();
        let movement = test_movement();
        let fatigue = FatigueReport::default();

        // strength goal match + preferred modality + level match
        let profile = Profile {
            goal: Goal::Strength,
            fitness_level: Level::Intermediate,
            ..Profile::default()
        };
        let score = score_movement(&movement, &profile, &fatigue, &weights);
        assert!((score - 6.0).abs() < 1e-9, "score was {}", score);

        // mixed compound bonus, below level bonus
        let mixed = Profile {
            goal: Goal::Mixed,
            fitness_level: Level::Advanced,
            ..Profile::default()
        };
        let score = score_movement(&movement, &mixed, &fatigue, &weights);
        assert!((score - 3.4).abs() < 1e-9, "score was {}", score);
    }

    #[test]
    fn test_score_penalties() {
        let weights = ScoringWeights::default();
        let movement = test_movement();
        let profile = Profile {
            goal: Goal::Strength,
            fitness_level: Level::Intermediate,
            ..Profile::default()
        };
        let mut fatigue = FatigueReport::default();
        fatigue.recent_movements.insert("test lift".into());
        fatigue.pattern_counts.insert("hip hinge".into(), 2);
        fatigue.pattern_counts.insert("pull".into(), 1);

        let score = score_movement(&movement, &profile, &fatigue, &weights);
        // 6.0 - 4.0 - 1.3 * 3
        assert!((score - (-1.9)).abs() < 1e-9, "score was {}", score);
    }

    #[test]
    fn test_intensity_adjustments() {
        let weights = ScoringWeights::default();
        let movement = test_movement();
        let fatigue = FatigueReport::default();
        let base = Profile {
            goal: Goal::Strength,
            fitness_level: Level::Intermediate,
            ..Profile::default()
        };
        let moderate = score_movement(&movement, &base, &fatigue, &weights);
        let low = score_movement(
            &movement,
            &Profile {
                intensity: Intensity::Low,
                ..base.clone()
            },
            &fatigue,
            &weights,
        );
        let high = score_movement(
            &movement,
            &Profile {
                intensity: Intensity::High,
                ..base
            },
            &fatigue,
            &weights,
        );
        assert!((moderate - low - 1.0).abs() < 1e-9);
        assert!((high - moderate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_recovery_penalty() {
        let weights = ScoringWeights::default();
        let library = get_default_library();
        let couch = library.get("couch stretch").unwrap();
        let profile = Profile {
            fitness_level: Level::Beginner,
            ..Profile::default()
        };
        let score = score_movement(couch, &profile, &FatigueReport::default(), &weights);
        // level match, recovery not preferred by default
        assert!((score - (1.0 - 2.5)).abs() < 1e-9, "score was {}", score);
    }

    #[test]
    fn test_rank_is_sorted_and_eligible() {
        let library = get_default_library();
        let profile = Profile {
            equipment_available: ["none", "kettlebell"].iter().map(|s| s.to_string()).collect(),
            limitations: Limitations {
                avoid_patterns: BTreeSet::from(["jump".to_string()]),
                avoid_movements: BTreeSet::from(["push-up".to_string()]),
            },
            ..Profile::default()
        };
        let fatigue = FatigueReport::default();
        let ranked =
            rank_candidates(library, &profile, &fatigue, &ScoringWeights::default()).unwrap();

        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for candidate in &ranked {
            let m = candidate.movement;
            assert!(m
                .equipment
                .iter()
                .all(|e| e == "none" || profile.equipment_available.contains(e)));
            assert!(!profile.limitations.avoid_movements.contains(&m.key()));
            assert!(m.patterns.is_disjoint(&profile.limitations.avoid_patterns));
        }
    }

    #[test]
    fn test_rank_ties_keep_library_order() {
        let make = |name: &str| Movement {
            name: name.into(),
            modality: Modality::Gymnastics,
            patterns: BTreeSet::new(),
            difficulty: Level::Beginner,
            effects: BTreeSet::new(),
            equipment: BTreeSet::new(),
            variations: vec![],
        };
        let library = MovementLibrary::new(vec![make("A"), make("B"), make("C")]).unwrap();
        let ranked = rank_candidates(
            &library,
            &Profile::default(),
            &FatigueReport::default(),
            &ScoringWeights::default(),
        )
        .unwrap();
        let names: Vec<&str> = ranked.iter().map(|c| c.movement.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_rank_fails_when_nothing_eligible() {
        let library = get_default_library();
        let all_patterns: BTreeSet<String> = library
            .iter()
            .flat_map(|m| m.patterns.iter().cloned())
            .collect();
        let profile = Profile {
            limitations: Limitations {
                avoid_patterns: all_patterns,
                avoid_movements: BTreeSet::new(),
            },
            ..full_equipment_profile()
        };
        let result = rank_candidates(
            library,
            &profile,
            &FatigueReport::default(),
            &ScoringWeights::default(),
        );
        assert!(matches!(result, Err(Error::NoEligibleMovements)));
    }

    proptest! {
        #[test]
        fn test_fatigue_penalty_monotonic(
            base in 0u32..20,
            extra in 1u32..20,
            goal_idx in 0usize..5,
        ) {
            let weights = ScoringWeights::default();
            let movement = test_movement();
            let profile = Profile {
                goal: Goal::ALL[goal_idx],
                ..Profile::default()
            };
            let mut lower = FatigueReport::default();
            lower.pattern_counts.insert("hip hinge".into(), base);
            let mut higher = lower.clone();
            higher.pattern_counts.insert("hip hinge".into(), base + extra);

            let before = score_movement(&movement, &profile, &lower, &weights);
            let after = score_movement(&movement, &profile, &higher, &weights);
            prop_assert!(after <= before);
        }

        #[test]
        fn test_ranking_never_inverts_scores(
            goal_idx in 0usize..5,
            level_idx in 0usize..3,
            squat_load in 0u32..5,
            hinge_load in 0u32..5,
        ) {
            let profile = Profile {
                goal: Goal::ALL[goal_idx],
                fitness_level: Level::ALL[level_idx],
                ..full_equipment_profile()
            };
            let mut fatigue = FatigueReport::default();
            fatigue.pattern_counts.insert("squat".into(), squat_load);
            fatigue.pattern_counts.insert("hip hinge".into(), hinge_load);

            let ranked = rank_candidates(
                get_default_library(),
                &profile,
                &fatigue,
                &ScoringWeights::default(),
            ).unwrap();
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
        }
    }
}
