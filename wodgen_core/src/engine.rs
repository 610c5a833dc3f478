//! Plan engine: runs one planning pass from inputs to a finished [`Plan`].
//!
//! 1. Fatigue analysis over the lookback window
//! 2. Eligibility filtering and scoring into a ranked candidate list
//! 3. Session assembly (warm-up, strength/skill, metcon, cooldown, scaling)
//!
//! The pass performs no I/O. The same inputs and seed always produce the same
//! plan.

use crate::assembler::{assemble_session, block_minutes, AssemblyContext};
use crate::config::Config;
use crate::fatigue::analyze_fatigue;
use crate::library::MovementLibrary;
use crate::rng::SeededRng;
use crate::scoring::rank_candidates;
use crate::{HistorySession, Plan, PlanContext, Profile, Result};
use chrono::{Datelike, NaiveDate};

/// Fatigue patterns listed in the plan context
const TOP_PATTERN_LIMIT: usize = 5;

/// Everything one planning run depends on
#[derive(Clone, Debug)]
pub struct PlanInputs<'a> {
    pub profile: Profile,
    pub history: &'a [HistorySession],
    pub library: &'a MovementLibrary,
    pub lookback_days: u32,
    pub seed: u32,
    /// Day the lookback window is measured from
    pub today: NaiveDate,
}

/// Seed derived from a calendar date as `YYYYMMDD`
pub fn seed_for_date(date: NaiveDate) -> u32 {
    let year = u32::try_from(date.year()).unwrap_or(0);
    year * 10_000 + date.month() * 100 + date.day()
}

/// Generate a complete plan, or fail without producing one
pub fn generate_plan(inputs: &PlanInputs<'_>, config: &Config) -> Result<Plan> {
    let lookback_days = inputs.lookback_days.max(1);
    let profile = &inputs.profile;

    tracing::info!(
        "Planning {} min {} session (level {}, seed {})",
        profile.session_minutes,
        profile.goal,
        profile.fitness_level,
        inputs.seed
    );

    let fatigue = analyze_fatigue(inputs.history, inputs.library, lookback_days, inputs.today);
    let ranked = rank_candidates(inputs.library, profile, &fatigue, &config.scoring)?;

    let ctx = AssemblyContext {
        library: inputs.library,
        ranked: &ranked,
        profile,
        minutes: block_minutes(profile.session_minutes),
        pick_window: config.planner.pick_window,
    };
    let mut rng = SeededRng::new(inputs.seed);
    let session = assemble_session(&ctx, &mut rng)?;

    Ok(Plan {
        seed: inputs.seed,
        profile: profile.clone(),
        context: PlanContext {
            lookback_days,
            top_fatigue_patterns: fatigue.top_patterns(TOP_PATTERN_LIMIT),
            recent_movements: fatigue.recent_movements,
        },
        warmup: session.warmup,
        strength: session.strength,
        metcon: session.metcon,
        cooldown: session.cooldown,
        scaling: session.scaling,
    })
}
