//! Session assembly: turns a ranked candidate list into the four blocks.
//!
//! One `used` set of normalized movement names is threaded through the
//! warm-up, strength/skill and metcon builders so that no movement appears
//! twice in a session. The cooldown draws from the library's recovery
//! movements independently of the ranking.

use crate::library::MovementLibrary;
use crate::rng::SeededRng;
use crate::types::*;
use crate::{Error, Result};
use std::collections::HashSet;

/// Warm-up names used when the library offers nothing suitable
pub static DEFAULT_WARMUP: [&str; 3] = ["easy cardio", "air squat", "plank"];

/// Cooldown used when the library has fewer than two recovery movements
pub const DEFAULT_COOLDOWN: [&str; 3] = [
    "Couch stretch: 1 min each side",
    "Child's pose: 2 min",
    "Box breathing (4s in, 4s hold, 4s out, 4s hold): 2 min",
];

const BREATHING_CLOSER: &str = "Box breathing (4s in, 4s hold, 4s out, 4s hold): 2 min";
const DEFAULT_EASIER: &str = "Reduce load, range of motion, or reps";
const DEFAULT_HARDER: &str = "Add load, speed, or range of motion";

/// Block minutes keyed by the upper bound of each session-length tier
const BLOCK_MINUTE_TIERS: [(u32, BlockMinutes); 3] = [
    (
        30,
        BlockMinutes {
            warmup: 6,
            strength: 8,
            metcon: 12,
            cooldown: 4,
        },
    ),
    (
        45,
        BlockMinutes {
            warmup: 8,
            strength: 10,
            metcon: 18,
            cooldown: 6,
        },
    ),
    (
        60,
        BlockMinutes {
            warmup: 10,
            strength: 15,
            metcon: 25,
            cooldown: 8,
        },
    ),
];

const LONG_SESSION_MINUTES: BlockMinutes = BlockMinutes {
    warmup: 12,
    strength: 20,
    metcon: 35,
    cooldown: 10,
};

/// Engine sessions this short skip the strength block
const SHORT_ENGINE_SESSION: u32 = 35;

static CARDIO: [Modality; 1] = [Modality::Monostructural];
static GYMNASTICS: [Modality; 1] = [Modality::Gymnastics];
static LOADED: [Modality; 2] = [Modality::Weightlifting, Modality::OddObject];
static WARMUP_ACCESSORY: [Modality; 3] =
    [Modality::Gymnastics, Modality::Recovery, Modality::OddObject];
static SKILL_FOCUS: [Modality; 2] = [Modality::Gymnastics, Modality::Weightlifting];

const ENGINE_WODS: [WodType; 3] = [WodType::Interval, WodType::Amrap, WodType::ForTime];
const STRENGTH_WODS: [WodType; 3] = [WodType::Emom, WodType::ForTime, WodType::Amrap];
const SKILL_WODS: [WodType; 3] = [WodType::Emom, WodType::Amrap, WodType::Interval];

/// Minutes for each block of a session of the given length
pub fn block_minutes(session_minutes: u32) -> BlockMinutes {
    BLOCK_MINUTE_TIERS
        .iter()
        .find(|(limit, _)| session_minutes <= *limit)
        .map(|(_, minutes)| *minutes)
        .unwrap_or(LONG_SESSION_MINUTES)
}

/// WOD formats a goal draws from when the profile names none
pub fn wod_candidates(goal: Goal) -> &'static [WodType] {
    match goal {
        Goal::Engine => &ENGINE_WODS,
        Goal::Strength | Goal::Power => &STRENGTH_WODS,
        Goal::Skill => &SKILL_WODS,
        Goal::Mixed => &WodType::ALL,
    }
}

/// Pick one movement among the best remaining candidates
///
/// Skips used movements, modalities outside `allowed` and recovery movements
/// unless `allow_recovery`. Chooses uniformly among the first `window`
/// survivors in rank order and marks the choice as used.
pub fn pick_best<'a>(
    ranked: &[ScoredCandidate<'a>],
    used: &mut HashSet<String>,
    allowed: Option<&[Modality]>,
    allow_recovery: bool,
    window: usize,
    rng: &mut SeededRng,
) -> Option<&'a Movement> {
    let survivors: Vec<&'a Movement> = ranked
        .iter()
        .map(|c| c.movement)
        .filter(|m| !used.contains(&m.key()))
        .filter(|m| allowed.map_or(true, |a| a.contains(&m.modality)))
        .filter(|m| allow_recovery || m.modality != Modality::Recovery)
        .take(window.max(1))
        .collect();

    let chosen = *rng.choice(&survivors)?;
    used.insert(chosen.key());
    Some(chosen)
}

/// Tunables and inputs shared by the block builders
pub struct AssemblyContext<'a, 'r> {
    pub library: &'a MovementLibrary,
    pub ranked: &'r [ScoredCandidate<'a>],
    pub profile: &'r Profile,
    pub minutes: BlockMinutes,
    pub pick_window: usize,
}

impl<'a, 'r> AssemblyContext<'a, 'r> {
    fn pick(
        &self,
        pool: &[ScoredCandidate<'a>],
        used: &mut HashSet<String>,
        allowed: Option<&[Modality]>,
        allow_recovery: bool,
        rng: &mut SeededRng,
    ) -> Option<&'a Movement> {
        pick_best(pool, used, allowed, allow_recovery, self.pick_window, rng)
    }
}

/// All blocks of one session, before they are wrapped into a plan
#[derive(Clone, Debug, PartialEq)]
pub struct AssembledSession {
    pub warmup: WarmupBlock,
    pub strength: Option<StrengthBlock>,
    pub metcon: MetconBlock,
    pub cooldown: CooldownBlock,
    pub scaling: Vec<ScalingNote>,
}

/// Build every block in order: warm-up, strength/skill, metcon, cooldown
pub fn assemble_session(
    ctx: &AssemblyContext<'_, '_>,
    rng: &mut SeededRng,
) -> Result<AssembledSession> {
    let mut used = HashSet::new();

    let warmup = build_warmup(ctx, &mut used, rng);
    let strength = build_strength(ctx, &mut used, rng);
    let metcon = build_metcon(ctx, &mut used, rng)?;
    let cooldown = build_cooldown(ctx.library, ctx.minutes.cooldown, rng);
    let scaling = scaling_notes(ctx.library, &warmup, strength.as_ref(), &metcon);

    Ok(AssembledSession {
        warmup,
        strength,
        metcon,
        cooldown,
        scaling,
    })
}

fn is_warmup_friendly(movement: &Movement) -> bool {
    if movement.has_effect("power") || movement.has_effect("mental") {
        return false;
    }
    let loaded = matches!(
        movement.modality,
        Modality::Weightlifting | Modality::OddObject
    );
    if loaded && movement.difficulty != Level::Beginner {
        return false;
    }
    !movement.key().contains("burpee")
}

/// First default name not already in the session, marked as used
fn warmup_default<'d>(
    candidates: impl IntoIterator<Item = &'d &'static str>,
    used: &mut HashSet<String>,
) -> Option<String> {
    candidates
        .into_iter()
        .find_map(|name| used.insert(normalize_name(name)).then(|| name.to_string()))
}

pub fn build_warmup(
    ctx: &AssemblyContext<'_, '_>,
    used: &mut HashSet<String>,
    rng: &mut SeededRng,
) -> WarmupBlock {
    let warm_pool: Vec<ScoredCandidate<'_>> = ctx
        .ranked
        .iter()
        .copied()
        .filter(|c| is_warmup_friendly(c.movement))
        .collect();
    let pool: &[ScoredCandidate<'_>] = if warm_pool.is_empty() {
        tracing::debug!("No warm-up friendly movements, using full ranking");
        ctx.ranked
    } else {
        &warm_pool
    };

    let cardio = ctx
        .pick(pool, used, Some(&CARDIO[..]), false, rng)
        .map(|m| m.name.clone())
        .or_else(|| warmup_default(&DEFAULT_WARMUP[..1], used));

    // An empty accessory slot tries its own default first, then the other
    // one. It stays empty only when both are already in the session.
    let accessory_defaults = &DEFAULT_WARMUP[1..];
    let accessories: Vec<String> = (0..accessory_defaults.len())
        .filter_map(|slot| {
            ctx.pick(pool, used, Some(&WARMUP_ACCESSORY[..]), true, rng)
                .map(|m| m.name.clone())
                .or_else(|| {
                    let order = accessory_defaults
                        .iter()
                        .cycle()
                        .skip(slot)
                        .take(accessory_defaults.len());
                    warmup_default(order, used)
                })
        })
        .collect();

    let minutes = ctx.minutes.warmup;
    let mut prescription = Vec::new();
    if let Some(ref cardio) = cardio {
        prescription.push(format!(
            "{} min easy {}, building pace",
            (minutes / 2).max(2),
            cardio
        ));
    }
    if !accessories.is_empty() {
        let reps: Vec<String> = accessories.iter().map(|a| format!("10 {}", a)).collect();
        prescription.push(format!("Then 2 rounds: {}", reps.join(", ")));
    }

    let movements: Vec<String> = cardio.into_iter().chain(accessories).collect();
    tracing::debug!("Warm-up: {:?}", movements);

    WarmupBlock {
        minutes,
        movements,
        prescription,
    }
}

pub fn build_strength(
    ctx: &AssemblyContext<'_, '_>,
    used: &mut HashSet<String>,
    rng: &mut SeededRng,
) -> Option<StrengthBlock> {
    let profile = ctx.profile;
    if profile.goal == Goal::Engine && profile.session_minutes <= SHORT_ENGINE_SESSION {
        tracing::debug!("Short engine session, skipping strength block");
        return None;
    }

    let (focus, allowed): (Focus, &[Modality]) = if profile.goal == Goal::Skill {
        (Focus::Skill, &SKILL_FOCUS[..])
    } else {
        (Focus::Strength, &LOADED[..])
    };

    let Some(movement) = ctx.pick(ctx.ranked, used, Some(allowed), false, rng) else {
        tracing::debug!("No {:?} candidate left, skipping strength block", focus);
        return None;
    };

    let minutes = ctx.minutes.strength;
    let prescription = match focus {
        Focus::Strength => {
            let (scheme, rest) = match profile.fitness_level {
                Level::Beginner => ("5x5 @ RPE 7", "2:00"),
                Level::Intermediate => ("5x3 @ RPE 8", "2:30"),
                Level::Advanced => ("6x2 @ RPE 8-9", "3:00"),
            };
            vec![
                format!("{}: {}", movement.name, scheme),
                format!("Rest {} between sets", rest),
            ]
        }
        Focus::Skill => vec![
            format!(
                "Every 2:00 x {}: 45 sec quality practice of {}",
                (minutes / 2).max(3),
                movement.name
            ),
            "Stop each set before technique breaks down".to_string(),
        ],
    };

    Some(StrengthBlock {
        focus,
        minutes,
        movement: movement.name.clone(),
        prescription,
    })
}

/// Per-round dose from modality, name and difficulty
pub fn metcon_dose(movement: &Movement) -> String {
    let name = movement.key();
    match movement.modality {
        Modality::Monostructural => {
            if name.contains("row") || name.contains("ski") {
                "250 m".into()
            } else if name.contains("bike") {
                "12 cal".into()
            } else if name.contains("run") {
                "200 m".into()
            } else if name.contains("rope") || name.contains("under") {
                "40 reps".into()
            } else {
                "45 sec".into()
            }
        }
        Modality::Weightlifting | Modality::OddObject => {
            if name.contains("carry") {
                return "50 m".into();
            }
            let reps = match movement.difficulty {
                Level::Beginner => 12,
                Level::Intermediate => 10,
                Level::Advanced => 6,
            };
            format!("{} reps", reps)
        }
        Modality::Gymnastics => {
            let reps = match movement.difficulty {
                Level::Beginner => 15,
                Level::Intermediate => 10,
                Level::Advanced => 5,
            };
            format!("{} reps", reps)
        }
        Modality::Recovery => "45 sec".into(),
    }
}

pub fn build_metcon(
    ctx: &AssemblyContext<'_, '_>,
    used: &mut HashSet<String>,
    rng: &mut SeededRng,
) -> Result<MetconBlock> {
    let profile = ctx.profile;
    let wod_type = match profile.wod_type {
        Some(explicit) => explicit,
        None => rng
            .choice(wod_candidates(profile.goal))
            .copied()
            .unwrap_or(WodType::Amrap),
    };
    tracing::info!("Metcon format: {}", wod_type);

    let target = if profile.session_minutes > 45 { 4 } else { 3 };
    let slots: [&[Modality]; 3] = [&CARDIO[..], &GYMNASTICS[..], &LOADED[..]];

    let mut picks: Vec<&Movement> = slots
        .iter()
        .filter_map(|allowed| ctx.pick(ctx.ranked, used, Some(*allowed), false, rng))
        .collect();
    while picks.len() < target {
        match ctx.pick(ctx.ranked, used, None, false, rng) {
            Some(movement) => picks.push(movement),
            None => break,
        }
    }

    if picks.is_empty() {
        return Err(Error::EmptyMetcon);
    }

    let movements: Vec<MetconMovement> = picks
        .iter()
        .map(|m| MetconMovement {
            name: m.name.clone(),
            dose: metcon_dose(m),
        })
        .collect();

    Ok(render_metcon(wod_type, ctx.minutes.metcon, movements))
}

fn render_metcon(wod_type: WodType, block_minutes: u32, movements: Vec<MetconMovement>) -> MetconBlock {
    let count = movements.len().max(1) as u32;
    let listed = || -> Vec<String> {
        movements
            .iter()
            .map(|m| format!("{} {}", m.dose, m.name))
            .collect()
    };

    let (minutes, title, lines) = match wod_type {
        WodType::Amrap => (
            block_minutes,
            format!("AMRAP {} min", block_minutes),
            listed(),
        ),
        WodType::ForTime => {
            let rounds = if count <= 3 { 4 } else { 3 };
            (
                block_minutes,
                format!("For time: {} rounds (cap {} min)", rounds, block_minutes),
                listed(),
            )
        }
        WodType::Emom => {
            let floor = (4 * count).max(block_minutes);
            let total = floor.div_ceil(count) * count;
            let lines = movements
                .iter()
                .enumerate()
                .map(|(i, m)| {
                    format!("Min {} (every {}): {} {}", i + 1, count, m.dose, m.name)
                })
                .collect();
            (total, format!("EMOM {} min", total), lines)
        }
        WodType::Chipper => (
            block_minutes,
            format!("Chipper (cap {} min): done once, in order", block_minutes),
            movements
                .iter()
                .enumerate()
                .map(|(i, m)| format!("{}. {} {}", i + 1, m.dose, m.name))
                .collect(),
        ),
        WodType::Interval => {
            let rounds = (block_minutes / 3).max(1);
            (
                rounds * 3,
                format!("{} rounds: 2:00 work / 1:00 rest", rounds),
                listed(),
            )
        }
    };

    MetconBlock {
        wod_type,
        minutes,
        title,
        movements,
        lines,
    }
}

/// Two shuffled recovery movements plus a breathing closer
pub fn build_cooldown(library: &MovementLibrary, minutes: u32, rng: &mut SeededRng) -> CooldownBlock {
    let mut recovery: Vec<&Movement> = library
        .iter()
        .filter(|m| m.modality == Modality::Recovery)
        .collect();
    rng.shuffle(&mut recovery);

    let items = match recovery.as_slice() {
        [first, second, ..] => vec![
            format!("{}: 2 min", first.name),
            format!("{}: 2 min", second.name),
            BREATHING_CLOSER.to_string(),
        ],
        _ => DEFAULT_COOLDOWN.iter().map(|s| s.to_string()).collect(),
    };

    CooldownBlock { minutes, items }
}

/// Easier/harder options for every distinct movement outside the cooldown
pub fn scaling_notes(
    library: &MovementLibrary,
    warmup: &WarmupBlock,
    strength: Option<&StrengthBlock>,
    metcon: &MetconBlock,
) -> Vec<ScalingNote> {
    let names = warmup
        .movements
        .iter()
        .chain(strength.map(|s| &s.movement))
        .chain(metcon.movements.iter().map(|m| &m.name));

    let mut seen = HashSet::new();
    names
        .filter(|name| seen.insert(normalize_name(name)))
        .map(|name| {
            let variations = library
                .get(name)
                .map(|m| m.variations.as_slice())
                .unwrap_or_default();
            ScalingNote {
                movement: name.clone(),
                easier: variations
                    .first()
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_EASIER.to_string()),
                harder: variations
                    .last()
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_HARDER.to_string()),
            }
        })
        .collect()
}
