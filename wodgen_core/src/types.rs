//! Core domain types for the wodgen planner.
//!
//! This module defines the fundamental types used throughout the system:
//! - Profile enums (goal, level, intensity, WOD type) and the canonical profile
//! - Movements and training history
//! - Scored candidates produced by the ranking pass
//! - The assembled plan and its blocks

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Normalize a movement name into its lookup key (trimmed, lower-cased)
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

// ============================================================================
// Profile Enums
// ============================================================================

/// Training goal for the session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Engine,
    Strength,
    Skill,
    Mixed,
    Power,
}

impl Goal {
    pub const ALL: [Goal; 5] = [
        Goal::Engine,
        Goal::Strength,
        Goal::Skill,
        Goal::Mixed,
        Goal::Power,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Engine => "engine",
            Goal::Strength => "strength",
            Goal::Skill => "skill",
            Goal::Mixed => "mixed",
            Goal::Power => "power",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|g| g.as_str() == s)
    }
}

/// Fitness level, ordered from easiest to hardest
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Level::Beginner => 0,
            Level::Intermediate => 1,
            Level::Advanced => 2,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|l| l.as_str() == s)
    }
}

/// Broad movement category
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Monostructural,
    Gymnastics,
    Weightlifting,
    #[serde(rename = "odd-object")]
    OddObject,
    Recovery,
}

impl Modality {
    pub const ALL: [Modality; 5] = [
        Modality::Monostructural,
        Modality::Gymnastics,
        Modality::Weightlifting,
        Modality::OddObject,
        Modality::Recovery,
    ];

    /// Modalities used when a profile names no valid preference
    pub const ACTIVE: [Modality; 4] = [
        Modality::Monostructural,
        Modality::Gymnastics,
        Modality::Weightlifting,
        Modality::OddObject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Monostructural => "monostructural",
            Modality::Gymnastics => "gymnastics",
            Modality::Weightlifting => "weightlifting",
            Modality::OddObject => "odd-object",
            Modality::Recovery => "recovery",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

/// Metcon format
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WodType {
    Amrap,
    ForTime,
    Emom,
    Chipper,
    Interval,
}

impl WodType {
    pub const ALL: [WodType; 5] = [
        WodType::Amrap,
        WodType::ForTime,
        WodType::Emom,
        WodType::Chipper,
        WodType::Interval,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WodType::Amrap => "amrap",
            WodType::ForTime => "for_time",
            WodType::Emom => "emom",
            WodType::Chipper => "chipper",
            WodType::Interval => "interval",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|w| w.as_str() == s)
    }
}

/// Requested session intensity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Low,
    Moderate,
    High,
}

impl Intensity {
    pub const ALL: [Intensity; 3] = [Intensity::Low, Intensity::Moderate, Intensity::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Moderate => "moderate",
            Intensity::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|i| i.as_str() == s)
    }
}

macro_rules! string_enum {
    ($($ty:ident),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s).ok_or_else(|| format!("unknown {} '{}'", stringify!($ty), s.trim()))
            }
        })*
    };
}

string_enum!(Goal, Level, Modality, WodType, Intensity);

// ============================================================================
// Profile
// ============================================================================

/// Movements and patterns the athlete must not be given
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Limitations {
    pub avoid_patterns: BTreeSet<String>,
    pub avoid_movements: BTreeSet<String>,
}

/// Canonical athlete profile, produced by the normalizer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub goal: Goal,
    pub fitness_level: Level,
    pub session_minutes: u32,
    pub equipment_available: BTreeSet<String>,
    pub limitations: Limitations,
    pub preferred_modalities: BTreeSet<Modality>,
    pub wod_type: Option<WodType>,
    pub intensity: Intensity,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            goal: Goal::Mixed,
            fitness_level: Level::Intermediate,
            session_minutes: 45,
            equipment_available: BTreeSet::from(["none".to_string()]),
            limitations: Limitations::default(),
            preferred_modalities: Modality::ACTIVE.into_iter().collect(),
            wod_type: None,
            intensity: Intensity::Moderate,
        }
    }
}

// ============================================================================
// Movement and History Types
// ============================================================================

/// A movement library entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Movement {
    pub name: String,
    pub modality: Modality,
    pub patterns: BTreeSet<String>,
    pub difficulty: Level,
    pub effects: BTreeSet<String>,
    pub equipment: BTreeSet<String>,
    /// Scaling options, easiest first
    pub variations: Vec<String>,
}

impl Movement {
    /// Case-insensitive lookup key
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn has_effect(&self, effect: &str) -> bool {
        self.effects.contains(effect)
    }
}

/// One session from the athlete's recent training history
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct HistorySession {
    /// `YYYY-MM-DD`; missing or unparsable dates count as recent
    pub date: Option<String>,
    pub movements: Vec<String>,
    pub patterns: Vec<String>,
}

/// A library movement paired with its score from one ranking pass
#[derive(Clone, Copy, Debug)]
pub struct ScoredCandidate<'a> {
    pub movement: &'a Movement,
    pub score: f64,
}

// ============================================================================
// Plan Types
// ============================================================================

/// Minutes allotted to each block
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockMinutes {
    pub warmup: u32,
    pub strength: u32,
    pub metcon: u32,
    pub cooldown: u32,
}

/// A movement pattern and how often it appeared in the lookback window
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatternLoad {
    pub pattern: String,
    pub count: u32,
}

/// Inputs that shaped the plan, kept for display
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanContext {
    pub lookback_days: u32,
    pub recent_movements: BTreeSet<String>,
    pub top_fatigue_patterns: Vec<PatternLoad>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WarmupBlock {
    pub minutes: u32,
    pub movements: Vec<String>,
    pub prescription: Vec<String>,
}

/// Whether the strength block trains load or technique
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    Strength,
    Skill,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StrengthBlock {
    pub focus: Focus,
    pub minutes: u32,
    pub movement: String,
    pub prescription: Vec<String>,
}

/// A metcon movement with its per-round dose (e.g. "250 m", "12 reps")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetconMovement {
    pub name: String,
    pub dose: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetconBlock {
    pub wod_type: WodType,
    pub minutes: u32,
    pub title: String,
    pub movements: Vec<MetconMovement>,
    pub lines: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CooldownBlock {
    pub minutes: u32,
    pub items: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScalingNote {
    pub movement: String,
    pub easier: String,
    pub harder: String,
}

/// A complete, assembled workout session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    pub seed: u32,
    pub profile: Profile,
    pub context: PlanContext,
    pub warmup: WarmupBlock,
    pub strength: Option<StrengthBlock>,
    pub metcon: MetconBlock,
    pub cooldown: CooldownBlock,
    pub scaling: Vec<ScalingNote>,
}

impl Plan {
    /// Movement names used in the warm-up, strength/skill and metcon blocks, in order
    pub fn session_movements(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.warmup.movements.iter().map(String::as_str).collect();
        if let Some(ref strength) = self.strength {
            names.push(&strength.movement);
        }
        names.extend(self.metcon.movements.iter().map(|m| m.name.as_str()));
        names
    }
}
