//! Movement library: name-indexed movements plus the built-in default set.

use crate::normalize::string_set;
use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Cached default library - built once and reused across all runs
static DEFAULT_LIBRARY: Lazy<MovementLibrary> = Lazy::new(build_default_library);

/// Get a reference to the cached default library
pub fn get_default_library() -> &'static MovementLibrary {
    &DEFAULT_LIBRARY
}

/// Read-only movement library with case-insensitive lookup by name
#[derive(Clone, Debug)]
pub struct MovementLibrary {
    movements: Vec<Movement>,
    index: HashMap<String, usize>,
}

impl MovementLibrary {
    /// Build a library from movements in their authored order
    ///
    /// Fails on an empty list. When two movements share a name, lookups
    /// resolve to the first one; `validate` reports the duplicate.
    pub fn new(movements: Vec<Movement>) -> Result<Self> {
        if movements.is_empty() {
            return Err(Error::MalformedInput("movement library is empty".into()));
        }
        Ok(Self::indexed(movements))
    }

    fn indexed(movements: Vec<Movement>) -> Self {
        let mut index = HashMap::with_capacity(movements.len());
        for (i, movement) in movements.iter().enumerate() {
            index.entry(movement.key()).or_insert(i);
        }
        Self { movements, index }
    }

    /// Parse a library from a JSON array of movement records
    pub fn from_json(value: &Value) -> Result<Self> {
        let entries = value.as_array().ok_or_else(|| {
            Error::MalformedInput("movement library must be a JSON array".into())
        })?;

        let movements = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let obj = entry.as_object().ok_or_else(|| {
                    Error::MalformedInput(format!("movement #{} is not an object", i + 1))
                })?;
                parse_movement(obj, i)
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(movements)
    }

    /// Look up a movement by name (trimmed, case-insensitive)
    pub fn get(&self, name: &str) -> Option<&Movement> {
        self.index
            .get(&normalize_name(name))
            .and_then(|&i| self.movements.get(i))
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn iter(&self) -> impl Iterator<Item = &Movement> {
        self.movements.iter()
    }

    pub fn len(&self) -> usize {
        self.movements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }

    /// Number of movements per modality, in modality order
    pub fn modality_counts(&self) -> Vec<(Modality, usize)> {
        Modality::ALL
            .into_iter()
            .map(|m| (m, self.movements.iter().filter(|mv| mv.modality == m).count()))
            .collect()
    }

    /// Validate the library for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen: HashMap<String, &str> = HashMap::new();

        for movement in &self.movements {
            let key = movement.key();
            if key.is_empty() {
                errors.push("Movement has empty name".to_string());
                continue;
            }
            if let Some(first) = seen.insert(key, &movement.name) {
                errors.push(format!(
                    "Duplicate movement name '{}' (already defined as '{}')",
                    movement.name, first
                ));
            }
            if movement.variations.iter().any(|v| v.trim().is_empty()) {
                errors.push(format!("Movement '{}' has an empty variation", movement.name));
            }
        }

        if !self.movements.iter().any(|m| m.modality == Modality::Recovery) {
            tracing::warn!("Library has no recovery movements; cooldown will use defaults");
        }

        errors
    }
}

fn parse_movement(obj: &Map<String, Value>, position: usize) -> Result<Movement> {
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            Error::MalformedInput(format!("movement #{} has no name", position + 1))
        })?
        .to_string();

    let modality_raw = obj.get("modality").and_then(Value::as_str).unwrap_or("");
    let modality = Modality::parse(modality_raw).ok_or_else(|| {
        Error::MalformedInput(format!(
            "movement '{}' has unknown modality '{}'",
            name, modality_raw
        ))
    })?;

    let difficulty = match obj.get("difficulty").and_then(Value::as_str) {
        None => Level::Beginner,
        Some(raw) => Level::parse(raw).ok_or_else(|| {
            Error::MalformedInput(format!(
                "movement '{}' has unknown difficulty '{}'",
                name, raw
            ))
        })?,
    };

    let variations = obj
        .get("variations")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(Movement {
        name,
        modality,
        patterns: string_set(obj.get("patterns")),
        difficulty,
        effects: string_set(obj.get("effects")),
        equipment: string_set(obj.get("equipment")),
        variations,
    })
}

fn movement(
    name: &str,
    modality: Modality,
    difficulty: Level,
    patterns: &[&str],
    effects: &[&str],
    equipment: &[&str],
    variations: &[&str],
) -> Movement {
    Movement {
        name: name.into(),
        modality,
        patterns: patterns.iter().map(|s| s.to_string()).collect(),
        difficulty,
        effects: effects.iter().map(|s| s.to_string()).collect(),
        equipment: equipment.iter().map(|s| s.to_string()).collect(),
        variations: variations.iter().map(|s| s.to_string()).collect(),
    }
}

/// Builds the built-in movement library
///
/// **Note**: For production use, prefer `get_default_library()` which returns a
/// cached reference.
pub fn build_default_library() -> MovementLibrary {
    use Level::*;
    use Modality::*;

    let movements = vec![
        // ====================================================================
        // Monostructural
        // ====================================================================
        movement(
            "Row",
            Monostructural,
            Beginner,
            &["pull", "hip hinge"],
            &["engine", "mixed"],
            &["rower"],
            &["easy pace, short strokes", "steady damper 5", "sprint damper 7+"],
        ),
        movement(
            "Assault Bike",
            Monostructural,
            Beginner,
            &["cyclical"],
            &["engine", "mental"],
            &["bike"],
            &["legs only, easy pace", "arms and legs", "max effort calories"],
        ),
        movement(
            "Run",
            Monostructural,
            Beginner,
            &["cyclical", "single leg"],
            &["engine", "mixed"],
            &["none"],
            &["walk/jog intervals", "steady run", "hill repeats"],
        ),
        movement(
            "Jump Rope",
            Monostructural,
            Beginner,
            &["jump"],
            &["engine", "skill"],
            &["jump rope"],
            &["single-unders", "alternating feet", "double-unders"],
        ),
        movement(
            "Ski Erg",
            Monostructural,
            Intermediate,
            &["pull", "hip hinge"],
            &["engine"],
            &["ski erg"],
            &["arms only", "full hinge pulls", "sprint pulls"],
        ),
        // ====================================================================
        // Gymnastics
        // ====================================================================
        movement(
            "Air Squat",
            Gymnastics,
            Beginner,
            &["squat"],
            &["engine", "mixed"],
            &["none"],
            &["box squat", "air squat", "jumping squat"],
        ),
        movement(
            "Push-Up",
            Gymnastics,
            Beginner,
            &["push", "horizontal push"],
            &["strength", "mixed"],
            &["none"],
            &["incline push-up", "push-up", "deficit push-up"],
        ),
        movement(
            "Sit-Up",
            Gymnastics,
            Beginner,
            &["core", "trunk flexion"],
            &["mixed"],
            &["none"],
            &["crunch", "abmat sit-up", "weighted sit-up"],
        ),
        movement(
            "Burpee",
            Gymnastics,
            Beginner,
            &["push", "squat", "jump"],
            &["engine", "mental"],
            &["none"],
            &["step-back burpee", "burpee", "bar-facing burpee"],
        ),
        movement(
            "Box Jump",
            Gymnastics,
            Intermediate,
            &["jump", "squat"],
            &["power", "engine"],
            &["box"],
            &["step-up", "box jump", "box jump over"],
        ),
        movement(
            "Pull-Up",
            Gymnastics,
            Intermediate,
            &["pull", "vertical pull"],
            &["strength", "skill"],
            &["pull-up bar"],
            &["ring row", "banded pull-up", "chest-to-bar pull-up"],
        ),
        movement(
            "Toes-to-Bar",
            Gymnastics,
            Intermediate,
            &["core", "pull"],
            &["skill", "mixed"],
            &["pull-up bar"],
            &["hanging knee raise", "kipping toes-to-bar", "strict toes-to-bar"],
        ),
        movement(
            "Handstand Push-Up",
            Gymnastics,
            Advanced,
            &["push", "overhead"],
            &["skill", "strength"],
            &["none"],
            &["pike push-up", "box handstand push-up", "deficit handstand push-up"],
        ),
        movement(
            "Muscle-Up",
            Gymnastics,
            Advanced,
            &["pull", "push", "vertical pull"],
            &["skill", "power"],
            &["pull-up bar"],
            &["jumping muscle-up", "kipping bar muscle-up", "strict ring muscle-up"],
        ),
        // ====================================================================
        // Weightlifting
        // ====================================================================
        movement(
            "Kettlebell Swing",
            Weightlifting,
            Beginner,
            &["hip hinge"],
            &["engine", "power"],
            &["kettlebell"],
            &["russian swing, light bell", "russian swing", "american swing"],
        ),
        movement(
            "Deadlift",
            Weightlifting,
            Intermediate,
            &["hip hinge"],
            &["strength"],
            &["barbell"],
            &["kettlebell deadlift", "conventional deadlift", "deficit deadlift"],
        ),
        movement(
            "Back Squat",
            Weightlifting,
            Intermediate,
            &["squat"],
            &["strength"],
            &["barbell"],
            &["goblet squat", "back squat", "pause back squat"],
        ),
        movement(
            "Strict Press",
            Weightlifting,
            Beginner,
            &["push", "overhead"],
            &["strength"],
            &["barbell"],
            &["dumbbell press", "strict press", "push press"],
        ),
        movement(
            "Thruster",
            Weightlifting,
            Intermediate,
            &["squat", "push", "overhead"],
            &["engine", "strength", "mental"],
            &["barbell"],
            &["dumbbell thruster", "barbell thruster", "cluster"],
        ),
        movement(
            "Dumbbell Snatch",
            Weightlifting,
            Intermediate,
            &["hip hinge", "overhead"],
            &["power", "engine"],
            &["dumbbell"],
            &["dumbbell high pull", "hang dumbbell snatch", "alternating dumbbell snatch"],
        ),
        movement(
            "Power Clean",
            Weightlifting,
            Advanced,
            &["hip hinge", "pull"],
            &["power", "skill", "strength"],
            &["barbell"],
            &["hang power clean", "power clean", "squat clean"],
        ),
        // ====================================================================
        // Odd-object
        // ====================================================================
        movement(
            "Farmer Carry",
            OddObject,
            Beginner,
            &["carry", "core"],
            &["strength", "mental"],
            &["kettlebell"],
            &["light suitcase carry", "farmer carry", "heavy farmer carry"],
        ),
        movement(
            "Wall Ball",
            OddObject,
            Beginner,
            &["squat", "push", "overhead"],
            &["engine", "mixed"],
            &["wall ball"],
            &["light ball, low target", "wall ball", "heavy ball, high target"],
        ),
        movement(
            "Sandbag Clean",
            OddObject,
            Intermediate,
            &["hip hinge", "squat"],
            &["strength", "power"],
            &["sandbag"],
            &["sandbag deadlift", "sandbag clean", "sandbag clean to shoulder"],
        ),
        // ====================================================================
        // Recovery
        // ====================================================================
        movement(
            "Couch Stretch",
            Recovery,
            Beginner,
            &["mobility", "hip"],
            &["mobility"],
            &["none"],
            &["half-kneeling hip flexor stretch", "couch stretch"],
        ),
        movement(
            "Cat-Cow",
            Recovery,
            Beginner,
            &["mobility", "spine"],
            &["mobility"],
            &["none"],
            &["seated cat-cow", "cat-cow"],
        ),
        movement(
            "Thoracic Rotation",
            Recovery,
            Beginner,
            &["mobility", "spine"],
            &["mobility"],
            &["none"],
            &["open book", "quadruped thoracic rotation"],
        ),
        movement(
            "Pigeon Stretch",
            Recovery,
            Beginner,
            &["mobility", "hip"],
            &["mobility"],
            &["none"],
            &["figure-four stretch", "pigeon stretch"],
        ),
    ];

    MovementLibrary::indexed(movements)
}
