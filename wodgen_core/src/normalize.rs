//! Profile normalization.
//!
//! Coerces an untyped JSON record into a canonical [`Profile`]. Unknown enum
//! values and missing fields fall back to defaults; only a non-object input
//! is rejected.

use crate::{Error, Goal, Intensity, Level, Limitations, Modality, Profile, Result, WodType};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

pub const MIN_SESSION_MINUTES: u32 = 20;
pub const MAX_SESSION_MINUTES: u32 = 120;
pub const DEFAULT_SESSION_MINUTES: u32 = 45;

/// Normalize a raw profile record
pub fn normalize_profile(raw: &Value) -> Result<Profile> {
    let obj = raw.as_object().ok_or_else(|| {
        Error::MalformedInput(format!("profile must be a JSON object, got {}", kind_of(raw)))
    })?;

    let goal = enum_field(obj, &["goal"], Goal::parse).unwrap_or(Goal::Mixed);
    let fitness_level = enum_field(obj, &["fitness_level", "level"], Level::parse)
        .unwrap_or(Level::Intermediate);
    let intensity =
        enum_field(obj, &["intensity"], Intensity::parse).unwrap_or(Intensity::Moderate);
    let wod_type = enum_field(obj, &["wod_type"], WodType::parse);

    let session_minutes = parse_minutes(obj.get("session_minutes"));

    let mut equipment_available =
        string_set(field(obj, &["equipment_available", "equipment"]));
    equipment_available.insert("none".to_string());

    let limitations = match obj.get("limitations").and_then(Value::as_object) {
        Some(lim) => Limitations {
            avoid_patterns: string_set(lim.get("avoid_patterns")),
            avoid_movements: string_set(lim.get("avoid_movements")),
        },
        None => Limitations::default(),
    };

    let mut preferred_modalities: BTreeSet<Modality> =
        string_set(obj.get("preferred_modalities"))
            .iter()
            .filter_map(|m| Modality::parse(m))
            .collect();
    if preferred_modalities.is_empty() {
        preferred_modalities = Modality::ACTIVE.into_iter().collect();
    }

    let profile = Profile {
        goal,
        fitness_level,
        session_minutes,
        equipment_available,
        limitations,
        preferred_modalities,
        wod_type,
        intensity,
    };

    tracing::debug!(
        "Normalized profile: goal={} level={} minutes={} intensity={}",
        profile.goal,
        profile.fitness_level,
        profile.session_minutes,
        profile.intensity
    );

    Ok(profile)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// First present field among `names`
fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| obj.get(*name))
}

fn enum_field<T>(
    obj: &Map<String, Value>,
    names: &[&str],
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    field(obj, names).and_then(Value::as_str).and_then(parse)
}

/// Parse minutes as an integer, then clamp to the supported range
fn parse_minutes(value: Option<&Value>) -> u32 {
    let parsed = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => leading_integer(s),
        _ => None,
    };

    let minutes = parsed.unwrap_or(i64::from(DEFAULT_SESSION_MINUTES));
    minutes.clamp(i64::from(MIN_SESSION_MINUTES), i64::from(MAX_SESSION_MINUTES)) as u32
}

/// Integer prefix of a string ("45", " 60min", "-5"), `None` without digits
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate absurdly long digit runs; they clamp to the maximum anyway
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// Lower-cased, trimmed, deduplicated set of the string members of an array
pub(crate) fn string_set(value: Option<&Value>) -> BTreeSet<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
