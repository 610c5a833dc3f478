//! Plan rendering and plan file output.
//!
//! Text output has a fixed section order: header, warm-up, strength or
//! skill, metcon, cooldown, scaling.

use crate::{Error, Focus, Plan, Result};
use fs2::FileExt;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tempfile::NamedTempFile;

/// Supported output formats
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!("unknown output format '{}' (expected text or json)", s.trim())
        })
    }
}

/// Render a plan in the given format
pub fn render(plan: &Plan, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(plan)),
        OutputFormat::Json => render_json(plan),
    }
}

/// Pretty-printed JSON with a trailing newline
pub fn render_json(plan: &Plan) -> Result<String> {
    let mut out = serde_json::to_string_pretty(plan)?;
    out.push('\n');
    Ok(out)
}

fn join_or_dash<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let joined: Vec<&str> = items.into_iter().collect();
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined.join(", ")
    }
}

fn heading(out: &mut String, title: &str) {
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&"─".repeat(title.chars().count()));
    out.push('\n');
}

fn bullets<'a>(out: &mut String, lines: impl IntoIterator<Item = &'a String>) {
    for line in lines {
        let _ = writeln!(out, "  → {}", line);
    }
}

/// Human-readable plan
pub fn render_text(plan: &Plan) -> String {
    let mut out = String::new();
    let profile = &plan.profile;

    out.push_str("╭─────────────────────────────────────────╮\n");
    let _ = writeln!(out, "│  WORKOUT PLAN (seed {})", plan.seed);
    out.push_str("╰─────────────────────────────────────────╯\n");

    let _ = writeln!(
        out,
        "  Goal: {}  Level: {}  Time: {} min  Intensity: {}",
        profile.goal, profile.fitness_level, profile.session_minutes, profile.intensity
    );
    let _ = writeln!(
        out,
        "  Equipment: {}",
        join_or_dash(profile.equipment_available.iter().map(String::as_str))
    );
    let _ = writeln!(
        out,
        "  Preferred: {}",
        join_or_dash(profile.preferred_modalities.iter().map(|m| m.as_str()))
    );
    let _ = writeln!(
        out,
        "  Avoid patterns: {}  Avoid movements: {}",
        join_or_dash(profile.limitations.avoid_patterns.iter().map(String::as_str)),
        join_or_dash(profile.limitations.avoid_movements.iter().map(String::as_str))
    );

    let loads: Vec<String> = plan
        .context
        .top_fatigue_patterns
        .iter()
        .map(|load| format!("{} x{}", load.pattern, load.count))
        .collect();
    let _ = writeln!(
        out,
        "  Fatigue (last {} days): {}",
        plan.context.lookback_days,
        join_or_dash(loads.iter().map(String::as_str))
    );
    let _ = writeln!(
        out,
        "  Recent movements: {}",
        join_or_dash(plan.context.recent_movements.iter().map(String::as_str))
    );

    heading(&mut out, &format!("WARM-UP ({} min)", plan.warmup.minutes));
    bullets(&mut out, &plan.warmup.prescription);

    match &plan.strength {
        Some(strength) => {
            let label = match strength.focus {
                Focus::Strength => "STRENGTH",
                Focus::Skill => "SKILL",
            };
            heading(&mut out, &format!("{} ({} min)", label, strength.minutes));
            bullets(&mut out, &strength.prescription);
        }
        None => {
            heading(&mut out, "STRENGTH / SKILL");
            out.push_str("  → Not programmed for this session\n");
        }
    }

    heading(
        &mut out,
        &format!("METCON ({} min): {}", plan.metcon.minutes, plan.metcon.title),
    );
    bullets(&mut out, &plan.metcon.lines);

    heading(&mut out, &format!("COOLDOWN ({} min)", plan.cooldown.minutes));
    bullets(&mut out, &plan.cooldown.items);

    heading(&mut out, "SCALING");
    for note in &plan.scaling {
        let _ = writeln!(
            out,
            "  → {}: easier {} | harder {}",
            note.movement, note.easier, note.harder
        );
    }

    out
}

/// Write rendered output atomically
///
/// The contents land in a temp file in the same directory and replace `path`
/// with a rename, so readers see either the old file or the new one.
pub fn write_plan(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Wrote plan to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::engine::{generate_plan, PlanInputs};
    use crate::library::get_default_library;
    use crate::{Goal, Profile};
    use chrono::NaiveDate;

    fn sample_plan(goal: Goal) -> Plan {
        let profile = Profile {
            goal,
            ..Profile::default()
        };
        let inputs = PlanInputs {
            profile,
            history: &[],
            library: get_default_library(),
            lookback_days: 7,
            seed: 42,
            today: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        };
        generate_plan(&inputs, &Config::default()).unwrap()
    }

    #[test]
    fn test_text_sections_in_order() {
        let text = render_text(&sample_plan(Goal::Mixed));
        let order = ["WORKOUT PLAN", "WARM-UP", "STRENGTH", "METCON", "COOLDOWN", "SCALING"];
        let positions: Vec<usize> = order
            .iter()
            .map(|section| text.find(section).unwrap_or_else(|| panic!("missing {}", section)))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", text);
    }

    #[test]
    fn test_text_lists_metcon_movements() {
        let plan = sample_plan(Goal::Engine);
        let text = render_text(&plan);
        assert!(text.contains(&plan.metcon.title));
        for movement in &plan.metcon.movements {
            assert!(text.contains(&movement.name));
        }
    }

    #[test]
    fn test_json_names_every_section() {
        let json = render_json(&sample_plan(Goal::Skill)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in [
            "seed", "profile", "context", "warmup", "strength", "metcon", "cooldown", "scaling",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["seed"], 42);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse(" JSON "), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::parse("yaml"), None);
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().unwrap_err().contains("text or json"));
    }

    #[test]
    fn test_write_plan_replaces_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plans").join("today.txt");

        write_plan(&path, "first\n").unwrap();
        write_plan(&path, "second\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\n");
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
