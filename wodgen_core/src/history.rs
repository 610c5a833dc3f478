//! Training history loading.
//!
//! History comes either as a JSON array of session records or as a CSV file
//! with `date,movements,patterns` columns, lists separated by `;`. Entries
//! that cannot be read are skipped with a warning; a CSV header that cannot
//! be read fails the load.

use crate::loader::read_locked_bytes;
use crate::{Error, HistorySession, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// CSV row format for history files
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: Option<String>,
    movements: Option<String>,
    patterns: Option<String>,
}

impl From<CsvRow> for HistorySession {
    fn from(row: CsvRow) -> Self {
        HistorySession {
            date: row.date.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            movements: split_list(row.movements.as_deref()),
            patterns: split_list(row.patterns.as_deref()),
        }
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or("")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Parse history from a JSON value, which must be an array
///
/// Non-object entries are discarded.
pub fn history_from_json(value: &Value) -> Result<Vec<HistorySession>> {
    let entries = value
        .as_array()
        .ok_or_else(|| Error::MalformedInput("history must be a JSON array".into()))?;

    let mut sessions = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let Some(obj) = entry.as_object() else {
            tracing::warn!("Skipping history entry #{}: not an object", i + 1);
            continue;
        };
        sessions.push(HistorySession {
            date: obj
                .get("date")
                .and_then(Value::as_str)
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            movements: string_list(obj.get("movements")),
            patterns: string_list(obj.get("patterns")),
        });
    }
    Ok(sessions)
}

/// Parse history from CSV bytes
///
/// An unreadable header row fails the whole file. Data rows that fail to
/// deserialize are skipped.
pub fn history_from_csv(contents: &[u8]) -> Result<Vec<HistorySession>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents);

    let headers = reader.headers()?;
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    if !headers.iter().any(|h| h == "movements" || h == "patterns") {
        return Err(Error::MalformedInput(
            "history CSV needs a movements or patterns column".into(),
        ));
    }

    let mut sessions = Vec::new();
    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        match result {
            Ok(row) => sessions.push(HistorySession::from(row)),
            Err(e) => {
                tracing::warn!("Failed to parse history row {}: {}", line + 2, e);
            }
        }
    }
    Ok(sessions)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Load history from a JSON or CSV file
///
/// A missing file is an empty history.
pub fn load_history(path: &Path) -> Result<Vec<HistorySession>> {
    let Some(contents) = read_locked_bytes(path)? else {
        tracing::info!("No history at {:?}, planning without fatigue data", path);
        return Ok(Vec::new());
    };

    let sessions = if is_csv(path) {
        history_from_csv(&contents)?
    } else {
        let raw: Value = serde_json::from_slice(&contents)?;
        history_from_json(&raw)?
    };

    tracing::debug!("Loaded {} history sessions from {:?}", sessions.len(), path);
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_history_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let sessions = load_history(&temp_dir.path().join("history.json")).unwrap();
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_json_history_discards_non_objects() {
        let value = json!([
            {"date": "2024-03-14", "movements": ["Row", "Pull-Up"], "patterns": ["pull"]},
            "yesterday",
            42,
            {"movements": ["Burpee"]}
        ]);
        let sessions = history_from_json(&value).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].date.as_deref(), Some("2024-03-14"));
        assert_eq!(sessions[0].movements, vec!["Row", "Pull-Up"]);
        assert_eq!(sessions[0].patterns, vec!["pull"]);
        assert_eq!(sessions[1].date, None);
        assert!(sessions[1].patterns.is_empty());
    }

    #[test]
    fn test_json_history_must_be_array() {
        let result = history_from_json(&json!({"sessions": []}));
        assert!(matches!(result, Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_json_history_ignores_odd_fields() {
        let value = json!([{"date": 20240314, "movements": "Row", "patterns": [1, "squat"]}]);
        let sessions = history_from_json(&value).unwrap();
        assert_eq!(sessions[0].date, None);
        assert!(sessions[0].movements.is_empty());
        assert_eq!(sessions[0].patterns, vec!["squat"]);
    }

    #[test]
    fn test_csv_history() {
        let contents = "\
date,movements,patterns
2024-03-14,Row; Pull-Up,pull
,Burpee,
2024-03-10,,squat;hip hinge
";
        let sessions = history_from_csv(contents.as_bytes()).unwrap();
        assert_eq!(sessions.len(), 3);
        assert_eq!(sessions[0].movements, vec!["Row", "Pull-Up"]);
        assert_eq!(sessions[1].date, None);
        assert!(sessions[1].patterns.is_empty());
        assert!(sessions[2].movements.is_empty());
        assert_eq!(sessions[2].patterns, vec!["squat", "hip hinge"]);
    }

    #[test]
    fn test_csv_bad_rows_skipped() {
        let contents = b"date,movements,patterns\n2024-03-14,Row,\n2024-03-13,Bad\xffRow,\n";
        let sessions = history_from_csv(contents).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].movements, vec!["Row"]);
    }

    #[test]
    fn test_csv_unreadable_header_is_csv_error() {
        let contents = b"date,move\xffments,patterns\n2024-03-14,Row,\n";
        assert!(matches!(history_from_csv(contents), Err(Error::Csv(_))));
    }

    #[test]
    fn test_csv_without_list_columns_rejected() {
        let contents = b"day,workout\n2024-03-14,Row\n";
        assert!(matches!(history_from_csv(contents), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_empty_csv_is_empty_history() {
        assert!(history_from_csv(b"").unwrap().is_empty());
    }

    #[test]
    fn test_load_history_dispatches_on_extension() {
        let temp_dir = tempfile::tempdir().unwrap();

        let csv_path = temp_dir.path().join("history.CSV");
        std::fs::write(&csv_path, "date,movements,patterns\n2024-03-14,Deadlift,\n").unwrap();
        let from_csv = load_history(&csv_path).unwrap();
        assert_eq!(from_csv[0].movements, vec!["Deadlift"]);

        let json_path = temp_dir.path().join("history.json");
        std::fs::write(&json_path, r#"[{"date": "2024-03-14", "movements": ["Deadlift"]}]"#)
            .unwrap();
        let from_json = load_history(&json_path).unwrap();
        assert_eq!(from_csv, from_json);
    }

    #[test]
    fn test_non_array_history_file_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.json");
        std::fs::write(&path, r#"{"date": "2024-03-14"}"#).unwrap();
        assert!(matches!(load_history(&path), Err(Error::MalformedInput(_))));
    }
}
