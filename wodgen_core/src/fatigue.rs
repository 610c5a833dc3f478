//! Fatigue analysis over the recent training history.

use crate::library::MovementLibrary;
use crate::{normalize_name, HistorySession, PatternLoad};
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

/// Recent movements and pattern load within the lookback window
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FatigueReport {
    /// Normalized names of movements performed inside the window
    pub recent_movements: BTreeSet<String>,
    pub pattern_counts: BTreeMap<String, u32>,
}

impl FatigueReport {
    pub fn pattern_count(&self, pattern: &str) -> u32 {
        self.pattern_counts.get(pattern).copied().unwrap_or(0)
    }

    pub fn is_recent(&self, key: &str) -> bool {
        self.recent_movements.contains(key)
    }

    /// Highest pattern counts, ties broken by pattern name
    pub fn top_patterns(&self, limit: usize) -> Vec<PatternLoad> {
        let mut loads: Vec<PatternLoad> = self
            .pattern_counts
            .iter()
            .map(|(pattern, &count)| PatternLoad {
                pattern: pattern.clone(),
                count,
            })
            .collect();
        // BTreeMap order is by name, stable sort keeps it for equal counts
        loads.sort_by(|a, b| b.count.cmp(&a.count));
        loads.truncate(limit);
        loads
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Scan history within `lookback_days` of `today`
///
/// Sessions without a date, or with a date that does not parse, count as
/// recent. Movement names unknown to the library still count as recent but
/// contribute no library patterns.
pub fn analyze_fatigue(
    history: &[HistorySession],
    library: &MovementLibrary,
    lookback_days: u32,
    today: NaiveDate,
) -> FatigueReport {
    let cutoff = today - Duration::days(i64::from(lookback_days));
    let mut report = FatigueReport::default();

    for session in history {
        let date = session.date.as_deref().and_then(parse_date);
        if matches!(date, Some(d) if d < cutoff) {
            continue;
        }

        for name in &session.movements {
            let key = normalize_name(name);
            if key.is_empty() {
                continue;
            }
            if let Some(movement) = library.get(&key) {
                for pattern in &movement.patterns {
                    *report.pattern_counts.entry(pattern.clone()).or_insert(0) += 1;
                }
            }
            report.recent_movements.insert(key);
        }

        for pattern in &session.patterns {
            let pattern = pattern.trim().to_lowercase();
            if !pattern.is_empty() {
                *report.pattern_counts.entry(pattern).or_insert(0) += 1;
            }
        }
    }

    tracing::debug!(
        "Fatigue window since {}: {} recent movements, {} loaded patterns",
        cutoff,
        report.recent_movements.len(),
        report.pattern_counts.len()
    );

    report
}
