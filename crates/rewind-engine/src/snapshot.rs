#![forbid(unsafe_code)]

//! Introspection records produced by the engine.
//!
//! These are lossy by design: descriptions and counters only, never the
//! callbacks. A [`HistorySnapshot`] is for diagnostics and telemetry and
//! cannot be turned back into a working history.

use serde::Serialize;

/// Lengths of the two stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HistorySize {
    pub undo: usize,
    pub redo: usize,
}

/// Diagnostic snapshot of the history.
///
/// Description lists run from the bottom of each stack to the top.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HistorySnapshot {
    pub undo_size: usize,
    pub redo_size: usize,
    pub undo_descriptions: Vec<String>,
    pub redo_descriptions: Vec<String>,
    pub transaction_open: bool,
}

impl HistorySnapshot {
    /// Serialize as compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Aggregate statistics about the history.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EngineStats {
    pub undo_size: usize,
    pub redo_size: usize,
    /// Sum of `size_bytes()` over both stacks and any open transaction.
    pub memory_estimate_bytes: usize,
    /// Mean age of undo entries in milliseconds (0 when empty).
    pub average_age_ms: f64,
    /// Age of the bottom undo entry in milliseconds (0 when empty).
    pub oldest_age_ms: u64,
    /// Entries dropped by the history cap since the engine was created.
    pub evicted_total: u64,
    /// Nesting depth of the open transaction (0 when none).
    pub transaction_depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_json_shape() {
        let snapshot = HistorySnapshot {
            undo_size: 2,
            redo_size: 1,
            undo_descriptions: vec!["Rename".into(), "Move".into()],
            redo_descriptions: vec!["Delete".into()],
            transaction_open: false,
        };
        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(value["undo_size"], 2);
        assert_eq!(value["redo_descriptions"][0], "Delete");
        assert_eq!(value["undo_descriptions"][1], "Move");
        assert_eq!(value["transaction_open"], false);
    }

    #[test]
    fn stats_serialize() {
        let stats = EngineStats {
            undo_size: 1,
            average_age_ms: 12.5,
            ..EngineStats::default()
        };
        let value = serde_json::to_value(stats).unwrap();
        assert_eq!(value["average_age_ms"], 12.5);
        assert_eq!(value["evicted_total"], 0);
    }
}
