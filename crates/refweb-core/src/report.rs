//! Report-row shape consumed by the downstream CSV writer.
//!
//! The writer itself lives outside this crate; this module only fixes the
//! column set and the string encoding of the closure sets. Closures are
//! comma-joined in sorted key order so report output is bit-stable from run
//! to run.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{ClosedBibEntry, Status};

/// One flat report row per closed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub bibkey: String,
    pub further_references: String,
    pub depends_on: String,
    pub further_references_closed: String,
    pub depends_on_closed: String,
    pub further_references_cycle: bool,
    pub depends_on_cycle: bool,
    pub further_references_truncated: bool,
    pub depends_on_truncated: bool,
    pub max_depth_reached: usize,
    pub status: Status,
    pub error_message: String,
}

impl ReportRow {
    /// Column names, in serialization order.
    pub const COLUMNS: [&'static str; 12] = [
        "bibkey",
        "further_references",
        "depends_on",
        "further_references_closed",
        "depends_on_closed",
        "further_references_cycle",
        "depends_on_cycle",
        "further_references_truncated",
        "depends_on_truncated",
        "max_depth_reached",
        "status",
        "error_message",
    ];
}

impl From<&ClosedBibEntry> for ReportRow {
    fn from(entry: &ClosedBibEntry) -> Self {
        Self {
            bibkey: entry.key.clone(),
            further_references: join_keys(&entry.further_references),
            depends_on: join_keys(&entry.depends_on),
            further_references_closed: join_keys(&entry.further_references_closed),
            depends_on_closed: join_keys(&entry.depends_on_closed),
            further_references_cycle: entry.further_references_cycle,
            depends_on_cycle: entry.depends_on_cycle,
            further_references_truncated: entry.further_references_truncated,
            depends_on_truncated: entry.depends_on_truncated,
            max_depth_reached: entry.max_depth_reached,
            status: entry.status,
            error_message: entry.error_message.clone(),
        }
    }
}

/// Rows for a whole batch, preserving entry order.
pub fn report_rows(closed: &[ClosedBibEntry]) -> Vec<ReportRow> {
    closed.iter().map(ReportRow::from).collect()
}

/// Comma-join a key set. `BTreeSet` iteration is already sorted.
fn join_keys(keys: &BTreeSet<String>) -> String {
    keys.iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(key: &str) -> ClosedBibEntry {
        ClosedBibEntry {
            key: key.to_string(),
            ..ClosedBibEntry::default()
        }
    }

    #[test]
    fn closures_join_in_sorted_order() {
        let mut entry = closed("a");
        entry.further_references_closed =
            ["zeta:2001", "alpha:1999", "mid:2010"].iter().map(ToString::to_string).collect();

        let row = ReportRow::from(&entry);
        assert_eq!(row.further_references_closed, "alpha:1999,mid:2010,zeta:2001");
    }

    #[test]
    fn empty_closure_joins_to_empty_string() {
        let row = ReportRow::from(&closed("a"));
        assert_eq!(row.further_references_closed, "");
        assert_eq!(row.depends_on_closed, "");
    }

    #[test]
    fn row_serializes_with_the_documented_columns() {
        let row = ReportRow::from(&closed("a"));
        let json = serde_json::to_value(&row).expect("serialize row");
        let object = json.as_object().expect("row is an object");

        let keys: BTreeSet<&str> = object.keys().map(String::as_str).collect();
        let columns: BTreeSet<&str> = ReportRow::COLUMNS.into_iter().collect();
        assert_eq!(keys, columns);
        assert_eq!(object["status"], "success");
    }

    #[test]
    fn serialized_field_order_matches_columns() {
        let row = ReportRow::from(&closed("a"));
        let json = serde_json::to_string(&row).expect("serialize row");

        let mut last = 0;
        for column in ReportRow::COLUMNS {
            let needle = format!("\"{column}\"");
            let at = json[last..].find(&needle).expect("column present in order");
            last += at;
        }
    }

    #[test]
    fn rows_preserve_batch_order() {
        let batch = [closed("b"), closed("a"), closed("c")];
        let rows = report_rows(&batch);
        let keys: Vec<&str> = rows.iter().map(|r| r.bibkey.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }
}
