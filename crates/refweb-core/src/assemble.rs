//! Result assembly: zip closure outcomes back onto the input entries.
//!
//! The assembler is a 1:1 map over the input sequence. It never reorders,
//! never drops an entry, and never fails the batch: a per-entry problem
//! degrades that entry's `status` and the run keeps going. Every anomaly a
//! downstream report needs to show is a field on [`ClosedBibEntry`], not an
//! error path.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use tracing::warn;

use crate::closure::{ClosureOutcome, ClosureTable};
use crate::model::{BibEntry, ClosedBibEntry, Status};

/// Merge the two relation tables onto `entries`, preserving input order.
///
/// Keys absent from a table close to the empty set; that covers entries with
/// no out-edges, which the closure pass has nothing to say about. Cycle
/// flags are own-key membership tests against each closure. An entry with an
/// empty key cannot be looked up meaningfully and comes back with
/// [`Status::Error`] and a message, without aborting the rest of the batch.
pub fn assemble(
    entries: &[BibEntry],
    further_table: &ClosureTable,
    depends_table: &ClosureTable,
) -> Vec<ClosedBibEntry> {
    entries
        .iter()
        .map(|entry| assemble_one(entry, further_table, depends_table))
        .collect()
}

fn assemble_one(
    entry: &BibEntry,
    further_table: &ClosureTable,
    depends_table: &ClosureTable,
) -> ClosedBibEntry {
    if entry.key.is_empty() {
        warn!("entry with empty bibkey marked as error");
        return ClosedBibEntry {
            key: entry.key.clone(),
            further_references: entry.further_references.clone(),
            depends_on: entry.depends_on.clone(),
            status: Status::Error,
            error_message: "bibkey is empty".to_string(),
            ..ClosedBibEntry::default()
        };
    }

    let empty = ClosureOutcome::default();
    let further = further_table.get(&entry.key).unwrap_or(&empty);
    let depends = depends_table.get(&entry.key).unwrap_or(&empty);

    let further_cycle = further.is_cycle(&entry.key);
    let depends_cycle = depends.is_cycle(&entry.key);
    let degraded =
        further_cycle || depends_cycle || further.truncated || depends.truncated;

    ClosedBibEntry {
        key: entry.key.clone(),
        further_references: entry.further_references.clone(),
        depends_on: entry.depends_on.clone(),
        further_references_closed: further.closure.clone(),
        depends_on_closed: depends.closure.clone(),
        further_references_cycle: further_cycle,
        depends_on_cycle: depends_cycle,
        further_references_truncated: further.truncated,
        depends_on_truncated: depends.truncated,
        max_depth_reached: further.max_depth_reached.max(depends.max_depth_reached),
        status: if degraded { Status::Warning } else { Status::Success },
        error_message: String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
