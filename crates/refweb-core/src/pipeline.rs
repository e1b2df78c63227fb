//! End-to-end batch run: build the graph, close both relations, assemble.
//!
//! The two relations share no state (separate adjacency maps, separate memo
//! tables), so their closure passes run on parallel workers via
//! [`rayon::join`]. Everything else is sequential; the whole computation is
//! in-memory and returns before any I/O the caller may want to do.

#![allow(clippy::module_name_repetitions)]

use tracing::{debug, instrument};

use crate::assemble::assemble;
use crate::closure::{ClosureConfig, close_relation};
use crate::error::ClosureError;
use crate::graph::{ReferenceGraph, duplicate_keys};
use crate::model::{BibEntry, ClosedBibEntry, Relation};

/// Compute transitive closures for a whole bibliography.
///
/// One output entry per input entry, in input order. Cycles, truncated
/// closures, and unknown edge targets are reported on the entries
/// themselves, never as an `Err`.
///
/// # Errors
///
/// Returns [`ClosureError::DuplicateKeys`] if the input registers the same
/// bibkey more than once. Deduplication is the upstream loader's job; a
/// duplicate here means the adjacency maps would silently drop edges, so
/// there is no sensible partial result.
#[instrument(skip(entries, config), fields(entries = entries.len()))]
pub fn close_bibliography(
    entries: &[BibEntry],
    config: &ClosureConfig,
) -> Result<Vec<ClosedBibEntry>, ClosureError> {
    let duplicates = duplicate_keys(entries);
    if !duplicates.is_empty() {
        return Err(ClosureError::DuplicateKeys { keys: duplicates });
    }

    let graph = ReferenceGraph::from_entries(entries);

    let (further_table, depends_table) = rayon::join(
        || close_relation(&graph, Relation::FurtherReferences, config),
        || close_relation(&graph, Relation::DependsOn, config),
    );

    let closed = assemble(entries, &further_table, &depends_table);

    debug!(
        entries = closed.len(),
        warnings = closed.iter().filter(|e| e.status.is_degraded()).count(),
        "bibliography closed"
    );

    Ok(closed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;

    fn entry(key: &str, further: &[&str], depends: &[&str]) -> BibEntry {
        BibEntry {
            key: key.to_string(),
            further_references: further.iter().map(ToString::to_string).collect(),
            depends_on: depends.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn duplicate_keys_reject_the_whole_batch() {
        let entries = [
            entry("a", &[], &[]),
            entry("b", &[], &[]),
            entry("a", &[], &[]),
        ];
        let err = close_bibliography(&entries, &ClosureConfig::default())
            .expect_err("duplicates must be rejected");
        assert_eq!(
            err,
            ClosureError::DuplicateKeys {
                keys: vec!["a".to_string()]
            }
        );
    }

    #[test]
    fn empty_batch_closes_to_empty_output() {
        let closed = close_bibliography(&[], &ClosureConfig::default()).expect("empty batch");
        assert!(closed.is_empty());
    }

    #[test]
    fn end_to_end_smoke() {
        let entries = [
            entry("kant:1781", &["hume:1739"], &["kant:1787"]),
            entry("hume:1739", &[], &[]),
            entry("kant:1787", &["kant:1781"], &[]),
        ];
        let closed =
            close_bibliography(&entries, &ClosureConfig::default()).expect("batch succeeds");

        assert_eq!(closed.len(), 3);
        let first = &closed[0];
        assert!(first.further_references_closed.contains("hume:1739"));
        assert!(first.depends_on_closed.contains("kant:1787"));
        assert_eq!(first.status, Status::Success);
    }
}
