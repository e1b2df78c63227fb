//! Batch-level error type for the closure engine.
//!
//! Recoverable per-entry conditions (cycles, truncation, missing edge
//! targets, empty keys) never surface here; they land in each entry's
//! `status`/`error_message` fields so a batch run always produces one output
//! row per input entry. Only structural preconditions fail the whole call.

use thiserror::Error;

/// Hard failures of a batch closure run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ClosureError {
    /// The input sequence registers the same bibkey more than once. The
    /// graph builder would collapse duplicates silently, so the pipeline
    /// refuses to run instead. Keys are listed once each, in first-repeat
    /// order.
    #[error("duplicate bibkeys in input: {}", .keys.join(", "))]
    DuplicateKeys { keys: Vec<String> },

    /// The traversal depth cap must be a positive hop count.
    #[error("depth cap must be at least 1, got {given}")]
    InvalidDepthCap { given: usize },
}
