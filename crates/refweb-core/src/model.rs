//! Input and output node types for the reference graph.
//!
//! # Overview
//!
//! A bibliography is a flat collection of [`BibEntry`] values, each carrying a
//! unique bibkey and two directed edge sets:
//!
//! - **Further references** (`further_references`): entries directly cited by
//!   this entry's text fields.
//! - **Depends on** (`depends_on`): entries this entry requires to be
//!   self-contained (crossrefs, shared notes).
//!
//! The two relations form two **separate** directed graphs; they are never
//! merged into one edge set. The closure pipeline enriches each entry into a
//! [`ClosedBibEntry`] holding the transitive closure of both relations plus
//! per-relation cycle and truncation flags.
//!
//! Edge sets are ordered (`BTreeSet`) so debug output and serialized edge
//! order are stable across runs. Upstream loaders hand us deduplicated keys;
//! the set type encodes that invariant.

#![allow(
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::missing_const_for_fn,
)]

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Relation
// ---------------------------------------------------------------------------

/// One of the two directed edge relations over bibliographic entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Direct citations found in an entry's text fields.
    FurtherReferences,
    /// Entries required for an entry to be self-contained.
    DependsOn,
}

impl Relation {
    /// Both relations, in report-column order.
    pub const ALL: [Self; 2] = [Self::FurtherReferences, Self::DependsOn];

    /// Snake-case name matching the report column prefix.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FurtherReferences => "further_references",
            Self::DependsOn => "depends_on",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Per-entry outcome of a batch run.
///
/// `Warning` covers the two recoverable anomalies (cycle, depth-cap
/// truncation); which one fired is visible in the entry's flags. `Error` is
/// reserved for per-entry processing failures and never aborts the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Success,
    Warning,
    Error,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Returns `true` for `Warning` and `Error`.
    pub const fn is_degraded(self) -> bool {
        !matches!(self, Self::Success)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BibEntry
// ---------------------------------------------------------------------------

/// A bibliographic entry as handed over by the upstream loader.
///
/// `key` must be non-empty and unique across the input set. The graph builder
/// collapses duplicate keys silently (last write wins), so the pipeline
/// checks uniqueness up front and refuses to run on violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibEntry {
    /// Unique bibliographic key, e.g. `smith_j:2001`.
    pub key: String,
    /// Keys directly cited by this entry.
    pub further_references: BTreeSet<String>,
    /// Keys this entry requires for self-containment.
    pub depends_on: BTreeSet<String>,
}

impl BibEntry {
    /// Create an entry with no out-edges.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            further_references: BTreeSet::new(),
            depends_on: BTreeSet::new(),
        }
    }

    /// The out-edge set for one relation.
    pub const fn edges(&self, relation: Relation) -> &BTreeSet<String> {
        match relation {
            Relation::FurtherReferences => &self.further_references,
            Relation::DependsOn => &self.depends_on,
        }
    }
}

// ---------------------------------------------------------------------------
// ClosedBibEntry
// ---------------------------------------------------------------------------

/// A [`BibEntry`] enriched with transitive closures for both relations.
///
/// The closure sets contain the entry's own key exactly when the entry is
/// transitively self-reachable under that relation; the corresponding
/// `*_cycle` flag mirrors that membership. The `*_truncated` flags are an
/// independent signal: the depth cap cut the traversal short, so the closure
/// may be incomplete. Both conditions map to [`Status::Warning`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedBibEntry {
    pub key: String,
    pub further_references: BTreeSet<String>,
    pub depends_on: BTreeSet<String>,
    /// Transitive closure of `further_references`.
    pub further_references_closed: BTreeSet<String>,
    /// Transitive closure of `depends_on`.
    pub depends_on_closed: BTreeSet<String>,
    /// Own key appears in the further-references closure.
    pub further_references_cycle: bool,
    /// Own key appears in the depends-on closure.
    pub depends_on_cycle: bool,
    /// Further-references traversal was cut by the depth cap.
    pub further_references_truncated: bool,
    /// Depends-on traversal was cut by the depth cap.
    pub depends_on_truncated: bool,
    /// Deepest hop the traversal explored for this entry, across both
    /// relations. An upper bound on the distance of the farthest closure
    /// member.
    pub max_depth_reached: usize,
    pub status: Status,
    /// Empty unless `status` is [`Status::Error`].
    pub error_message: String,
}

impl ClosedBibEntry {
    /// The closure set for one relation.
    pub const fn closed(&self, relation: Relation) -> &BTreeSet<String> {
        match relation {
            Relation::FurtherReferences => &self.further_references_closed,
            Relation::DependsOn => &self.depends_on_closed,
        }
    }

    /// The cycle flag for one relation.
    pub const fn cycle(&self, relation: Relation) -> bool {
        match relation {
            Relation::FurtherReferences => self.further_references_cycle,
            Relation::DependsOn => self.depends_on_cycle,
        }
    }

    /// The truncation flag for one relation.
    pub const fn truncated(&self, relation: Relation) -> bool {
        match relation {
            Relation::FurtherReferences => self.further_references_truncated,
            Relation::DependsOn => self.depends_on_truncated,
        }
    }

    /// Returns `true` if either relation flagged a cycle.
    pub const fn has_cycle(&self) -> bool {
        self.further_references_cycle || self.depends_on_cycle
    }

    /// Returns `true` if either relation was cut by the depth cap.
    pub const fn is_truncated(&self) -> bool {
        self.further_references_truncated || self.depends_on_truncated
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
