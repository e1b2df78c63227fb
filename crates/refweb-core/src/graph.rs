//! Reference graph construction from flat bibliographic entries.
//!
//! # Overview
//!
//! This module materializes the two directed edge relations of a bibliography
//! ([`Relation::FurtherReferences`] and [`Relation::DependsOn`]) into
//! adjacency maps keyed by bibkey. The two relations stay fully separate:
//! they are built from disjoint edge sets and are closed independently.
//!
//! # Data model
//!
//! - `key → set of target keys`, one map per relation. Entries with no
//!   out-edges in a relation get no map slot; an absent slot and an empty
//!   set are equivalent downstream.
//! - The registered key set (keys that appear as top-level entries) is kept
//!   alongside, so edge targets that were never registered can be audited.
//!
//! # Boundary conditions
//!
//! Construction is pure data restructuring with no error conditions.
//! Duplicate keys collapse last-write-wins at this layer; callers that care
//! (the pipeline does) check [`duplicate_keys`] before building. Edge
//! targets pointing at unregistered keys are kept as-is; the closure pass
//! treats them as leaves, and [`ReferenceGraph::unknown_targets`] reports
//! them for the bad-key column of the upstream report.

#![allow(
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
)]

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::model::{BibEntry, Relation};

// ---------------------------------------------------------------------------
// ReferenceGraph
// ---------------------------------------------------------------------------

/// Both edge relations of a bibliography, keyed by bibkey.
///
/// Immutable once built. Rebuild from scratch if the entry set changes; a
/// graph lives for exactly one batch computation.
#[derive(Debug, Clone, Default)]
pub struct ReferenceGraph {
    /// key → keys it directly cites.
    further_references: HashMap<String, BTreeSet<String>>,
    /// key → keys it directly requires.
    depends_on: HashMap<String, BTreeSet<String>>,
    /// Keys present as top-level entries.
    registered: HashSet<String>,
}

impl ReferenceGraph {
    /// Build both adjacency maps in one pass over the entries.
    ///
    /// # Complexity
    ///
    /// O(N * L) where N is the number of entries and L the average number of
    /// out-edges per entry.
    pub fn from_entries(entries: &[BibEntry]) -> Self {
        let mut further_references: HashMap<String, BTreeSet<String>> = HashMap::new();
        let mut depends_on: HashMap<String, BTreeSet<String>> = HashMap::new();
        let mut registered: HashSet<String> = HashSet::with_capacity(entries.len());

        for entry in entries {
            registered.insert(entry.key.clone());
            if !entry.further_references.is_empty() {
                further_references.insert(entry.key.clone(), entry.further_references.clone());
            }
            if !entry.depends_on.is_empty() {
                depends_on.insert(entry.key.clone(), entry.depends_on.clone());
            }
        }

        debug!(
            entries = registered.len(),
            further_references_edges = further_references.values().map(BTreeSet::len).sum::<usize>(),
            depends_on_edges = depends_on.values().map(BTreeSet::len).sum::<usize>(),
            "reference graph built"
        );

        Self {
            further_references,
            depends_on,
            registered,
        }
    }

    /// The adjacency map for one relation.
    pub const fn adjacency(&self, relation: Relation) -> &HashMap<String, BTreeSet<String>> {
        match relation {
            Relation::FurtherReferences => &self.further_references,
            Relation::DependsOn => &self.depends_on,
        }
    }

    /// Direct out-edges of `key` under `relation`. Empty for keys without a
    /// map slot, including unregistered ones.
    pub fn out_edges(&self, relation: Relation, key: &str) -> impl Iterator<Item = &str> {
        self.adjacency(relation)
            .get(key)
            .into_iter()
            .flat_map(|targets| targets.iter().map(String::as_str))
    }

    /// Returns `true` if `key` appears as a top-level entry.
    pub fn is_registered(&self, key: &str) -> bool {
        self.registered.contains(key)
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    /// Returns `true` if no entries are registered.
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Every key the closure pass must produce an outcome for under
    /// `relation`: keys with out-edges plus every referenced edge target.
    /// Sorted, so the closure pass visits starts in a stable order.
    pub fn closable_keys(&self, relation: Relation) -> BTreeSet<&str> {
        let adjacency = self.adjacency(relation);
        let mut keys: BTreeSet<&str> = adjacency.keys().map(String::as_str).collect();
        for targets in adjacency.values() {
            keys.extend(targets.iter().map(String::as_str));
        }
        keys
    }

    /// Keys referenced as edge targets under `relation` but never registered
    /// as top-level entries. These close as leaves; the upstream report
    /// lists them as "bad" keys.
    pub fn unknown_targets(&self, relation: Relation) -> BTreeSet<&str> {
        self.adjacency(relation)
            .values()
            .flat_map(|targets| targets.iter().map(String::as_str))
            .filter(|key| !self.registered.contains(*key))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Key audits
// ---------------------------------------------------------------------------

/// Keys appearing on more than one entry, once each, in first-repeat order.
///
/// The graph builder collapses duplicates silently, so the pipeline runs
/// this check first and refuses to compute closures over ambiguous input.
pub fn duplicate_keys(entries: &[BibEntry]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(entries.len());
    let mut reported: HashSet<&str> = HashSet::new();
    let mut duplicates = Vec::new();

    for entry in entries {
        if !seen.insert(entry.key.as_str()) && reported.insert(entry.key.as_str()) {
            duplicates.push(entry.key.clone());
        }
    }

    duplicates
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn entry(key: &str, further: &[&str], depends: &[&str]) -> BibEntry {
        BibEntry {
            key: key.to_string(),
            further_references: further.iter().map(ToString::to_string).collect(),
            depends_on: depends.iter().map(ToString::to_string).collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn empty_input_builds_empty_graph() {
        let graph = ReferenceGraph::from_entries(&[]);
        assert!(graph.is_empty());
        assert_eq!(graph.len(), 0);
        assert!(graph.adjacency(Relation::FurtherReferences).is_empty());
        assert!(graph.adjacency(Relation::DependsOn).is_empty());
    }

    #[test]
    fn relations_stay_separate() {
        let entries = [entry("a", &["b"], &["c"])];
        let graph = ReferenceGraph::from_entries(&entries);

        let further: Vec<&str> = graph.out_edges(Relation::FurtherReferences, "a").collect();
        let depends: Vec<&str> = graph.out_edges(Relation::DependsOn, "a").collect();
        assert_eq!(further, vec!["b"]);
        assert_eq!(depends, vec!["c"]);
    }

    #[test]
    fn entries_without_edges_get_no_map_slot() {
        let entries = [entry("a", &[], &[]), entry("b", &["a"], &[])];
        let graph = ReferenceGraph::from_entries(&entries);

        assert!(graph.is_registered("a"));
        assert!(!graph.adjacency(Relation::FurtherReferences).contains_key("a"));
        assert_eq!(graph.out_edges(Relation::FurtherReferences, "a").count(), 0);
    }

    #[test]
    fn duplicate_keys_collapse_last_write_wins() {
        let entries = [entry("a", &["b"], &[]), entry("a", &["c"], &[])];
        let graph = ReferenceGraph::from_entries(&entries);

        let further: Vec<&str> = graph.out_edges(Relation::FurtherReferences, "a").collect();
        assert_eq!(further, vec!["c"]);
        assert_eq!(graph.len(), 1);
    }

    // -----------------------------------------------------------------------
    // closable_keys
    // -----------------------------------------------------------------------

    #[test]
    fn closable_keys_include_edge_targets() {
        let entries = [entry("a", &["b", "x"], &[])];
        let graph = ReferenceGraph::from_entries(&entries);

        let keys = graph.closable_keys(Relation::FurtherReferences);
        assert!(keys.contains("a"));
        assert!(keys.contains("b"));
        assert!(keys.contains("x"));
        // depends_on has no edges at all.
        assert!(graph.closable_keys(Relation::DependsOn).is_empty());
    }

    #[test]
    fn closable_keys_are_sorted() {
        let entries = [entry("z", &["m", "a"], &[])];
        let graph = ReferenceGraph::from_entries(&entries);

        let keys: Vec<&str> = graph
            .closable_keys(Relation::FurtherReferences)
            .into_iter()
            .collect();
        assert_eq!(keys, vec!["a", "m", "z"]);
    }

    // -----------------------------------------------------------------------
    // unknown_targets
    // -----------------------------------------------------------------------

    #[test]
    fn unknown_targets_reports_unregistered_keys_only() {
        let entries = [
            entry("a", &["b", "ghost:1990"], &["phantom:2002"]),
            entry("b", &[], &[]),
        ];
        let graph = ReferenceGraph::from_entries(&entries);

        let further = graph.unknown_targets(Relation::FurtherReferences);
        assert_eq!(further.into_iter().collect::<Vec<_>>(), vec!["ghost:1990"]);

        let depends = graph.unknown_targets(Relation::DependsOn);
        assert_eq!(depends.into_iter().collect::<Vec<_>>(), vec!["phantom:2002"]);
    }

    #[test]
    fn unknown_targets_empty_when_all_registered() {
        let entries = [entry("a", &["b"], &[]), entry("b", &["a"], &[])];
        let graph = ReferenceGraph::from_entries(&entries);
        assert!(graph.unknown_targets(Relation::FurtherReferences).is_empty());
    }

    // -----------------------------------------------------------------------
    // duplicate_keys
    // -----------------------------------------------------------------------

    #[test]
    fn duplicate_keys_empty_for_unique_input() {
        let entries = [entry("a", &[], &[]), entry("b", &[], &[])];
        assert!(duplicate_keys(&entries).is_empty());
    }

    #[test]
    fn duplicate_keys_reports_each_key_once() {
        let entries = [
            entry("a", &[], &[]),
            entry("b", &[], &[]),
            entry("a", &[], &[]),
            entry("a", &[], &[]),
            entry("b", &[], &[]),
        ];
        assert_eq!(duplicate_keys(&entries), vec!["a", "b"]);
    }

    #[test]
    fn duplicate_keys_preserves_first_repeat_order() {
        let entries = [
            entry("z", &[], &[]),
            entry("a", &[], &[]),
            entry("a", &[], &[]),
            entry("z", &[], &[]),
        ];
        assert_eq!(duplicate_keys(&entries), vec!["a", "z"]);
    }
}
