#![forbid(unsafe_code)]
//! refweb-core: transitive dependency-closure engine for bibliographic
//! reference graphs.
//!
//! # Overview
//!
//! A bibliography is a flat set of entries, each with two directed edge
//! sets: the entries it cites (`further_references`) and the entries it
//! needs to be self-contained (`depends_on`). This crate computes, for
//! every entry and each relation independently, the full set of entries
//! reachable by following that relation transitively, with cycle-safe
//! termination, a configurable depth cap, and per-entry anomaly reporting.
//!
//! The pipeline runs in three stages:
//!
//! 1. [`graph::ReferenceGraph`] restructures the entries into two adjacency
//!    maps keyed by bibkey.
//! 2. [`closure::close_relation`] computes memoized breadth-first closures
//!    per relation.
//! 3. [`assemble::assemble`] zips the closures back onto the entries in
//!    input order, deriving cycle flags and per-entry status.
//!
//! [`pipeline::close_bibliography`] wires the three together, rejecting
//! duplicate bibkeys up front and running the two relation passes on
//! parallel workers. Loading entries from spreadsheets and writing the
//! report back out belong to the surrounding tooling, not this crate;
//! [`report::ReportRow`] is the handoff shape.
//!
//! # Conventions
//!
//! - **Errors**: hard failures are [`error::ClosureError`]; per-entry
//!   anomalies degrade that entry's `status` instead of failing the batch.
//! - **Logging**: `tracing` macros; no subscriber is installed here.

pub mod assemble;
pub mod closure;
pub mod error;
pub mod graph;
pub mod model;
pub mod pipeline;
pub mod report;

pub use assemble::assemble;
pub use closure::{ClosureConfig, ClosureOutcome, ClosureTable, close_relation};
pub use error::ClosureError;
pub use graph::ReferenceGraph;
pub use model::{BibEntry, ClosedBibEntry, Relation, Status};
pub use pipeline::close_bibliography;
pub use report::{ReportRow, report_rows};
