//! CSV reconciliation pipelines for the trailer catalog.
//!
//! Two independent pipelines, both row-by-row and both continuing past
//! row-level failures:
//!
//! - [`catalog`]: imports or links rows from a VideoDB-format export,
//!   keyed by the provider video id, with exact and fuzzy title
//!   matching for the link variant.
//! - [`supplemental`]: applies release dates, long descriptions, and
//!   creator credits from a supplemental export, keyed by sequence
//!   number, and can write the merged table back out in VideoDB
//!   format.
//!
//! Every row is processed inside its own transaction: one bad row
//! never rolls back its predecessors.

pub mod catalog;
pub mod report;
pub mod supplemental;
