//! Pure domain logic for the trailer catalog: shared types, the domain
//! error enum, free-form price/duration parsing, upload-status
//! normalization, release-date handling, and fuzzy title matching.
//!
//! This crate has no I/O. Everything here is deterministic and unit
//! tested in place.

pub mod dates;
pub mod error;
pub mod matching;
pub mod pricing;
pub mod status;
pub mod types;
