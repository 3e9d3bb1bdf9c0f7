//! Determinism helpers: canonical JSON, hashing, and stable ordering.
//!
//! Content addresses are only as stable as the bytes they are computed from.
//! Everything that feeds an address or a generated type name goes through
//! this module.

pub mod canonical_json;
pub mod hashing;
pub mod stable_sort;
