//! Shared utilities.
//!
//! Hashing for deterministic identifiers and path helpers for the output layout.

pub mod hash;
pub mod paths;
