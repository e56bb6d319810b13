//! Normalized content and where it comes from.
//!
//! # Submodules
//!
//! - [`source`] - The [`ContentSource`] trait and the JSON sheet reader

pub mod source;
mod types;

pub use source::{ContentSource, JsonSheetSource, SourceError};
pub use types::*;
