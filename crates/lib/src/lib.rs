//! voxgen-lib: Core types and logic for voxgen
//!
//! This crate compiles normalized conversational content into the schema files
//! of several voice-assistant platforms:
//! - `NormalizedContent`: the platform-agnostic snapshot of all sheet data
//! - `SharedArtifacts`: views, synonym tables and downloads, built once per run
//! - `Schema`: one platform variant producing per-(locale, environment) files
//! - `Pipeline`: the orchestrator that ties sources, schemas and emitters together

pub mod assets;
pub mod consts;
pub mod content;
pub mod emit;
pub mod options;
pub mod pipeline;
pub mod schema;
pub mod shared;
pub mod util;
