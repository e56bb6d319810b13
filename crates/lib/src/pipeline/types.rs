//! Result and error types of a build run.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::assets::AssetError;
use crate::content::SourceError;
use crate::emit::EmitError;
use crate::options::ConfigError;
use crate::schema::BuildError;

/// Any failure of a build run.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Source(#[from] SourceError),

  #[error(transparent)]
  Build(#[from] BuildError),

  #[error(transparent)]
  Emit(#[from] EmitError),

  #[error(transparent)]
  Asset(#[from] AssetError),
}

/// What a run would write, computed without touching the filesystem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
  /// Number of shared artifact files.
  pub shared_files: usize,
  /// Namespace to number of files.
  pub platform_files: BTreeMap<String, usize>,
  /// Every output path, shared files first.
  pub paths: Vec<PathBuf>,
}

impl BuildPlan {
  pub fn file_count(&self) -> usize {
    self.paths.len()
  }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
  pub files_written: usize,
  pub shared_files: usize,
  pub platform_files: BTreeMap<String, usize>,
  pub assets_downloaded: usize,
  /// Written paths, shared files first, then platforms in registry order.
  pub paths: Vec<PathBuf>,
  pub elapsed_ms: u64,
}
