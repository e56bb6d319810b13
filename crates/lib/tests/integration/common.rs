//! Shared helpers for pipeline integration tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

use voxgen_lib::assets::HttpAssetFetcher;
use voxgen_lib::content::JsonSheetSource;
use voxgen_lib::emit::FsEmitter;
use voxgen_lib::options::{AuthKeys, InteractionOptions};
use voxgen_lib::pipeline::{BuildReport, Pipeline, PipelineError};

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Isolated build environment: a sheets directory and an output root.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("sheets")).unwrap();
    Self { temp }
  }

  /// Copy a fixture into the sheets directory as `{id}.json`.
  pub fn with_fixture(self, fixture: &str, id: &str) -> Self {
    std::fs::copy(fixture_path(fixture), self.sheets_dir().join(format!("{}.json", id))).unwrap();
    self
  }

  pub fn write_sheet(&self, id: &str, content: &str) {
    std::fs::write(self.sheets_dir().join(format!("{}.json", id)), content).unwrap();
  }

  pub fn sheets_dir(&self) -> PathBuf {
    self.temp.path().join("sheets")
  }

  /// Output root for the named run.
  pub fn out(&self, name: &str) -> PathBuf {
    self.temp.path().join(name)
  }

  /// Options for `spreadsheets`, writing below `out(run)`.
  pub fn options(&self, run: &str, spreadsheets: &[&str], platforms: &[&str]) -> InteractionOptions {
    InteractionOptions {
      spreadsheets: Some(spreadsheets.iter().map(|s| s.to_string()).collect::<Vec<_>>().into()),
      ..Default::default()
    }
    .with_platforms(platforms)
    .with_root_path(&self.out(run).to_string_lossy())
  }

  pub async fn run(&self, options: InteractionOptions) -> Result<BuildReport, PipelineError> {
    let pipeline = Pipeline::with_parts(
      JsonSheetSource::new(self.sheets_dir()),
      FsEmitter,
      HttpAssetFetcher::new(),
    );
    pipeline.run(options, &AuthKeys::none()).await
  }
}

/// Every file below `root`, keyed by its path relative to `root`.
///
/// A missing `root` yields an empty map.
pub fn read_tree(root: &Path) -> BTreeMap<PathBuf, String> {
  if !root.exists() {
    return BTreeMap::new();
  }

  WalkDir::new(root)
    .into_iter()
    .map(|entry| entry.unwrap())
    .filter(|entry| entry.file_type().is_file())
    .map(|entry| {
      let relative = entry.path().strip_prefix(root).unwrap().to_path_buf();
      let contents = std::fs::read_to_string(entry.path()).unwrap();
      (relative, contents)
    })
    .collect()
}
