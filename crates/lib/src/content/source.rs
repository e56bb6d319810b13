//! Content acquisition.
//!
//! A [`ContentSource`] turns the configured spreadsheet identifiers into one
//! [`NormalizedContent`]. The pipeline calls it exactly once per run, before
//! any platform work starts.

use std::future::Future;
use std::path::PathBuf;

use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use super::types::NormalizedContent;
use crate::options::{AuthKeys, BuildOptions};

/// Errors that can occur while acquiring content.
#[derive(Debug, Error)]
pub enum SourceError {
  /// A sheet could not be read.
  #[error("failed to read sheet {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A sheet is not valid normalized content.
  #[error("failed to parse sheet {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// Produces the normalized content for a build run.
pub trait ContentSource: Send + Sync {
  fn transform(
    &self,
    options: &BuildOptions,
    auth: &AuthKeys,
  ) -> impl Future<Output = Result<NormalizedContent, SourceError>> + Send;
}

/// Reads pre-normalized sheets from a directory.
///
/// Each configured spreadsheet id maps to `{dir}/{id}.json`; the sheets are
/// merged in the configured order.
#[derive(Debug, Clone)]
pub struct JsonSheetSource {
  dir: PathBuf,
}

impl JsonSheetSource {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  fn sheet_path(&self, id: &str) -> PathBuf {
    self.dir.join(format!("{}.json", id))
  }

  async fn read_sheet(&self, id: &str) -> Result<NormalizedContent, SourceError> {
    let path = self.sheet_path(id);
    debug!(sheet = %id, path = %path.display(), "reading sheet");

    let raw = fs::read_to_string(&path)
      .await
      .map_err(|source| SourceError::Read { path: path.clone(), source })?;

    serde_json::from_str(&raw).map_err(|source| SourceError::Parse { path, source })
  }
}

impl ContentSource for JsonSheetSource {
  async fn transform(&self, options: &BuildOptions, _auth: &AuthKeys) -> Result<NormalizedContent, SourceError> {
    let mut content = NormalizedContent::default();

    for id in options.spreadsheets() {
      content.merge(self.read_sheet(id).await?);
    }

    info!(
      sheets = options.spreadsheets().len(),
      locales = content.locales.len(),
      intents = content.intents.len(),
      views = content.views.len(),
      "content acquired"
    );

    Ok(content)
  }
}
