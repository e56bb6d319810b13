//! Writing build output to disk.
//!
//! The pipeline never touches the filesystem directly; it goes through a
//! [`FileEmitter`] so tests can record writes instead of performing them.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Errors that can occur while emitting output.
#[derive(Debug, Error)]
pub enum EmitError {
  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to remove {path}: {source}")]
  Remove {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A write task panicked or was cancelled.
  #[error("emit task failed: {0}")]
  Task(String),
}

/// Writes files and removes stale output directories.
pub trait FileEmitter: Send + Sync + 'static {
  /// Write `contents` to `path`, creating parent directories as needed.
  fn output_file(&self, path: &Path, contents: String) -> impl Future<Output = Result<(), EmitError>> + Send;

  /// Recursively remove `path`. A missing path is not an error.
  fn remove(&self, path: &Path) -> impl Future<Output = Result<(), EmitError>> + Send;
}

/// Emits straight to the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsEmitter;

impl FileEmitter for FsEmitter {
  async fn output_file(&self, path: &Path, contents: String) -> Result<(), EmitError> {
    let write_err = |source| EmitError::Write {
      path: path.to_path_buf(),
      source,
    };

    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    fs::write(path, contents.as_bytes()).await.map_err(write_err)?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
  }

  async fn remove(&self, path: &Path) -> Result<(), EmitError> {
    match fs::remove_dir_all(path).await {
      Ok(()) => {
        debug!(path = %path.display(), "removed stale output");
        Ok(())
      }
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(source) => Err(EmitError::Remove {
        path: path.to_path_buf(),
        source,
      }),
    }
  }
}
