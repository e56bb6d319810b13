//! Remote asset download.
//!
//! Each configured asset directory is a URL serving an `index.json`:
//!
//! ```json
//! { "files": ["intro.mp3", "outro.mp3"] }
//! ```
//!
//! Every listed file is downloaded to `{dest}/{last path segment of the
//! directory}/{file}`. Entries may name files in subdirectories
//! (`voices/intro.mp3`); the subpath is kept. Downloads run after all schema
//! files are written.

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use crate::consts::ASSET_INDEX_FILENAME;
use crate::options::AuthKeys;
use crate::util::hash::hash_bytes;
use crate::util::paths::is_safe_file_name;

/// Errors that can occur while fetching assets.
#[derive(Debug, Error)]
pub enum AssetError {
  /// The HTTP request could not be completed.
  #[error("fetch failed for {url}: {message}")]
  Request { url: String, message: String },

  /// The server answered with a non-success status.
  #[error("fetch failed for {url}: HTTP {status}")]
  Status { url: String, status: u16 },

  /// The directory index is not valid.
  #[error("invalid asset index at {url}: {message}")]
  Index { url: String, message: String },

  #[error("failed to write asset {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Downloads remote asset directories.
pub trait AssetFetcher: Send + Sync {
  /// Download every file of every directory in `dirs` below `dest`.
  ///
  /// Returns the local paths written, in download order.
  fn download_dirs(
    &self,
    dirs: &[String],
    dest: &Path,
    auth: &AuthKeys,
  ) -> impl Future<Output = Result<Vec<PathBuf>, AssetError>> + Send;
}

#[derive(Debug, Deserialize)]
struct AssetIndex {
  #[serde(default)]
  files: Vec<String>,
}

/// Fetches assets over HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct HttpAssetFetcher {
  client: reqwest::Client,
}

impl HttpAssetFetcher {
  pub fn new() -> Self {
    Self::default()
  }

  async fn get(&self, url: &str, auth: &AuthKeys) -> Result<reqwest::Response, AssetError> {
    let mut request = self.client.get(url);
    if let Some(token) = auth.bearer_token() {
      request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(|e| AssetError::Request {
      url: url.to_string(),
      message: e.to_string(),
    })?;

    if !response.status().is_success() {
      return Err(AssetError::Status {
        url: url.to_string(),
        status: response.status().as_u16(),
      });
    }
    Ok(response)
  }

  async fn download_dir(&self, dir: &str, dest: &Path, auth: &AuthKeys) -> Result<Vec<PathBuf>, AssetError> {
    let base = dir.trim_end_matches('/');
    let index_url = format!("{}/{}", base, ASSET_INDEX_FILENAME);
    info!(url = %index_url, "fetching asset index");

    let index: AssetIndex = self
      .get(&index_url, auth)
      .await?
      .json()
      .await
      .map_err(|e| AssetError::Index {
        url: index_url.clone(),
        message: e.to_string(),
      })?;

    let target_dir = dest.join(url_to_filename(base));
    fs::create_dir_all(&target_dir).await.map_err(|source| AssetError::Write {
      path: target_dir.clone(),
      source,
    })?;

    let mut written = Vec::with_capacity(index.files.len());
    for file in &index.files {
      let relative = asset_path(file).ok_or_else(|| AssetError::Index {
        url: index_url.clone(),
        message: format!("unsafe file entry {:?}", file),
      })?;
      let url = format!("{}/{}", base, file.trim_start_matches('/'));
      let bytes = self
        .get(&url, auth)
        .await?
        .bytes()
        .await
        .map_err(|e| AssetError::Request {
          url: url.clone(),
          message: e.to_string(),
        })?;

      let path = target_dir.join(relative);
      if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(|source| AssetError::Write {
          path: parent.to_path_buf(),
          source,
        })?;
      }
      fs::write(&path, &bytes).await.map_err(|source| AssetError::Write {
        path: path.clone(),
        source,
      })?;

      debug!(path = %path.display(), size = bytes.len(), "downloaded asset");
      written.push(path);
    }

    info!(url = %base, files = written.len(), "asset directory complete");
    Ok(written)
  }
}

impl AssetFetcher for HttpAssetFetcher {
  async fn download_dirs(&self, dirs: &[String], dest: &Path, auth: &AuthKeys) -> Result<Vec<PathBuf>, AssetError> {
    let mut written = Vec::new();
    for dir in dirs {
      written.extend(self.download_dir(dir, dest, auth).await?);
    }
    Ok(written)
  }
}

/// Relative path of an index entry below the asset directory.
///
/// Every `/`-separated segment must be a plain file name, so `..`, empty
/// segments and backslashes are rejected.
fn asset_path(entry: &str) -> Option<PathBuf> {
  let entry = entry.trim_start_matches('/');
  if entry.is_empty() {
    return None;
  }
  let mut path = PathBuf::new();
  for segment in entry.split('/') {
    if !is_safe_file_name(segment) {
      return None;
    }
    path.push(segment);
  }
  Some(path)
}

/// Convert a URL to a safe file name.
///
/// Takes the last path component and sanitizes it. Falls back to a hash of
/// the URL if no suitable name can be extracted.
fn url_to_filename(url: &str) -> String {
  if let Some(name) = url.rsplit('/').next() {
    let name = name.split('?').next().unwrap_or(name);

    let sanitized: String = name
      .chars()
      .map(|c| {
        if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
          c
        } else {
          '_'
        }
      })
      .collect();

    if !sanitized.is_empty() && sanitized != "." && sanitized != ".." {
      return sanitized;
    }
  }

  format!("asset_{}", &hash_bytes(url.as_bytes()).0[..16])
}
