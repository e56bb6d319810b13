//! Types for build configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while resolving build options.
///
/// All of these occur before any filesystem or network I/O of the build itself.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// No spreadsheet identifier was given, or all of them were blank.
  #[error("spreadsheets were not specified in the right format")]
  MissingSpreadsheets,

  /// The platform list resolved to nothing.
  #[error("no platforms selected")]
  NoPlatforms,

  /// A platform name with no schema variant.
  #[error("unsupported platform: {0}")]
  UnknownPlatform(String),

  /// The options file could not be read.
  #[error("failed to read options file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The options file is not valid JSON for [`InteractionOptions`].
  #[error("failed to parse options file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// A value that may be given either alone or as a list.
///
/// `"platforms": "alexa"` and `"platforms": ["alexa"]` are equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
  One(T),
  Many(Vec<T>),
}

impl<T> OneOrMany<T> {
  pub fn into_vec(self) -> Vec<T> {
    match self {
      OneOrMany::One(value) => vec![value],
      OneOrMany::Many(values) => values,
    }
  }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
  fn from(values: Vec<T>) -> Self {
    OneOrMany::Many(values)
  }
}

/// Raw, user-facing build options.
///
/// Every field except `spreadsheets` is optional; defaults are applied by
/// [`BuildOptions::resolve`](super::BuildOptions::resolve). Field names are
/// camelCase in JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractionOptions {
  pub root_path: Option<String>,
  pub speech_path: Option<String>,
  pub platforms: Option<OneOrMany<String>>,
  pub content_path: Option<String>,
  pub views_path: Option<String>,
  pub synonym_path: Option<String>,
  pub spreadsheets: Option<OneOrMany<String>>,
  pub assets: Option<Vec<String>>,
  pub assets_path: Option<String>,
}

impl InteractionOptions {
  /// Options naming a single spreadsheet, everything else defaulted.
  pub fn for_spreadsheet(id: &str) -> Self {
    Self {
      spreadsheets: Some(OneOrMany::One(id.to_string())),
      ..Default::default()
    }
  }

  pub fn with_platforms(mut self, platforms: &[&str]) -> Self {
    self.platforms = Some(OneOrMany::Many(platforms.iter().map(|p| p.to_string()).collect()));
    self
  }

  pub fn with_root_path(mut self, root: &str) -> Self {
    self.root_path = Some(root.to_string());
    self
  }

  /// Overlay `overrides` on top of `self`; set fields in `overrides` win.
  pub fn merge(self, overrides: InteractionOptions) -> Self {
    Self {
      root_path: overrides.root_path.or(self.root_path),
      speech_path: overrides.speech_path.or(self.speech_path),
      platforms: overrides.platforms.or(self.platforms),
      content_path: overrides.content_path.or(self.content_path),
      views_path: overrides.views_path.or(self.views_path),
      synonym_path: overrides.synonym_path.or(self.synonym_path),
      spreadsheets: overrides.spreadsheets.or(self.spreadsheets),
      assets: overrides.assets.or(self.assets),
      assets_path: overrides.assets_path.or(self.assets_path),
    }
  }
}

/// Authentication material handed to the content source and asset fetcher.
#[derive(Clone, Default)]
pub struct AuthKeys {
  bearer_token: Option<String>,
}

impl AuthKeys {
  pub fn none() -> Self {
    Self::default()
  }

  pub fn bearer(token: impl Into<String>) -> Self {
    Self {
      bearer_token: Some(token.into()),
    }
  }

  pub fn bearer_token(&self) -> Option<&str> {
    self.bearer_token.as_deref()
  }
}

impl std::fmt::Debug for AuthKeys {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AuthKeys")
      .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
      .finish()
  }
}
