//! Build configuration.
//!
//! Raw [`InteractionOptions`] come from a JSON options file and/or the command
//! line. [`BuildOptions::resolve`] applies the defaults and checks the
//! invariants the pipeline relies on, before any I/O happens.
//!
//! # Defaults
//!
//! | Option         | Default           |
//! |----------------|-------------------|
//! | `rootPath`     | `""`              |
//! | `speechPath`   | `"speech-assets"` |
//! | `platforms`    | `["alexa"]`       |
//! | `contentPath`  | `"content"`       |
//! | `viewsPath`    | `"/"`             |
//! | `synonymPath`  | `"synonyms"`      |
//! | `assets`       | `[]`              |
//! | `assetsPath`   | `"assets"`        |
//!
//! `spreadsheets` has no default.

mod types;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::consts::{
  DEFAULT_ASSETS_PATH, DEFAULT_CONTENT_PATH, DEFAULT_SPEECH_PATH, DEFAULT_SYNONYM_PATH, DEFAULT_VIEWS_PATH,
};
use crate::schema::Platform;
use crate::util::paths::join_relative;

pub use types::{AuthKeys, ConfigError, InteractionOptions, OneOrMany};

/// Fully resolved build configuration.
///
/// Only obtainable through [`BuildOptions::resolve`], so every instance has at
/// least one spreadsheet, at least one platform and non-empty path options.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
  root_path: PathBuf,
  speech_path: String,
  platforms: Vec<Platform>,
  content_path: String,
  views_path: String,
  synonym_path: String,
  spreadsheets: Vec<String>,
  assets: Vec<String>,
  assets_path: String,
}

/// Use `value` unless it is missing or empty.
fn or_default(value: Option<String>, default: &str) -> String {
  value.filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

impl BuildOptions {
  /// Apply defaults to `options` and validate the result.
  ///
  /// Platforms are deduplicated and ordered by registry order (Alexa before
  /// Dialogflow) regardless of the order they were given in.
  pub fn resolve(options: InteractionOptions) -> Result<Self, ConfigError> {
    let spreadsheets: Vec<String> = options
      .spreadsheets
      .map(OneOrMany::into_vec)
      .unwrap_or_default()
      .into_iter()
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty())
      .collect();

    if spreadsheets.is_empty() {
      return Err(ConfigError::MissingSpreadsheets);
    }

    let platform_names = options
      .platforms
      .map(OneOrMany::into_vec)
      .unwrap_or_else(|| vec![Platform::Alexa.namespace().to_string()]);

    let mut platforms = platform_names
      .iter()
      .map(|name| name.parse::<Platform>())
      .collect::<Result<Vec<_>, _>>()?;
    platforms.sort();
    platforms.dedup();

    if platforms.is_empty() {
      return Err(ConfigError::NoPlatforms);
    }

    let resolved = Self {
      root_path: PathBuf::from(options.root_path.unwrap_or_default()),
      speech_path: or_default(options.speech_path, DEFAULT_SPEECH_PATH),
      platforms,
      content_path: or_default(options.content_path, DEFAULT_CONTENT_PATH),
      views_path: or_default(options.views_path, DEFAULT_VIEWS_PATH),
      synonym_path: or_default(options.synonym_path, DEFAULT_SYNONYM_PATH),
      spreadsheets,
      assets: options.assets.unwrap_or_default(),
      assets_path: or_default(options.assets_path, DEFAULT_ASSETS_PATH),
    };

    debug!(
      platforms = ?resolved.platforms,
      spreadsheets = resolved.spreadsheets.len(),
      root = %resolved.root_path.display(),
      "resolved build options"
    );

    Ok(resolved)
  }

  /// Load raw options from a JSON file.
  pub fn load_file(path: &Path) -> Result<InteractionOptions, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  pub fn root_path(&self) -> &Path {
    &self.root_path
  }

  pub fn platforms(&self) -> &[Platform] {
    &self.platforms
  }

  pub fn spreadsheets(&self) -> &[String] {
    &self.spreadsheets
  }

  pub fn assets(&self) -> &[String] {
    &self.assets
  }

  /// `{root}/{speechPath}`
  pub fn speech_dir(&self) -> PathBuf {
    join_relative(&self.root_path, &self.speech_path)
  }

  /// `{root}/{speechPath}/{namespace}`, the directory owned by one platform.
  pub fn namespace_dir(&self, namespace: &str) -> PathBuf {
    self.speech_dir().join(namespace)
  }

  /// `{root}/{contentPath}`
  pub fn content_dir(&self) -> PathBuf {
    join_relative(&self.root_path, &self.content_path)
  }

  /// `{root}/{contentPath}/{viewsPath}`
  pub fn views_dir(&self) -> PathBuf {
    join_relative(&self.content_dir(), &self.views_path)
  }

  /// `{root}/{contentPath}/{synonymPath}`
  pub fn synonyms_dir(&self) -> PathBuf {
    join_relative(&self.content_dir(), &self.synonym_path)
  }

  /// `{root}/{assetsPath}`
  pub fn assets_dir(&self) -> PathBuf {
    join_relative(&self.root_path, &self.assets_path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_applied() {
    let options = BuildOptions::resolve(InteractionOptions::for_spreadsheet("sheet1")).unwrap();

    assert_eq!(options.platforms(), &[Platform::Alexa]);
    assert_eq!(options.spreadsheets(), &["sheet1".to_string()]);
    assert!(options.assets().is_empty());
    assert_eq!(options.speech_dir(), PathBuf::from("speech-assets"));
    assert_eq!(options.namespace_dir("alexa"), PathBuf::from("speech-assets/alexa"));
    assert_eq!(options.content_dir(), PathBuf::from("content"));
    assert_eq!(options.views_dir(), PathBuf::from("content"));
    assert_eq!(options.synonyms_dir(), PathBuf::from("content/synonyms"));
    assert_eq!(options.assets_dir(), PathBuf::from("assets"));
  }

  #[test]
  fn empty_strings_fall_back_to_defaults() {
    let raw = InteractionOptions {
      speech_path: Some(String::new()),
      content_path: Some(String::new()),
      ..InteractionOptions::for_spreadsheet("sheet1")
    };

    let options = BuildOptions::resolve(raw).unwrap();

    assert_eq!(options.speech_dir(), PathBuf::from("speech-assets"));
    assert_eq!(options.content_dir(), PathBuf::from("content"));
  }

  #[test]
  fn root_path_prefixes_every_output() {
    let options = BuildOptions::resolve(InteractionOptions::for_spreadsheet("s").with_root_path("out")).unwrap();

    assert_eq!(options.namespace_dir("dialogflow"), PathBuf::from("out/speech-assets/dialogflow"));
    assert_eq!(options.synonyms_dir(), PathBuf::from("out/content/synonyms"));
    assert_eq!(options.assets_dir(), PathBuf::from("out/assets"));
  }

  #[test]
  fn missing_spreadsheets_fail() {
    let err = BuildOptions::resolve(InteractionOptions::default()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingSpreadsheets));
  }

  #[test]
  fn blank_spreadsheets_fail() {
    let raw = InteractionOptions {
      spreadsheets: Some(OneOrMany::Many(vec!["".to_string(), "  ".to_string()])),
      ..Default::default()
    };
    assert!(matches!(
      BuildOptions::resolve(raw).unwrap_err(),
      ConfigError::MissingSpreadsheets
    ));
  }

  #[test]
  fn platforms_follow_registry_order() {
    let raw = InteractionOptions::for_spreadsheet("s").with_platforms(&["dialogflow", "alexa", "dialogflow"]);

    let options = BuildOptions::resolve(raw).unwrap();

    assert_eq!(options.platforms(), &[Platform::Alexa, Platform::Dialogflow]);
  }

  #[test]
  fn unknown_platform_fails() {
    let raw = InteractionOptions::for_spreadsheet("s").with_platforms(&["cortana"]);
    let err = BuildOptions::resolve(raw).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownPlatform(name) if name == "cortana"));
  }

  #[test]
  fn empty_platform_list_fails() {
    let raw = InteractionOptions::for_spreadsheet("s").with_platforms(&[]);
    assert!(matches!(BuildOptions::resolve(raw).unwrap_err(), ConfigError::NoPlatforms));
  }

  #[test]
  fn load_file_reports_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("voxgen.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = BuildOptions::load_file(&path).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
  }

  #[test]
  fn load_file_reads_options() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("voxgen.json");
    std::fs::write(&path, r#"{ "spreadsheets": ["a", "b"], "platforms": "dialogflow" }"#).unwrap();

    let options = BuildOptions::resolve(BuildOptions::load_file(&path).unwrap()).unwrap();

    assert_eq!(options.platforms(), &[Platform::Dialogflow]);
    assert_eq!(options.spreadsheets().len(), 2);
  }
}
