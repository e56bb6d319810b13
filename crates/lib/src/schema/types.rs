//! Types shared by every schema variant.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One (locale, environment) target of a platform build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Invocation {
  pub locale: String,
  pub environment: String,
}

impl Invocation {
  pub fn new(locale: &str, environment: &str) -> Self {
    Self {
      locale: locale.to_string(),
      environment: environment.to_string(),
    }
  }
}

impl std::fmt::Display for Invocation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}/{}", self.locale, self.environment)
  }
}

/// A file to emit: destination path plus JSON content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileContent {
  pub path: PathBuf,
  pub content: serde_json::Value,
}

impl FileContent {
  pub fn new(path: PathBuf, content: serde_json::Value) -> Self {
    Self { path, content }
  }

  /// Serialize for writing: 2-space indentation and a trailing newline.
  pub fn render(&self) -> Result<String, BuildError> {
    let mut rendered = serde_json::to_string_pretty(&self.content)?;
    rendered.push('\n');
    Ok(rendered)
  }
}

/// Errors raised while building shared artifacts or platform schemas.
///
/// Any of these aborts the whole run.
#[derive(Debug, Error)]
pub enum BuildError {
  /// An invocation names a locale the content does not declare.
  #[error("invocation {invocation} uses undeclared locale")]
  UnknownLocale { invocation: Invocation },

  /// An intent has no sample utterances for the locale being built.
  #[error("intent {intent} has no utterances for locale {locale}")]
  MissingUtterances { intent: String, locale: String },

  /// An intent references a slot type that is neither declared nor built in.
  #[error("intent {intent} references unknown slot type {slot_type}")]
  UnknownSlotType { intent: String, slot_type: String },

  /// A custom slot type has no values for the locale being built.
  #[error("slot type {slot_type} has no values for locale {locale}")]
  MissingSlotValues { slot_type: String, locale: String },

  /// A slot type takes its values from a synonym group that does not exist.
  #[error("unknown synonym group {group}")]
  UnknownSynonymGroup { group: String },

  /// A synonym group has no entries for the locale being built.
  #[error("synonym group {group} has no entries for locale {locale}")]
  MissingSynonymLocale { group: String, locale: String },

  /// A view lacks a translation for one of the declared locales.
  #[error("view {view} has no translation for locale {locale}")]
  MissingViewTranslation { view: String, locale: String },

  /// Two views claim the same path, or one view's path nests inside another's value.
  #[error("view path {path} conflicts with another view")]
  ViewPathConflict { path: String },

  /// An utterance references a slot the intent does not declare.
  #[error("utterance \"{utterance}\" of intent {intent} references undeclared slot {slot}")]
  UndeclaredSlot {
    intent: String,
    slot: String,
    utterance: String,
  },

  /// An utterance has unbalanced or empty slot braces.
  #[error("utterance \"{utterance}\" of intent {intent} is malformed")]
  MalformedUtterance { intent: String, utterance: String },

  /// A content-provided name cannot be used as a file name.
  #[error("invalid {kind} name: {name:?}")]
  InvalidName { kind: &'static str, name: String },

  /// Two intents share a name, possibly across merged sheets.
  #[error("intent {0} is declared more than once")]
  DuplicateIntent(String),

  /// Two slot types share a name, possibly across merged sheets.
  #[error("slot type {0} is declared more than once")]
  DuplicateSlotType(String),

  /// Two artifacts would be written to the same path.
  #[error("duplicate output path: {}", .0.display())]
  DuplicatePath(PathBuf),

  /// JSON serialization failed.
  #[error("serialization error: {0}")]
  Serialize(#[from] serde_json::Error),
}
