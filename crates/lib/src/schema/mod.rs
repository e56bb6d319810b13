//! Platform schema builders.
//!
//! Every supported voice platform is a variant of [`Platform`] and has a
//! [`Schema`] implementation that turns [`NormalizedContent`] plus the run's
//! [`SharedArtifacts`] into that platform's files, one (locale, environment)
//! invocation at a time.
//!
//! Adding a platform means adding a `Platform` variant and a `Schema`
//! implementation; the pipeline does not change.
//!
//! # Submodules
//!
//! - [`alexa`] - Alexa-style interaction models
//! - [`dialogflow`] - Dialogflow-style agent exports
//! - [`utterance`] - Slot-marker parsing for sample utterances

pub mod alexa;
pub mod dialogflow;
mod types;
pub mod utterance;

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::consts::DEFAULT_ENVIRONMENT;
use crate::content::{Intent, NormalizedContent, SlotType, SlotValue};
use crate::options::{BuildOptions, ConfigError};
use crate::shared::SharedArtifacts;
use crate::util::paths::is_safe_file_name;

pub use alexa::AlexaSchema;
pub use dialogflow::DialogflowSchema;
pub use types::{BuildError, FileContent, Invocation};

/// Supported platforms, in registry order.
///
/// The derived ordering is the build order: when several platforms are
/// selected they are always built Alexa first, then Dialogflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
  Alexa,
  Dialogflow,
}

impl Platform {
  pub const ALL: [Platform; 2] = [Platform::Alexa, Platform::Dialogflow];

  /// Output directory name and cleanup key; unique per platform.
  pub fn namespace(self) -> &'static str {
    match self {
      Platform::Alexa => alexa::NAMESPACE,
      Platform::Dialogflow => dialogflow::NAMESPACE,
    }
  }

  /// Construct the schema builder for this platform.
  pub fn instantiate<'a>(
    self,
    content: &'a NormalizedContent,
    options: &BuildOptions,
  ) -> Result<SchemaInstance<'a>, BuildError> {
    let schema: SchemaInstance<'a> = match self {
      Platform::Alexa => Box::new(AlexaSchema::new(content, options)?),
      Platform::Dialogflow => Box::new(DialogflowSchema::new(content, options)?),
    };
    Ok(schema)
  }
}

impl std::fmt::Display for Platform {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.namespace())
  }
}

impl FromStr for Platform {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Platform::ALL
      .into_iter()
      .find(|p| p.namespace().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| ConfigError::UnknownPlatform(s.to_string()))
  }
}

/// The build capability every platform variant provides.
pub trait Schema: Send {
  fn platform(&self) -> Platform;

  fn namespace(&self) -> &'static str {
    self.platform().namespace()
  }

  /// The (locale, environment) pairs this platform builds.
  fn invocations(&self) -> &[Invocation];

  /// Build the files for one invocation and append them to this schema's output.
  ///
  /// Output depends only on the content, the invocation and `shared`; the
  /// order in which invocations are built does not matter.
  fn build(&mut self, locale: &str, environment: &str, shared: &SharedArtifacts) -> Result<(), BuildError>;

  /// Files accumulated so far.
  fn file_content(&self) -> &[FileContent];

  /// Hand over the accumulated files, leaving the schema empty.
  fn take_file_content(&mut self) -> Vec<FileContent>;
}

/// One platform's builder for the current run.
pub type SchemaInstance<'a> = Box<dyn Schema + 'a>;

/// State common to every schema variant.
#[derive(Debug)]
pub struct SchemaBase<'a> {
  pub content: &'a NormalizedContent,
  /// `{root}/{speechPath}/{namespace}`
  pub output_dir: PathBuf,
  pub invocations: Vec<Invocation>,
  pub files: Vec<FileContent>,
}

impl<'a> SchemaBase<'a> {
  pub fn new(namespace: &str, content: &'a NormalizedContent, options: &BuildOptions) -> Result<Self, BuildError> {
    Ok(Self {
      content,
      output_dir: options.namespace_dir(namespace),
      invocations: resolve_invocations(content)?,
      files: Vec::new(),
    })
  }

  pub fn push(&mut self, path: PathBuf, content: serde_json::Value) {
    self.files.push(FileContent::new(path, content));
  }

  /// The locale must be declared and both names must be plain path segments.
  pub fn check_invocation(&self, locale: &str, environment: &str) -> Result<(), BuildError> {
    if !self.content.locales.iter().any(|l| l == locale) {
      return Err(BuildError::UnknownLocale {
        invocation: Invocation::new(locale, environment),
      });
    }
    check_name("locale", locale)?;
    check_name("environment", environment)
  }
}

/// Fail with [`BuildError::InvalidName`] unless `name` is a single path segment.
pub fn check_name(kind: &'static str, name: &str) -> Result<(), BuildError> {
  if is_safe_file_name(name) {
    Ok(())
  } else {
    Err(BuildError::InvalidName {
      kind,
      name: name.to_string(),
    })
  }
}

/// Check names that end up in output paths or must be unique.
///
/// Locales, environments, intent names and synonym locales become path
/// segments. Intent and slot type names must be unique across all merged
/// sheets.
pub fn validate_content(content: &NormalizedContent) -> Result<(), BuildError> {
  for locale in &content.locales {
    check_name("locale", locale)?;
  }
  for environment in &content.environments {
    check_name("environment", environment)?;
  }

  let mut intents = HashSet::new();
  for intent in &content.intents {
    check_name("intent", &intent.name)?;
    if !intents.insert(intent.name.as_str()) {
      return Err(BuildError::DuplicateIntent(intent.name.clone()));
    }
  }

  let mut slot_types = HashSet::new();
  for slot_type in &content.slots {
    if !slot_types.insert(slot_type.name.as_str()) {
      return Err(BuildError::DuplicateSlotType(slot_type.name.clone()));
    }
  }

  for group in &content.synonyms {
    check_name("synonym group", &group.name)?;
    for locale in group.entries.keys() {
      check_name("synonym locale", locale)?;
    }
  }

  Ok(())
}

/// Resolve the invocation list of a content snapshot.
///
/// Uses the declared invocation names in order (deduplicated). Without any,
/// falls back to `locales × environments`, with environments defaulting to
/// [`DEFAULT_ENVIRONMENT`].
pub fn resolve_invocations(content: &NormalizedContent) -> Result<Vec<Invocation>, BuildError> {
  let mut invocations: Vec<Invocation> = Vec::new();

  if content.invocations.is_empty() {
    let default_environments = [DEFAULT_ENVIRONMENT.to_string()];
    let environments = if content.environments.is_empty() {
      &default_environments[..]
    } else {
      &content.environments[..]
    };
    for locale in &content.locales {
      check_name("locale", locale)?;
      for environment in environments {
        check_name("environment", environment)?;
        invocations.push(Invocation::new(locale, environment));
      }
    }
    return Ok(invocations);
  }

  for declared in &content.invocations {
    check_name("locale", &declared.locale)?;
    check_name("environment", &declared.environment)?;
    let invocation = Invocation::new(&declared.locale, &declared.environment);
    if !content.locales.contains(&declared.locale) {
      return Err(BuildError::UnknownLocale { invocation });
    }
    if !invocations.contains(&invocation) {
      invocations.push(invocation);
    }
  }

  Ok(invocations)
}

/// Intents built for `namespace` in `environment`, in content order.
pub fn selected_intents<'c>(content: &'c NormalizedContent, namespace: &str, environment: &str) -> Vec<&'c Intent> {
  content
    .intents
    .iter()
    .filter(|intent| intent.is_enabled_for(namespace, environment))
    .collect()
}

/// Whether `slot_type` is an Alexa built-in type rather than a declared one.
pub fn is_builtin_type(slot_type: &str) -> bool {
  slot_type.starts_with("AMAZON.")
}

/// Declared slot types used by `intents`, sorted by name.
pub fn custom_slot_types<'c>(
  content: &'c NormalizedContent,
  intents: &[&Intent],
) -> Result<Vec<&'c SlotType>, BuildError> {
  let mut names = BTreeSet::new();
  for intent in intents {
    for slot in &intent.slots {
      if !is_builtin_type(&slot.slot_type) {
        names.insert((slot.slot_type.as_str(), intent.name.as_str()));
      }
    }
  }

  let mut types: Vec<&SlotType> = Vec::new();
  for (name, intent) in names {
    let slot_type = content.slot_type(name).ok_or_else(|| BuildError::UnknownSlotType {
      intent: intent.to_string(),
      slot_type: name.to_string(),
    })?;
    if !types.iter().any(|t| t.name == slot_type.name) {
      types.push(slot_type);
    }
  }

  Ok(types)
}

/// The values of a slot type for one locale.
///
/// Types with `synonyms_from` read the resolved synonym table from the shared
/// artifacts: each key becomes a value carrying its synonyms.
pub fn resolve_slot_values(
  slot_type: &SlotType,
  locale: &str,
  shared: &SharedArtifacts,
) -> Result<Vec<SlotValue>, BuildError> {
  if let Some(group) = &slot_type.synonyms_from {
    let table = shared.synonym_table(group, locale)?;
    return Ok(
      table
        .iter()
        .map(|(key, values)| SlotValue {
          value: key.clone(),
          synonyms: values.clone(),
          id: None,
        })
        .collect(),
    );
  }

  slot_type
    .values
    .get(locale)
    .filter(|values| !values.is_empty())
    .cloned()
    .ok_or_else(|| BuildError::MissingSlotValues {
      slot_type: slot_type.name.clone(),
      locale: locale.to_string(),
    })
}

/// Sample utterances of `intent` for `locale`.
///
/// Built-in intents (`AMAZON.*`) may have none; every other intent must.
pub fn utterances_for<'c>(intent: &'c Intent, locale: &str) -> Result<&'c [String], BuildError> {
  match intent.utterances.get(locale) {
    Some(utterances) if !utterances.is_empty() => Ok(utterances.as_slice()),
    _ if is_builtin_type(&intent.name) => Ok(&[]),
    _ => Err(BuildError::MissingUtterances {
      intent: intent.name.clone(),
      locale: locale.to_string(),
    }),
  }
}
