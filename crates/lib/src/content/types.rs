//! Normalized content types.
//!
//! These mirror the sheets of a content spreadsheet after normalization:
//! intents, slot types, views, synonym groups, downloads, and the locale,
//! environment and invocation-name tables. Every map keyed by locale uses
//! [`BTreeMap`] so that derived output is ordered deterministically.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Spoken invocation (Alexa) or agent display name (Dialogflow) for one
/// (locale, environment) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationName {
  pub locale: String,
  pub environment: String,
  pub name: String,
}

/// A slot used by an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRef {
  pub name: String,
  /// Name of a [`SlotType`], or a built-in type such as `AMAZON.NUMBER`.
  #[serde(rename = "type")]
  pub slot_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
  pub name: String,
  #[serde(default)]
  pub slots: Vec<SlotRef>,
  /// Sample utterances per locale. Slots are referenced as `{slotName}`.
  #[serde(default)]
  pub utterances: BTreeMap<String, Vec<String>>,
  /// Environments this intent is built for; empty means all.
  #[serde(default)]
  pub environments: Vec<String>,
  /// Platform namespaces this intent is built for; empty means all.
  #[serde(default)]
  pub platforms: Vec<String>,
  /// Dialogflow events that trigger the intent (e.g. `WELCOME`).
  #[serde(default)]
  pub events: Vec<String>,
  #[serde(default)]
  pub end_conversation: bool,
}

impl Intent {
  pub fn is_enabled_for(&self, namespace: &str, environment: &str) -> bool {
    (self.platforms.is_empty() || self.platforms.iter().any(|p| p == namespace))
      && (self.environments.is_empty() || self.environments.iter().any(|e| e == environment))
  }

  pub fn slot(&self, name: &str) -> Option<&SlotRef> {
    self.slots.iter().find(|s| s.name == name)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotValue {
  pub value: String,
  #[serde(default)]
  pub synonyms: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotType {
  pub name: String,
  #[serde(default)]
  pub values: BTreeMap<String, Vec<SlotValue>>,
  /// Take the values from a synonym group instead: each key becomes a value
  /// and its synonyms become the value's synonyms.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub synonyms_from: Option<String>,
}

/// A named block of localized content, addressed by a dot-separated path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
  pub path: String,
  pub translations: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynonymEntry {
  pub key: String,
  #[serde(default)]
  pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynonymGroup {
  pub name: String,
  #[serde(default)]
  pub entries: BTreeMap<String, Vec<SynonymEntry>>,
}

/// A tabular sheet exported as-is into the content directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Download {
  pub name: String,
  #[serde(default)]
  pub rows: Vec<BTreeMap<String, serde_json::Value>>,
}

/// Immutable, platform-agnostic snapshot of all sheet data for one build run.
///
/// Schema variants and the shared-artifact builder only ever see
/// `&NormalizedContent`; anything they derive is built as new data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizedContent {
  pub locales: Vec<String>,
  pub environments: Vec<String>,
  pub invocations: Vec<InvocationName>,
  pub intents: Vec<Intent>,
  pub slots: Vec<SlotType>,
  pub views: Vec<View>,
  pub synonyms: Vec<SynonymGroup>,
  pub downloads: Vec<Download>,
}

impl NormalizedContent {
  /// Append the sheets of `other`, keeping first-seen order for locales and
  /// environments.
  pub fn merge(&mut self, other: NormalizedContent) {
    for locale in other.locales {
      if !self.locales.contains(&locale) {
        self.locales.push(locale);
      }
    }
    for environment in other.environments {
      if !self.environments.contains(&environment) {
        self.environments.push(environment);
      }
    }
    self.invocations.extend(other.invocations);
    self.intents.extend(other.intents);
    self.slots.extend(other.slots);
    self.views.extend(other.views);
    self.synonyms.extend(other.synonyms);
    self.downloads.extend(other.downloads);
  }

  pub fn slot_type(&self, name: &str) -> Option<&SlotType> {
    self.slots.iter().find(|s| s.name == name)
  }

  pub fn invocation_name(&self, locale: &str, environment: &str) -> Option<&str> {
    self
      .invocations
      .iter()
      .find(|i| i.locale == locale && i.environment == environment)
      .map(|i| i.name.as_str())
  }
}
