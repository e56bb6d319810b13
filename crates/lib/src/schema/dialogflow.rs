//! Dialogflow-style agent export.
//!
//! Each invocation produces a complete, importable agent directory:
//!
//! ```text
//! {speechPath}/dialogflow/{locale}/{environment}/
//! ├── agent.json
//! ├── package.json
//! ├── intents/{Intent}.json
//! ├── intents/{Intent}_usersays_{lang}.json
//! ├── entities/{Type}.json
//! └── entities/{Type}_entries_{lang}.json
//! ```
//!
//! Ids are derived from names (see [`stable_id`]) so repeated exports are
//! identical. `AMAZON.*` intents are Alexa-only and skipped here; `AMAZON.*`
//! slot types map onto Dialogflow system entities.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::debug;

use super::utterance::{Segment, parse_for_intent};
use super::{
  BuildError, FileContent, Invocation, Platform, Schema, SchemaBase, check_name, custom_slot_types,
  is_builtin_type, resolve_slot_values, selected_intents, utterances_for,
};
use crate::content::{Intent, NormalizedContent, SlotValue};
use crate::options::BuildOptions;
use crate::shared::SharedArtifacts;
use crate::util::hash::stable_id;

pub const NAMESPACE: &str = "dialogflow";

const DEFAULT_TIMEZONE: &str = "America/New_York";
const INTENT_PRIORITY: u32 = 500_000;

/// Dialogflow system entity for an Alexa built-in slot type.
pub fn system_entity(slot_type: &str) -> &'static str {
  match slot_type.trim_start_matches("AMAZON.") {
    "NUMBER" => "@sys.number",
    "FOUR_DIGIT_NUMBER" => "@sys.number-integer",
    "DATE" => "@sys.date",
    "TIME" => "@sys.time",
    "DURATION" => "@sys.duration",
    "US_CITY" | "EUROPE_CITY" => "@sys.geo-city",
    "US_FIRST_NAME" | "FirstName" => "@sys.given-name",
    _ => "@sys.any",
  }
}

/// Dialogflow entity names allow letters, digits, `-` and `_`.
fn entity_name(slot_type: &str) -> String {
  slot_type
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
    .collect()
}

/// Dialogflow language code for a locale: `en-US` becomes `en-us`.
fn language_code(locale: &str) -> String {
  locale.to_ascii_lowercase()
}

#[derive(Debug)]
pub struct DialogflowSchema<'a> {
  base: SchemaBase<'a>,
}

impl<'a> DialogflowSchema<'a> {
  pub fn new(content: &'a NormalizedContent, options: &BuildOptions) -> Result<Self, BuildError> {
    Ok(Self {
      base: SchemaBase::new(NAMESPACE, content, options)?,
    })
  }

  fn agent_dir(&self, locale: &str, environment: &str) -> PathBuf {
    self.base.output_dir.join(locale).join(environment)
  }

  fn data_type(slot_type: &str) -> String {
    if is_builtin_type(slot_type) {
      system_entity(slot_type).to_string()
    } else {
      format!("@{}", entity_name(slot_type))
    }
  }

  fn agent(&self, locale: &str, environment: &str) -> Value {
    let display_name = self
      .base
      .content
      .invocation_name(locale, environment)
      .map(str::to_string)
      .unwrap_or_else(|| format!("{}-{}", locale, environment));

    json!({
      "displayName": display_name,
      "description": "",
      "language": language_code(locale),
      "supportedLanguages": [],
      "defaultTimezone": DEFAULT_TIMEZONE,
      "webhook": {
        "url": "",
        "available": true,
        "useForDomains": false,
        "cloudFunctionsEnabled": false,
        "cloudFunctionsInitialized": false
      },
      "isPrivate": true,
      "mlMinConfidence": 0.3,
      "enableOnePlatformResponses": true,
      "onePlatformApiVersion": "v2",
      "analyzeQueryTextSentiment": false,
      "enabledKnowledgeBaseNames": [],
      "dialogBuilderMode": false
    })
  }

  fn intent(intent: &Intent) -> Value {
    let parameters: Vec<Value> = intent
      .slots
      .iter()
      .map(|slot| {
        json!({
          "id": stable_id(&["parameter", intent.name.as_str(), slot.name.as_str()]),
          "required": false,
          "dataType": Self::data_type(&slot.slot_type),
          "name": slot.name,
          "value": format!("${}", slot.name),
          "isList": false
        })
      })
      .collect();

    let events: Vec<Value> = intent.events.iter().map(|name| json!({ "name": name })).collect();

    json!({
      "id": stable_id(&["intent", intent.name.as_str()]),
      "name": intent.name,
      "auto": true,
      "contexts": [],
      "responses": [{
        "resetContexts": false,
        "affectedContexts": [],
        "parameters": parameters,
        "messages": [],
        "defaultResponsePlatforms": {},
        "speech": []
      }],
      "priority": INTENT_PRIORITY,
      "webhookUsed": true,
      "webhookForSlotFilling": false,
      "fallbackIntent": false,
      "events": events,
      "endInteraction": intent.end_conversation
    })
  }

  /// Example text for a slot in a user-says entry: the first value of a
  /// custom type, or the slot name for system entities.
  fn example_text(
    &self,
    intent: &Intent,
    slot: &str,
    locale: &str,
    shared: &SharedArtifacts,
  ) -> Result<String, BuildError> {
    let Some(slot_ref) = intent.slot(slot) else {
      return Ok(slot.to_string());
    };
    if is_builtin_type(&slot_ref.slot_type) {
      return Ok(slot.to_string());
    }
    let slot_type = self
      .base
      .content
      .slot_type(&slot_ref.slot_type)
      .ok_or_else(|| BuildError::UnknownSlotType {
        intent: intent.name.clone(),
        slot_type: slot_ref.slot_type.clone(),
      })?;
    let values = resolve_slot_values(slot_type, locale, shared)?;
    Ok(values.first().map(|v| v.value.clone()).unwrap_or_else(|| slot.to_string()))
  }

  fn usersays(&self, intent: &Intent, locale: &str, shared: &SharedArtifacts) -> Result<Value, BuildError> {
    let mut entries = Vec::new();

    for utterance in utterances_for(intent, locale)? {
      let mut data = Vec::new();
      for segment in parse_for_intent(intent, utterance)? {
        match segment {
          Segment::Text(text) => data.push(json!({ "text": text, "userDefined": false })),
          Segment::Slot(slot) => {
            let slot_type = intent.slot(slot).map(|s| s.slot_type.as_str()).unwrap_or_default();
            let text = self.example_text(intent, slot, locale, shared)?;
            data.push(json!({
              "text": text,
              "alias": slot,
              "meta": Self::data_type(slot_type),
              "userDefined": true
            }));
          }
        }
      }

      entries.push(json!({
        "id": stable_id(&["usersays", intent.name.as_str(), locale, utterance.as_str()]),
        "data": data,
        "isTemplate": false,
        "count": 0,
        "updated": 0
      }));
    }

    Ok(Value::Array(entries))
  }

  fn entity(name: &str) -> Value {
    json!({
      "id": stable_id(&["entity", name]),
      "name": name,
      "isOverridable": true,
      "isEnum": false,
      "isRegexp": false,
      "automatedExpansion": false,
      "allowFuzzyExtraction": false
    })
  }

  fn entries(values: &[SlotValue]) -> Value {
    values
      .iter()
      .map(|value| {
        let mut synonyms = vec![value.value.clone()];
        synonyms.extend(value.synonyms.iter().filter(|s| **s != value.value).cloned());
        json!({ "value": value.value, "synonyms": synonyms })
      })
      .collect()
  }

  fn push(&mut self, dir: &Path, relative: String, content: Value) {
    self.base.push(dir.join(relative), content);
  }
}

impl Schema for DialogflowSchema<'_> {
  fn platform(&self) -> Platform {
    Platform::Dialogflow
  }

  fn invocations(&self) -> &[Invocation] {
    &self.base.invocations
  }

  fn build(&mut self, locale: &str, environment: &str, shared: &SharedArtifacts) -> Result<(), BuildError> {
    self.base.check_invocation(locale, environment)?;

    let content = self.base.content;
    let dir = self.agent_dir(locale, environment);
    let lang = language_code(locale);
    let intents: Vec<&Intent> = selected_intents(content, NAMESPACE, environment)
      .into_iter()
      .filter(|intent| !is_builtin_type(&intent.name))
      .collect();

    // Resolve everything before pushing so a failure leaves no partial agent.
    let mut files: Vec<(String, Value)> = vec![
      ("package.json".to_string(), json!({ "version": "1.0.0" })),
      ("agent.json".to_string(), self.agent(locale, environment)),
    ];

    for intent in &intents {
      check_name("intent", &intent.name)?;
      files.push((format!("intents/{}.json", intent.name), Self::intent(intent)));
      files.push((
        format!("intents/{}_usersays_{}.json", intent.name, lang),
        self.usersays(intent, locale, shared)?,
      ));
    }

    for slot_type in custom_slot_types(content, &intents)? {
      let name = entity_name(&slot_type.name);
      let values = resolve_slot_values(slot_type, locale, shared)?;
      files.push((format!("entities/{}.json", name), Self::entity(&name)));
      files.push((format!("entities/{}_entries_{}.json", name, lang), Self::entries(&values)));
    }

    debug!(
      locale = %locale,
      environment = %environment,
      intents = intents.len(),
      files = files.len(),
      "built dialogflow agent"
    );

    for (relative, value) in files {
      self.push(&dir, relative, value);
    }

    Ok(())
  }

  fn file_content(&self) -> &[FileContent] {
    &self.base.files
  }

  fn take_file_content(&mut self) -> Vec<FileContent> {
    std::mem::take(&mut self.base.files)
  }
}
