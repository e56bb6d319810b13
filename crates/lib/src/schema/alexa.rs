//! Alexa-style interaction model.
//!
//! One file per invocation:
//!
//! ```text
//! {speechPath}/alexa/{locale}/{environment}-interaction.json
//! ```
//!
//! holding `interactionModel.languageModel` with the invocation name, the
//! intents enabled for the environment, and every custom slot type they use.

use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use super::utterance::parse_for_intent;
use super::{
  BuildError, FileContent, Invocation, Platform, Schema, SchemaBase, custom_slot_types, resolve_slot_values,
  selected_intents, utterances_for,
};
use crate::content::NormalizedContent;
use crate::options::BuildOptions;
use crate::shared::SharedArtifacts;

pub const NAMESPACE: &str = "alexa";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InteractionFile {
  interaction_model: InteractionModel,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InteractionModel {
  language_model: LanguageModel,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LanguageModel {
  #[serde(skip_serializing_if = "Option::is_none")]
  invocation_name: Option<String>,
  intents: Vec<IntentModel>,
  types: Vec<TypeModel>,
}

#[derive(Debug, Serialize)]
struct IntentModel {
  name: String,
  samples: Vec<String>,
  slots: Vec<SlotModel>,
}

#[derive(Debug, Serialize)]
struct SlotModel {
  name: String,
  #[serde(rename = "type")]
  slot_type: String,
}

#[derive(Debug, Serialize)]
struct TypeModel {
  name: String,
  values: Vec<TypeValue>,
}

#[derive(Debug, Serialize)]
struct TypeValue {
  #[serde(skip_serializing_if = "Option::is_none")]
  id: Option<String>,
  name: TypeValueName,
}

#[derive(Debug, Serialize)]
struct TypeValueName {
  value: String,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  synonyms: Vec<String>,
}

#[derive(Debug)]
pub struct AlexaSchema<'a> {
  base: SchemaBase<'a>,
}

impl<'a> AlexaSchema<'a> {
  pub fn new(content: &'a NormalizedContent, options: &BuildOptions) -> Result<Self, BuildError> {
    Ok(Self {
      base: SchemaBase::new(NAMESPACE, content, options)?,
    })
  }

  fn interaction_path(&self, locale: &str, environment: &str) -> PathBuf {
    self
      .base
      .output_dir
      .join(locale)
      .join(format!("{}-interaction.json", environment))
  }

  fn language_model(
    &self,
    locale: &str,
    environment: &str,
    shared: &SharedArtifacts,
  ) -> Result<LanguageModel, BuildError> {
    let content = self.base.content;
    let intents = selected_intents(content, NAMESPACE, environment);

    let mut intent_models = Vec::with_capacity(intents.len());
    for intent in &intents {
      let samples = utterances_for(intent, locale)?;
      for sample in samples {
        parse_for_intent(intent, sample)?;
      }
      intent_models.push(IntentModel {
        name: intent.name.clone(),
        samples: samples.to_vec(),
        slots: intent
          .slots
          .iter()
          .map(|slot| SlotModel {
            name: slot.name.clone(),
            slot_type: slot.slot_type.clone(),
          })
          .collect(),
      });
    }

    let mut types = Vec::new();
    for slot_type in custom_slot_types(content, &intents)? {
      let values = resolve_slot_values(slot_type, locale, shared)?
        .into_iter()
        .map(|value| TypeValue {
          id: value.id,
          name: TypeValueName {
            value: value.value,
            synonyms: value.synonyms,
          },
        })
        .collect();
      types.push(TypeModel {
        name: slot_type.name.clone(),
        values,
      });
    }

    Ok(LanguageModel {
      invocation_name: content
        .invocation_name(locale, environment)
        .map(|name| name.to_lowercase()),
      intents: intent_models,
      types,
    })
  }
}

impl Schema for AlexaSchema<'_> {
  fn platform(&self) -> Platform {
    Platform::Alexa
  }

  fn invocations(&self) -> &[Invocation] {
    &self.base.invocations
  }

  fn build(&mut self, locale: &str, environment: &str, shared: &SharedArtifacts) -> Result<(), BuildError> {
    self.base.check_invocation(locale, environment)?;

    let language_model = self.language_model(locale, environment, shared)?;
    debug!(
      locale = %locale,
      environment = %environment,
      intents = language_model.intents.len(),
      types = language_model.types.len(),
      "built alexa interaction model"
    );

    let file = InteractionFile {
      interaction_model: InteractionModel { language_model },
    };
    let path = self.interaction_path(locale, environment);
    self.base.push(path, serde_json::to_value(file)?);

    Ok(())
  }

  fn file_content(&self) -> &[FileContent] {
    &self.base.files
  }

  fn take_file_content(&mut self) -> Vec<FileContent> {
    std::mem::take(&mut self.base.files)
  }
}
