//! Full builds through `JsonSheetSource` and `FsEmitter`.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use voxgen_lib::content::JsonSheetSource;
use voxgen_lib::options::AuthKeys;
use voxgen_lib::pipeline::{PipelineError, build_interaction};
use voxgen_lib::schema::BuildError;

use super::common::{TestEnv, read_tree};

fn read_json(path: &Path) -> Value {
  serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn greeting_scenario() {
  let env = TestEnv::new();
  env.write_sheet(
    "sheet1",
    r#"{ "locales": ["en-US"], "intents": [{ "name": "Greeting", "utterances": { "en-US": ["hello"] } }] }"#,
  );

  let report = env.run(env.options("out", &["sheet1"], &["alexa"])).await.unwrap();

  let alexa: Vec<_> = read_tree(&env.out("out").join("speech-assets"))
    .into_keys()
    .collect();
  assert_eq!(alexa, vec![PathBuf::from("alexa/en-US/production-interaction.json")]);

  let model = read_json(&env.out("out").join("speech-assets/alexa/en-US/production-interaction.json"));
  assert_eq!(
    model["interactionModel"]["languageModel"]["intents"],
    json!([{ "name": "Greeting", "samples": ["hello"], "slots": [] }])
  );
  assert_eq!(report.platform_files["alexa"], 1);
}

#[tokio::test]
async fn two_platforms_share_artifacts() {
  let env = TestEnv::new().with_fixture("travel.json", "travel");

  let report = env
    .run(env.options("out", &["travel"], &["alexa", "dialogflow"]))
    .await
    .unwrap();

  assert_eq!(report.shared_files, 5);
  assert_eq!(report.platform_files["alexa"], 4);
  let shared_writes = report.paths.iter().filter(|p| p.ends_with("views.json")).count();
  assert_eq!(shared_writes, 1);

  let out = env.out("out");
  let tree = read_tree(&out);
  let speech: Vec<_> = tree
    .keys()
    .filter(|p| p.starts_with("speech-assets"))
    .collect();
  assert!(speech.iter().all(|p| {
    p.starts_with("speech-assets/alexa") || p.starts_with("speech-assets/dialogflow")
  }));
  assert_eq!(tree.len(), report.files_written);

  let views = read_json(&out.join("content/views.json"));
  assert_eq!(views["de-DE"]["translation"]["Weather"]["reprompt"], "Welche Stadt?");

  let mapping = read_json(&out.join("content/views.map.json"));
  assert_eq!(mapping["en-US"]["Which city?"], "Weather.reprompt");

  let synonyms = read_json(&out.join("content/synonyms/en-US/transport.json"));
  assert_eq!(synonyms, json!({ "bus": ["coach"], "train": ["rail"] }));

  let catalog = read_json(&out.join("content/catalog.json"));
  assert_eq!(catalog, json!([{ "city": "Vienna", "code": "VIE" }]));
}

#[tokio::test]
async fn dialogflow_tree_layout() {
  let env = TestEnv::new().with_fixture("travel.json", "travel");

  env
    .run(env.options("out", &["travel"], &["dialogflow"]))
    .await
    .unwrap();

  let root = env.out("out").join("speech-assets/dialogflow/de-DE/production");
  assert!(root.join("package.json").is_file());
  assert!(root.join("agent.json").is_file());
  assert!(root.join("intents/Transport.json").is_file());
  assert!(root.join("intents/Transport_usersays_de-de.json").is_file());
  assert!(root.join("entities/Mode_entries_de-de.json").is_file());
  assert!(!root.join("intents/AMAZON.StopIntent.json").exists());
  assert!(!env.out("out").join("speech-assets/alexa").exists());

  let staging = env.out("out").join("speech-assets/dialogflow/en-US/staging");
  assert!(!staging.join("intents/Transport.json").exists());
}

#[tokio::test]
async fn identical_input_gives_identical_bytes() {
  let env = TestEnv::new().with_fixture("travel.json", "travel");

  env
    .run(env.options("first", &["travel"], &["alexa", "dialogflow"]))
    .await
    .unwrap();
  env
    .run(env.options("second", &["travel"], &["dialogflow", "alexa"]))
    .await
    .unwrap();

  let first = read_tree(&env.out("first"));
  assert!(!first.is_empty());
  assert_eq!(first, read_tree(&env.out("second")));
  assert!(first.values().all(|text| text.ends_with("}\n") || text.ends_with("]\n")));
}

#[tokio::test]
async fn build_interaction_uses_default_parts() {
  let env = TestEnv::new().with_fixture("travel.json", "travel");

  let report = build_interaction(
    JsonSheetSource::new(env.sheets_dir()),
    env.options("out", &["travel"], &["alexa"]),
    &AuthKeys::none(),
  )
  .await
  .unwrap();

  assert_eq!(report.platform_files["alexa"], 4);
  assert!(env.out("out").join("content/views.json").is_file());
}

#[tokio::test]
async fn sheets_are_merged_in_order() {
  let env = TestEnv::new();
  env.write_sheet(
    "intents",
    r#"{ "locales": ["en-US"], "intents": [{ "name": "Book", "slots": [{ "name": "city", "type": "City" }], "utterances": { "en-US": ["book {city}"] } }] }"#,
  );
  env.write_sheet(
    "slots",
    r#"{ "locales": ["en-US"], "slots": [{ "name": "City", "values": { "en-US": [{ "value": "Graz" }] } }] }"#,
  );

  env
    .run(env.options("out", &["intents", "slots"], &["alexa"]))
    .await
    .unwrap();

  let model = read_json(&env.out("out").join("speech-assets/alexa/en-US/production-interaction.json"));
  assert_eq!(
    model["interactionModel"]["languageModel"]["types"][0]["values"][0]["name"]["value"],
    "Graz"
  );
}

#[tokio::test]
async fn intent_declared_in_two_sheets_fails() {
  let env = TestEnv::new();
  let sheet = r#"{ "locales": ["en-US"], "intents": [{ "name": "Greeting", "utterances": { "en-US": ["hello"] } }] }"#;
  env.write_sheet("first", sheet);
  env.write_sheet("second", sheet);

  let err = env
    .run(env.options("out", &["first", "second"], &["alexa"]))
    .await
    .unwrap_err();

  assert!(matches!(
    err,
    PipelineError::Build(BuildError::DuplicateIntent(ref name)) if name == "Greeting"
  ));
  assert!(read_tree(&env.out("out")).is_empty());
}

#[tokio::test]
async fn failed_build_leaves_output_untouched() {
  let env = TestEnv::new();
  env.write_sheet(
    "broken",
    r#"{ "locales": ["en-US", "de-DE"], "intents": [{ "name": "Greeting", "utterances": { "en-US": ["hello"] } }] }"#,
  );

  let err = env
    .run(env.options("out", &["broken"], &["alexa"]))
    .await
    .unwrap_err();

  assert!(matches!(
    err,
    PipelineError::Build(BuildError::MissingUtterances { ref locale, .. }) if locale == "de-DE"
  ));
  assert!(read_tree(&env.out("out")).is_empty());
}

#[tokio::test]
async fn stale_platform_files_are_replaced() {
  let env = TestEnv::new().with_fixture("travel.json", "travel");
  let stale = env.out("out").join("speech-assets/alexa/fr-FR/production-interaction.json");
  std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
  std::fs::write(&stale, "{}").unwrap();
  let unrelated = env.out("out").join("speech-assets/README.md");
  std::fs::write(&unrelated, "keep").unwrap();

  env
    .run(env.options("out", &["travel"], &["alexa"]))
    .await
    .unwrap();

  assert!(!stale.exists());
  assert!(unrelated.exists());
}
