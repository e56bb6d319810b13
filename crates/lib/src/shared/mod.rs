//! Platform-independent shared artifacts.
//!
//! Views, the view-to-text mapping, synonym tables and downloads are the same
//! for every platform, so they are built once per run, before any platform
//! schema, into a standalone [`SharedArtifacts`] value. Platform schemas read
//! it (for example to resolve synonym-backed slot types) and the pipeline
//! writes its files alongside theirs.
//!
//! [`SharedArtifactBuilder`] takes no platform argument: its output cannot
//! depend on which platforms are selected.
//!
//! # Layout
//!
//! ```text
//! {contentPath}/{viewsPath}/views.json            { locale: { "translation": tree } }
//! {contentPath}/{viewsPath}/views.map.json        { locale: { text: view path } }
//! {contentPath}/{synonymPath}/{locale}/{group}.json  { key: [synonyms] }
//! {contentPath}/{download}.json                   [ rows ]
//! ```

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::consts::{VIEWS_FILENAME, VIEWS_MAP_FILENAME};
use crate::content::NormalizedContent;
use crate::options::BuildOptions;
use crate::schema::{BuildError, FileContent, check_name};

/// Synonym key to its synonyms, for one group and locale.
pub type SynonymTable = BTreeMap<String, Vec<String>>;

/// Everything built once per run and shared by all platforms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedArtifacts {
  /// Locale to nested translation tree.
  pub views: BTreeMap<String, Value>,
  /// Locale to rendered text to view path.
  pub views_mapping: BTreeMap<String, BTreeMap<String, String>>,
  /// Group to locale to table.
  pub synonyms: BTreeMap<String, BTreeMap<String, SynonymTable>>,
  /// Download name to its rows.
  pub downloads: BTreeMap<String, Vec<BTreeMap<String, Value>>>,
  /// Files to emit for the above.
  pub files: Vec<FileContent>,
}

impl SharedArtifacts {
  /// The resolved synonym table of `group` for `locale`.
  pub fn synonym_table(&self, group: &str, locale: &str) -> Result<&SynonymTable, BuildError> {
    let locales = self
      .synonyms
      .get(group)
      .ok_or_else(|| BuildError::UnknownSynonymGroup { group: group.to_string() })?;
    locales.get(locale).ok_or_else(|| BuildError::MissingSynonymLocale {
      group: group.to_string(),
      locale: locale.to_string(),
    })
  }
}

/// The four shared-artifact steps.
///
/// Each step reads the content and appends to `shared`. The pipeline calls
/// every step exactly once per run, in the order of [`build_shared`].
pub trait SharedArtifactBuilder: Send + Sync {
  fn build_downloads(
    &self,
    content: &NormalizedContent,
    options: &BuildOptions,
    shared: &mut SharedArtifacts,
  ) -> Result<(), BuildError>;

  fn build_views(
    &self,
    content: &NormalizedContent,
    options: &BuildOptions,
    shared: &mut SharedArtifacts,
  ) -> Result<(), BuildError>;

  /// Runs after [`build_views`](Self::build_views) and may read `shared.views`.
  fn build_views_mapping(
    &self,
    content: &NormalizedContent,
    options: &BuildOptions,
    shared: &mut SharedArtifacts,
  ) -> Result<(), BuildError>;

  fn build_synonyms(
    &self,
    content: &NormalizedContent,
    options: &BuildOptions,
    shared: &mut SharedArtifacts,
  ) -> Result<(), BuildError>;
}

/// Run every step of `builder` once and return the result.
pub fn build_shared(
  builder: &dyn SharedArtifactBuilder,
  content: &NormalizedContent,
  options: &BuildOptions,
) -> Result<SharedArtifacts, BuildError> {
  let mut shared = SharedArtifacts::default();
  builder.build_downloads(content, options, &mut shared)?;
  builder.build_views(content, options, &mut shared)?;
  builder.build_views_mapping(content, options, &mut shared)?;
  builder.build_synonyms(content, options, &mut shared)?;

  debug!(
    views = shared.views.len(),
    synonym_groups = shared.synonyms.len(),
    downloads = shared.downloads.len(),
    files = shared.files.len(),
    "built shared artifacts"
  );

  Ok(shared)
}

/// Builds shared artifacts straight from the normalized content.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentArtifacts;

/// Insert `value` into `tree` at the dot-separated `path`.
fn insert_at_path(tree: &mut Map<String, Value>, path: &str, value: Value) -> Result<(), BuildError> {
  let conflict = || BuildError::ViewPathConflict { path: path.to_string() };
  let parts: Vec<&str> = path.split('.').collect();
  if parts.iter().any(|p| p.is_empty()) {
    return Err(conflict());
  }

  let (last, parents) = parts.split_last().ok_or_else(conflict)?;
  let mut node = tree;
  for part in parents {
    let entry = node
      .entry(part.to_string())
      .or_insert_with(|| Value::Object(Map::new()));
    node = entry.as_object_mut().ok_or_else(conflict)?;
  }

  if node.contains_key(*last) {
    return Err(conflict());
  }
  node.insert(last.to_string(), value);
  Ok(())
}

/// Record every string in `value` as rendered by the view at `path`.
fn map_texts(value: &Value, path: &str, mapping: &mut BTreeMap<String, String>) {
  match value {
    Value::String(text) => {
      mapping.entry(text.clone()).or_insert_with(|| path.to_string());
    }
    Value::Array(items) => {
      for item in items {
        map_texts(item, path, mapping);
      }
    }
    Value::Object(fields) => {
      for (key, item) in fields {
        map_texts(item, &format!("{}.{}", path, key), mapping);
      }
    }
    _ => {}
  }
}

impl SharedArtifactBuilder for ContentArtifacts {
  fn build_downloads(
    &self,
    content: &NormalizedContent,
    options: &BuildOptions,
    shared: &mut SharedArtifacts,
  ) -> Result<(), BuildError> {
    let dir = options.content_dir();
    for download in &content.downloads {
      check_name("download", &download.name)?;
      let rows = shared.downloads.entry(download.name.clone()).or_default();
      rows.extend(download.rows.iter().cloned());
    }

    for (name, rows) in &shared.downloads {
      shared.files.push(FileContent::new(
        dir.join(format!("{}.json", name)),
        serde_json::to_value(rows)?,
      ));
    }
    Ok(())
  }

  fn build_views(
    &self,
    content: &NormalizedContent,
    options: &BuildOptions,
    shared: &mut SharedArtifacts,
  ) -> Result<(), BuildError> {
    let mut trees: BTreeMap<String, Map<String, Value>> = BTreeMap::new();

    for locale in &content.locales {
      let tree = trees.entry(locale.clone()).or_default();
      for view in &content.views {
        let value = view
          .translations
          .get(locale)
          .ok_or_else(|| BuildError::MissingViewTranslation {
            view: view.path.clone(),
            locale: locale.clone(),
          })?;
        insert_at_path(tree, &view.path, value.clone())?;
      }
    }

    let mut file = Map::new();
    for (locale, tree) in trees {
      let tree = Value::Object(tree);
      let mut wrapper = Map::new();
      wrapper.insert("translation".to_string(), tree.clone());
      file.insert(locale.clone(), Value::Object(wrapper));
      shared.views.insert(locale, tree);
    }

    shared
      .files
      .push(FileContent::new(options.views_dir().join(VIEWS_FILENAME), Value::Object(file)));
    Ok(())
  }

  fn build_views_mapping(
    &self,
    content: &NormalizedContent,
    options: &BuildOptions,
    shared: &mut SharedArtifacts,
  ) -> Result<(), BuildError> {
    for locale in shared.views.keys() {
      let mapping = shared.views_mapping.entry(locale.clone()).or_default();
      for view in &content.views {
        if let Some(value) = view.translations.get(locale) {
          map_texts(value, &view.path, mapping);
        }
      }
    }

    shared.files.push(FileContent::new(
      options.views_dir().join(VIEWS_MAP_FILENAME),
      serde_json::to_value(&shared.views_mapping)?,
    ));
    Ok(())
  }

  fn build_synonyms(
    &self,
    content: &NormalizedContent,
    options: &BuildOptions,
    shared: &mut SharedArtifacts,
  ) -> Result<(), BuildError> {
    let dir = options.synonyms_dir();

    for group in &content.synonyms {
      check_name("synonym group", &group.name)?;
      let locales = shared.synonyms.entry(group.name.clone()).or_default();
      for (locale, entries) in &group.entries {
        check_name("synonym locale", locale)?;
        let table = locales.entry(locale.clone()).or_default();
        for entry in entries {
          let values = table.entry(entry.key.clone()).or_default();
          for value in &entry.values {
            if !values.contains(value) {
              values.push(value.clone());
            }
          }
        }
      }
    }

    for (group, locales) in &shared.synonyms {
      for (locale, table) in locales {
        shared.files.push(FileContent::new(
          dir.join(locale).join(format!("{}.json", group)),
          serde_json::to_value(table)?,
        ));
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use serde_json::json;

  use super::*;
  use crate::content::{Download, View};
  use crate::options::InteractionOptions;
  use crate::schema::testutil::travel_content;

  fn options() -> BuildOptions {
    BuildOptions::resolve(InteractionOptions::for_spreadsheet("sheet1")).unwrap()
  }

  fn view(path: &str, en: Value, de: Value) -> View {
    View {
      path: path.to_string(),
      translations: BTreeMap::from([("en-US".to_string(), en), ("de-DE".to_string(), de)]),
    }
  }

  fn content_with_views() -> NormalizedContent {
    let mut content = travel_content();
    content.views = vec![
      view("Greeting.say", json!(["Hello!", "Hi!"]), json!(["Hallo!"])),
      view("Greeting.reprompt", json!("Say hi"), json!("Sag hallo")),
      view("Help", json!({ "say": "Ask me", "tell": "Bye" }), json!({ "say": "Frag mich", "tell": "Tschüss" })),
    ];
    content
  }

  fn path_of<'a>(shared: &'a SharedArtifacts, suffix: &str) -> Option<&'a FileContent> {
    shared.files.iter().find(|f| f.path.ends_with(suffix))
  }

  #[test]
  fn views_nest_by_path_per_locale() {
    let shared = build_shared(&ContentArtifacts, &content_with_views(), &options()).unwrap();

    assert_eq!(
      shared.views["en-US"],
      json!({
        "Greeting": { "say": ["Hello!", "Hi!"], "reprompt": "Say hi" },
        "Help": { "say": "Ask me", "tell": "Bye" }
      })
    );

    let file = path_of(&shared, "views.json").unwrap();
    assert_eq!(file.path, PathBuf::from("content/views.json"));
    assert_eq!(file.content["de-DE"]["translation"]["Greeting"]["say"], json!(["Hallo!"]));
  }

  #[test]
  fn views_mapping_points_texts_at_paths() {
    let shared = build_shared(&ContentArtifacts, &content_with_views(), &options()).unwrap();

    let en = &shared.views_mapping["en-US"];
    assert_eq!(en["Hi!"], "Greeting.say");
    assert_eq!(en["Say hi"], "Greeting.reprompt");
    assert_eq!(en["Bye"], "Help.tell");
    assert_eq!(
      path_of(&shared, "views.map.json").unwrap().path,
      PathBuf::from("content/views.map.json")
    );
  }

  #[test]
  fn missing_view_translation_fails() {
    let mut content = content_with_views();
    content.views[1].translations.remove("de-DE");

    let err = build_shared(&ContentArtifacts, &content, &options()).unwrap_err();

    assert!(matches!(
      err,
      BuildError::MissingViewTranslation { view, locale } if view == "Greeting.reprompt" && locale == "de-DE"
    ));
  }

  #[test]
  fn conflicting_view_paths_fail() {
    let mut content = content_with_views();
    content.views.push(view("Help.say.more", json!("x"), json!("y")));

    let err = build_shared(&ContentArtifacts, &content, &options()).unwrap_err();

    assert!(matches!(err, BuildError::ViewPathConflict { .. }));
  }

  #[test]
  fn synonym_tables_are_written_per_locale() {
    let shared = build_shared(&ContentArtifacts, &travel_content(), &options()).unwrap();

    let en = path_of(&shared, "en-US/transport.json").unwrap();
    assert_eq!(en.path, PathBuf::from("content/synonyms/en-US/transport.json"));
    assert_eq!(en.content, json!({ "bus": ["coach"], "train": ["rail"] }));
    assert!(path_of(&shared, "de-DE/transport.json").is_some());
  }

  #[test]
  fn unknown_synonym_lookup_fails() {
    let shared = build_shared(&ContentArtifacts, &travel_content(), &options()).unwrap();

    assert!(matches!(
      shared.synonym_table("colors", "en-US").unwrap_err(),
      BuildError::UnknownSynonymGroup { .. }
    ));
    assert!(matches!(
      shared.synonym_table("transport", "fr-FR").unwrap_err(),
      BuildError::MissingSynonymLocale { .. }
    ));
  }

  #[test]
  fn downloads_are_exported_verbatim() {
    let mut content = travel_content();
    content.downloads = vec![Download {
      name: "catalog".to_string(),
      rows: vec![BTreeMap::from([("sku".to_string(), json!("A1"))])],
    }];

    let shared = build_shared(&ContentArtifacts, &content, &options()).unwrap();

    let file = path_of(&shared, "catalog.json").unwrap();
    assert_eq!(file.path, PathBuf::from("content/catalog.json"));
    assert_eq!(file.content, json!([{ "sku": "A1" }]));
  }

  #[test]
  fn unsafe_download_names_fail() {
    let mut content = travel_content();
    content.downloads = vec![Download {
      name: "../escape".to_string(),
      rows: vec![],
    }];

    assert!(matches!(
      build_shared(&ContentArtifacts, &content, &options()).unwrap_err(),
      BuildError::InvalidName { kind: "download", .. }
    ));
  }

  #[test]
  fn synonym_locales_must_be_plain_names() {
    let mut content = travel_content();
    let entries = content.synonyms[0].entries.remove("en-US").unwrap();
    content.synonyms[0].entries.insert("../../views".to_string(), entries);

    assert!(matches!(
      build_shared(&ContentArtifacts, &content, &options()).unwrap_err(),
      BuildError::InvalidName { kind: "synonym locale", .. }
    ));
  }
}
