//! Defaults and well-known names shared across the crate.

pub const DEFAULT_SPEECH_PATH: &str = "speech-assets";
pub const DEFAULT_CONTENT_PATH: &str = "content";
pub const DEFAULT_VIEWS_PATH: &str = "/";
pub const DEFAULT_SYNONYM_PATH: &str = "synonyms";
pub const DEFAULT_ASSETS_PATH: &str = "assets";

/// Environment used when the content declares none.
pub const DEFAULT_ENVIRONMENT: &str = "production";

pub const VIEWS_FILENAME: &str = "views.json";
pub const VIEWS_MAP_FILENAME: &str = "views.map.json";

/// Index served at the root of every remote asset directory.
pub const ASSET_INDEX_FILENAME: &str = "index.json";

/// Length of the hex prefix used for deterministic Dialogflow ids.
pub const STABLE_ID_HEX_LEN: usize = 32;
