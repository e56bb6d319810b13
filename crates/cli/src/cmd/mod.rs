mod build;
mod check;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use voxgen_lib::options::{AuthKeys, BuildOptions, InteractionOptions, OneOrMany};

use crate::output::OutputFormat;

pub use build::cmd_build;
pub use check::cmd_check;

/// Options file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG: &str = "voxgen.json";

/// Flags shared by `build` and `check`.
#[derive(Args, Debug)]
pub struct BuildArgs {
  /// Options file (camelCase JSON); defaults to ./voxgen.json when present
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Directory holding the normalized sheets ({id}.json)
  #[arg(long, default_value = "sheets")]
  sources: PathBuf,

  /// Root directory every output path is relative to
  #[arg(long)]
  root: Option<String>,

  /// Platform to build (repeatable)
  #[arg(short, long = "platform")]
  platforms: Vec<String>,

  /// Spreadsheet id to load (repeatable)
  #[arg(short, long = "spreadsheet")]
  spreadsheets: Vec<String>,

  /// Remote asset directory to download (repeatable)
  #[arg(long = "asset")]
  assets: Vec<String>,

  /// Bearer token for the content source and asset downloads
  #[arg(long, env = "VOXGEN_TOKEN", hide_env_values = true)]
  token: Option<String>,

  /// Output format
  #[arg(short = 'o', long, value_enum, default_value = "text")]
  output: OutputFormat,
}

impl BuildArgs {
  /// Options file values overlaid with command-line flags.
  pub fn interaction_options(&self) -> Result<InteractionOptions> {
    let base = match self.config_path() {
      Some(path) => BuildOptions::load_file(&path)
        .with_context(|| format!("Failed to load options file: {}", path.display()))?,
      None => InteractionOptions::default(),
    };

    let non_empty = |values: &[String]| (!values.is_empty()).then(|| values.to_vec());
    let overrides = InteractionOptions {
      root_path: self.root.clone(),
      platforms: non_empty(&self.platforms).map(OneOrMany::Many),
      spreadsheets: non_empty(&self.spreadsheets).map(OneOrMany::Many),
      assets: non_empty(&self.assets),
      ..Default::default()
    };

    Ok(base.merge(overrides))
  }

  pub fn auth(&self) -> AuthKeys {
    match &self.token {
      Some(token) if !token.is_empty() => AuthKeys::bearer(token.clone()),
      _ => AuthKeys::none(),
    }
  }

  pub fn sources(&self) -> &Path {
    &self.sources
  }

  pub fn output(&self) -> OutputFormat {
    self.output
  }

  fn config_path(&self) -> Option<PathBuf> {
    match &self.config {
      Some(path) => Some(path.clone()),
      None => {
        let default = PathBuf::from(DEFAULT_CONFIG);
        default.is_file().then_some(default)
      }
    }
  }
}
