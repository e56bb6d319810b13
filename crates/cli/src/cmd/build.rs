//! Implementation of the `voxgen build` command.
//!
//! Loads the configured sheets, rebuilds every selected platform's schema
//! tree plus the shared artifacts, and downloads remote assets.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use voxgen_lib::content::JsonSheetSource;
use voxgen_lib::pipeline::Pipeline;

use super::BuildArgs;
use crate::output::{self, format_duration, print_json, print_stat, print_success};

pub fn cmd_build(args: &BuildArgs, verbose: bool) -> Result<()> {
  let options = args.interaction_options()?;
  let root = options.root_path.clone().filter(|r| !r.is_empty()).unwrap_or_else(|| ".".to_string());

  let pipeline = Pipeline::new(JsonSheetSource::new(args.sources()));

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt
    .block_on(pipeline.run(options, &args.auth()))
    .context("Build failed")?;

  if args.output().is_json() {
    return print_json(&report);
  }

  let root = dunce::canonicalize(&root).unwrap_or_else(|_| PathBuf::from(&root));
  info!(root = %root.display(), "output written");

  print_success(&format!("Build complete: {} file(s) written", report.files_written));
  print_stat("Output", &root.display().to_string());
  print_stat("Shared artifacts", &report.shared_files.to_string());
  for (namespace, count) in &report.platform_files {
    print_stat(namespace, &count.to_string());
  }
  if report.assets_downloaded > 0 {
    print_stat("Assets", &report.assets_downloaded.to_string());
  }
  print_stat("Elapsed", &format_duration(Duration::from_millis(report.elapsed_ms)));

  if verbose {
    println!();
    for path in &report.paths {
      println!("  {} {}", output::symbols::ADD, path.display());
    }
  }

  Ok(())
}
