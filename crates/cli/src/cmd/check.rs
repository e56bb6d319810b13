//! Implementation of the `voxgen check` command.
//!
//! Runs the whole build in memory and lists the files it would write. Nothing
//! on disk is removed or written.

use anyhow::{Context, Result};

use voxgen_lib::content::JsonSheetSource;
use voxgen_lib::pipeline::Pipeline;

use super::BuildArgs;
use crate::output::{self, print_json, print_stat, print_success};

pub fn cmd_check(args: &BuildArgs, verbose: bool) -> Result<()> {
  let options = args.interaction_options()?;
  let pipeline = Pipeline::new(JsonSheetSource::new(args.sources()));

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let plan = rt
    .block_on(pipeline.plan(options, &args.auth()))
    .context("Check failed")?;

  if args.output().is_json() {
    return print_json(&plan);
  }

  print_success(&format!("Check passed: {} file(s) would be written", plan.file_count()));
  print_stat("Shared artifacts", &plan.shared_files.to_string());
  for (namespace, count) in &plan.platform_files {
    print_stat(namespace, &count.to_string());
  }

  if verbose {
    println!();
    for path in &plan.paths {
      println!("  {} {}", output::symbols::ADD, path.display());
    }
  }

  Ok(())
}
