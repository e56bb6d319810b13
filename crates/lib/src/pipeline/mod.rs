//! Build orchestration.
//!
//! A run goes through these steps in order:
//! 1. Resolve options (no I/O before this succeeds)
//! 2. Acquire content from the [`ContentSource`], once
//! 3. Validate content names, instantiate the selected platforms and remove
//!    their stale output
//! 4. Build the shared artifacts, once
//! 5. Build every invocation of every platform
//! 6. Check output paths are unique, then write all files concurrently
//! 7. Download remote assets after every write finished
//!
//! Any failure aborts the run. Files already written are left in place.

pub mod observe;
mod types;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::assets::{AssetFetcher, HttpAssetFetcher};
use crate::content::{ContentSource, NormalizedContent};
use crate::emit::{EmitError, FileEmitter, FsEmitter};
use crate::options::{AuthKeys, BuildOptions, InteractionOptions};
use crate::schema::{BuildError, FileContent, SchemaInstance, validate_content};
use crate::shared::{ContentArtifacts, SharedArtifactBuilder, build_shared};

pub use observe::{BuildObserver, Phase, TracingObserver};
pub use types::{BuildPlan, BuildReport, PipelineError};

/// Every file of a run, in emit order.
#[derive(Debug)]
struct Compiled {
  shared_files: usize,
  platform_files: BTreeMap<String, usize>,
  files: Vec<FileContent>,
}

impl Compiled {
  fn plan(&self) -> BuildPlan {
    BuildPlan {
      shared_files: self.shared_files,
      platform_files: self.platform_files.clone(),
      paths: self.files.iter().map(|f| f.path.clone()).collect(),
    }
  }
}

/// The build orchestrator and its collaborators.
pub struct Pipeline<C, E = FsEmitter, A = HttpAssetFetcher> {
  source: C,
  emitter: Arc<E>,
  assets: A,
  artifacts: Box<dyn SharedArtifactBuilder>,
  observer: Arc<dyn BuildObserver>,
}

impl<C: ContentSource> Pipeline<C> {
  /// A pipeline writing to the local filesystem and fetching assets over HTTP.
  pub fn new(source: C) -> Self {
    Self::with_parts(source, FsEmitter, HttpAssetFetcher::new())
  }
}

impl<C, E, A> Pipeline<C, E, A>
where
  C: ContentSource,
  E: FileEmitter,
  A: AssetFetcher,
{
  pub fn with_parts(source: C, emitter: E, assets: A) -> Self {
    Self {
      source,
      emitter: Arc::new(emitter),
      assets,
      artifacts: Box::new(ContentArtifacts),
      observer: Arc::new(TracingObserver),
    }
  }

  pub fn with_artifact_builder(mut self, artifacts: Box<dyn SharedArtifactBuilder>) -> Self {
    self.artifacts = artifacts;
    self
  }

  pub fn with_observer(mut self, observer: Arc<dyn BuildObserver>) -> Self {
    self.observer = observer;
    self
  }

  pub fn emitter(&self) -> &E {
    &self.emitter
  }

  /// Run a full build: clean, generate, write, fetch assets.
  pub async fn run(&self, options: InteractionOptions, auth: &AuthKeys) -> Result<BuildReport, PipelineError> {
    let started = Instant::now();
    let options = BuildOptions::resolve(options)?;

    info!(
      platforms = ?options.platforms(),
      spreadsheets = options.spreadsheets().len(),
      "starting build"
    );

    let content = self.acquire(&options, auth).await?;
    let compiled = self.compile(&content, &options, true).await?;

    let emit_started = Instant::now();
    let paths = self.emit(&compiled.files).await?;
    self.observer.phase_finished(&Phase::Emit, emit_started.elapsed());

    let assets_started = Instant::now();
    let assets = self
      .assets
      .download_dirs(options.assets(), &options.assets_dir(), auth)
      .await?;
    self.observer.phase_finished(&Phase::Assets, assets_started.elapsed());

    let elapsed = started.elapsed();
    self.observer.phase_finished(&Phase::Total, elapsed);

    info!(
      files = paths.len(),
      shared = compiled.shared_files,
      assets = assets.len(),
      "build complete"
    );

    Ok(BuildReport {
      files_written: paths.len(),
      shared_files: compiled.shared_files,
      platform_files: compiled.platform_files,
      assets_downloaded: assets.len(),
      paths,
      elapsed_ms: elapsed.as_millis() as u64,
    })
  }

  /// Build everything in memory and report what [`run`](Self::run) would write.
  ///
  /// Nothing is removed, written or downloaded.
  pub async fn plan(&self, options: InteractionOptions, auth: &AuthKeys) -> Result<BuildPlan, PipelineError> {
    let options = BuildOptions::resolve(options)?;
    let content = self.acquire(&options, auth).await?;
    let compiled = self.compile(&content, &options, false).await?;

    for file in &compiled.files {
      file.render()?;
    }

    Ok(compiled.plan())
  }

  async fn acquire(&self, options: &BuildOptions, auth: &AuthKeys) -> Result<NormalizedContent, PipelineError> {
    let started = Instant::now();
    let content = self.source.transform(options, auth).await?;
    self.observer.phase_finished(&Phase::Acquire, started.elapsed());

    debug!(
      locales = ?content.locales,
      intents = content.intents.len(),
      slot_types = content.slots.len(),
      "acquired content"
    );
    Ok(content)
  }

  async fn compile(
    &self,
    content: &NormalizedContent,
    options: &BuildOptions,
    clean: bool,
  ) -> Result<Compiled, PipelineError> {
    validate_content(content)?;

    let mut instances: Vec<SchemaInstance<'_>> = options
      .platforms()
      .iter()
      .map(|platform| platform.instantiate(content, options))
      .collect::<Result<_, _>>()?;

    if clean {
      let started = Instant::now();
      for instance in &instances {
        self.emitter.remove(&options.namespace_dir(instance.namespace())).await?;
      }
      self.observer.phase_finished(&Phase::Clean, started.elapsed());
    }

    let started = Instant::now();
    let shared = build_shared(self.artifacts.as_ref(), content, options)?;
    self.observer.phase_finished(&Phase::SharedArtifacts, started.elapsed());

    let mut files = shared.files.clone();
    let shared_files = files.len();
    let mut platform_files = BTreeMap::new();

    for instance in &mut instances {
      let started = Instant::now();
      let invocations = instance.invocations().to_vec();
      for invocation in &invocations {
        instance.build(&invocation.locale, &invocation.environment, &shared)?;
      }

      let built = instance.take_file_content();
      debug!(
        platform = %instance.platform(),
        invocations = invocations.len(),
        files = built.len(),
        "built platform schema"
      );
      platform_files.insert(instance.namespace().to_string(), built.len());
      files.extend(built);
      self.observer.phase_finished(&Phase::Schema(instance.platform()), started.elapsed());
    }

    check_unique_paths(&files)?;

    Ok(Compiled {
      shared_files,
      platform_files,
      files,
    })
  }

  /// Write every file concurrently and wait for all writes to finish.
  ///
  /// Returns the written paths in `files` order. The first write error is
  /// reported once every task has completed.
  async fn emit(&self, files: &[FileContent]) -> Result<Vec<PathBuf>, PipelineError> {
    let rendered = files
      .iter()
      .map(|file| file.render().map(|contents| (file.path.clone(), contents)))
      .collect::<Result<Vec<_>, _>>()?;

    let mut join_set = JoinSet::new();
    for (path, contents) in rendered {
      let emitter = Arc::clone(&self.emitter);
      join_set.spawn(async move { emitter.output_file(&path, contents).await });
    }

    let mut first_error = None;
    while let Some(join_result) = join_set.join_next().await {
      let outcome = join_result.unwrap_or_else(|e| Err(EmitError::Task(e.to_string())));
      if let Err(e) = outcome {
        error!(error = %e, "write failed");
        first_error.get_or_insert(e);
      }
    }

    if let Some(e) = first_error {
      return Err(e.into());
    }
    Ok(files.iter().map(|f| f.path.clone()).collect())
  }
}

/// Build everything `options` selects from `source` with the default
/// filesystem emitter and HTTP asset fetcher.
pub async fn build_interaction<C: ContentSource>(
  source: C,
  options: InteractionOptions,
  auth: &AuthKeys,
) -> Result<BuildReport, PipelineError> {
  Pipeline::new(source).run(options, auth).await
}

fn check_unique_paths(files: &[FileContent]) -> Result<(), BuildError> {
  let mut seen: HashSet<&Path> = HashSet::with_capacity(files.len());
  for file in files {
    if !seen.insert(file.path.as_path()) {
      return Err(BuildError::DuplicatePath(file.path.clone()));
    }
  }
  Ok(())
}
