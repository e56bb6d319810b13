//! Phase timing hooks.

use std::time::Duration;

use tracing::info;

use crate::schema::Platform;

/// A labeled stage of a build run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  /// Content acquisition from the source.
  Acquire,
  /// Removal of stale namespace directories.
  Clean,
  /// The once-per-run shared artifact steps.
  SharedArtifacts,
  /// All invocations of one platform.
  Schema(Platform),
  /// Concurrent file writes, up to the barrier.
  Emit,
  /// Remote asset download.
  Assets,
  /// The whole run.
  Total,
}

impl std::fmt::Display for Phase {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Phase::Acquire => f.write_str("acquire"),
      Phase::Clean => f.write_str("clean"),
      Phase::SharedArtifacts => f.write_str("shared-artifacts"),
      Phase::Schema(platform) => write!(f, "schema:{}", platform),
      Phase::Emit => f.write_str("emit"),
      Phase::Assets => f.write_str("assets"),
      Phase::Total => f.write_str("total"),
    }
  }
}

/// Receives the duration of every finished phase.
pub trait BuildObserver: Send + Sync {
  fn phase_finished(&self, phase: &Phase, elapsed: Duration);
}

/// Logs phase durations through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl BuildObserver for TracingObserver {
  fn phase_finished(&self, phase: &Phase, elapsed: Duration) {
    info!(phase = %phase, elapsed_ms = elapsed.as_millis() as u64, "phase finished");
  }
}
