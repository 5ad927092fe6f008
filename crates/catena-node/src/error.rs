//! Node error types.

use catena_chain::BroadcastError;
use catena_pipeline::PipelineError;

/// Errors that can occur while executing a node.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
  /// `execute` was called before `set_config`.
  #[error("node is not configured")]
  NotConfigured,

  /// Execution was cancelled.
  #[error("execution cancelled")]
  Cancelled,

  /// A processor callback failed; the node transitions to `NODE_FAILED`.
  #[error("pipeline failed: {source}")]
  Pipeline {
    #[from]
    source: PipelineError,
  },

  /// A broadcast the node depends on failed.
  #[error("broadcast failed: {source}")]
  Broadcast {
    #[from]
    source: BroadcastError,
  },

  /// A control signal violated the node's state machine, e.g. a resume
  /// with no suspended state to consume. Degrades to a warning no-op.
  #[error("state violation: {message}")]
  StateViolation { message: String },

  /// The hosting supervisor was dropped while the node was still running.
  #[error("chain host is gone")]
  HostGone,

  /// The hosting supervisor rejected a request made on the node's behalf.
  #[error("chain host error: {message}")]
  Host { message: String },
}
