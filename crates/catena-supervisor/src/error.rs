//! Supervisor error types.

use catena_chain::ConfigError;
use catena_node::NodeError;
use catena_pipeline::PipelineError;

/// Errors raised while dispatching supervisor requests.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
  /// The chain configuration failed structural validation.
  #[error(transparent)]
  Config(#[from] ConfigError),

  /// No chain relation is registered under the given id.
  #[error("unknown chain '{chain_id}'")]
  UnknownChain { chain_id: String },

  /// A chain with the given id is already registered.
  #[error("chain '{chain_id}' is already registered")]
  DuplicateChain { chain_id: String },

  /// No local node matches `(targetId, chainId)`.
  #[error("no node found for target '{target_id}' in chain '{chain_id}'")]
  RoutingMiss {
    chain_id: String,
    target_id: String,
  },

  /// A node execution issued by the supervisor failed.
  #[error("node execution failed: {source}")]
  Node {
    #[from]
    source: NodeError,
  },

  /// The pre-processor callback failed.
  #[error("pre-processor failed: {source}")]
  PreProcessor {
    #[from]
    source: PipelineError,
  },
}
