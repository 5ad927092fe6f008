//! Model-level error types.

/// Errors raised while validating a chain or node configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("chain configuration is empty")]
  EmptyChain,

  #[error("node config at index {index} has no services")]
  MissingServices { index: usize },

  #[error("node config at index {index} has a service with an empty target id")]
  EmptyTargetId { index: usize },

  #[error("chain id is missing on node config at index {index}")]
  MissingChainId { index: usize },
}

/// Errors surfaced by broadcast implementations.
///
/// Broadcast delivery is best-effort: callers log these and move on rather
/// than aborting the chain.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
  #[error("no host could be resolved for target '{target_id}'")]
  Unresolvable { target_id: String },

  #[error("transport failure talking to {url}: {message}")]
  Transport { url: String, message: String },

  #[error("invalid broadcast response: {message}")]
  InvalidResponse { message: String },
}
