//! The node's view of its hosting supervisor.

use async_trait::async_trait;
use serde_json::Value;

use catena_chain::ChainConfig;

use crate::error::NodeError;

/// Operations a node delegates back to its supervisor.
///
/// Only the supervisor mutates the node registry or creates chain ids, so
/// local hand-off, child-chain deployment and deletion all funnel through
/// this seam. Nodes hold a `Weak` reference to the host to avoid keeping
/// the supervisor alive from its own registry.
#[async_trait]
pub trait ChainHost: Send + Sync {
  /// Run a local node with the given data, chaining onto its execution
  /// queue and awaiting completion.
  async fn run_node(&self, node_id: &str, data: Option<Value>) -> Result<(), NodeError>;

  /// Deploy a child chain and return its chain id. The initial data is
  /// stashed for a later `start_pending_chain`.
  async fn deploy_chain(
    &self,
    config: ChainConfig,
    data: Value,
    parent_chain_id: Option<String>,
  ) -> Result<String, NodeError>;

  /// Start a previously deployed chain with its stashed data.
  async fn start_pending_chain(&self, chain_id: &str) -> Result<(), NodeError>;

  /// Remove a node from the registry, respecting the persistence bit.
  async fn delete_node(&self, node_id: &str) -> Result<(), NodeError>;
}
