//! The supervisor's request surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use catena_chain::{ChainConfig, NodeConfig};

/// A tagged request signal accepted by `NodeSupervisor::handle_request`.
///
/// Wire form carries the protocol signal literal in a `signal` tag with
/// camelCase fields, matching the connector's JSON bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
  tag = "signal",
  rename_all = "SCREAMING_SNAKE_CASE",
  rename_all_fields = "camelCase"
)]
pub enum SupervisorRequest {
  /// Register a remote segment delivered by a peer's chain distributor.
  NodeSetup {
    chain_id: String,
    remote_configs: Vec<NodeConfig>,
  },
  /// Create a single local node from a config.
  NodeCreate { config: NodeConfig },
  /// Delete a local node, respecting the persistence bit.
  NodeDelete { node_id: String },
  /// Run a local node by id with the given data.
  NodeRun { node_id: String, data: Value },
  /// Run a local node resolved by `(targetId, chainId)`.
  NodeSendData {
    chain_id: String,
    target_id: String,
    data: Value,
  },
  /// Run the pre-processor callback over a config and return its data.
  NodePre { config: NodeConfig, data: Value },
  /// Enqueue a suspension on the node resolved by `(targetId, chainId)`,
  /// or forward it when `hostURI` names another host.
  NodeSuspend {
    chain_id: String,
    target_id: String,
    #[serde(rename = "hostURI", default, skip_serializing_if = "Option::is_none")]
    host_uri: Option<String>,
  },
  /// Enqueue a resume, optionally replacing the suspended data.
  NodeResume {
    chain_id: String,
    target_id: String,
    #[serde(rename = "hostURI", default, skip_serializing_if = "Option::is_none")]
    host_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
  },
  /// Partition a created chain into local nodes plus remote broadcasts.
  ChainPrepare { chain_id: String },
  /// Run a chain's local root node.
  ChainStart {
    chain_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
  },
  /// Start a deployed chain with its stashed data.
  ChainStartPendingOccurrence { chain_id: String },
  /// Create, distribute and start a chain in one request.
  ChainDeploy {
    config: ChainConfig,
    data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_chain_id: Option<String>,
  },
}

/// Response to a dispatched request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SupervisorResponse {
  Ack,
  NodeId(String),
  ChainId(String),
  Data(Value),
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn requests_deserialize_from_protocol_bodies() {
    let request: SupervisorRequest = serde_json::from_value(json!({
      "signal": "NODE_SUSPEND",
      "chainId": "c1",
      "targetId": "svc-A",
      "hostURI": "http://peer:8080"
    }))
    .unwrap();

    match request {
      SupervisorRequest::NodeSuspend {
        chain_id,
        target_id,
        host_uri,
      } => {
        assert_eq!(chain_id, "c1");
        assert_eq!(target_id, "svc-A");
        assert_eq!(host_uri.as_deref(), Some("http://peer:8080"));
      }
      other => panic!("unexpected request: {other:?}"),
    }
  }

  #[test]
  fn deploy_round_trips() {
    let request = SupervisorRequest::ChainDeploy {
      config: vec![],
      data: json!({"k": 1}),
      parent_chain_id: None,
    };
    let encoded = serde_json::to_value(&request).unwrap();
    assert_eq!(encoded["signal"], "CHAIN_DEPLOY");
    assert_eq!(encoded["data"], json!({"k": 1}));
  }
}
