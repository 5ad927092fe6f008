//! Chain and node configuration model.
//!
//! A chain is an ordered list of [`NodeConfig`] entries. The deploying
//! supervisor fills in `chain_id`, `index`, `count` and `monitoring_host`
//! at chain creation; everything else is authored by the client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;
use crate::signal::ChainSignal;

/// Where a node config runs relative to the deploying supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
  #[default]
  Local,
  Remote,
}

/// How a child chain relates to its parent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildMode {
  #[default]
  Normal,
  Parallel,
  Pre,
}

/// Chain behavior bitmask.
///
/// Only the `PERSISTENT` and `AUTO_DELETE` bits are interpreted; the rest
/// of the word is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainType(pub u32);

impl ChainType {
  pub const DEFAULT: ChainType = ChainType(0);
  /// Nodes of the chain survive completion.
  pub const PERSISTENT: ChainType = ChainType(1);
  /// Nodes are deleted by the supervisor right after hand-off.
  pub const AUTO_DELETE: ChainType = ChainType(1 << 1);

  pub fn contains(self, bits: ChainType) -> bool {
    self.0 & bits.0 != 0
  }
}

/// Opaque service metadata carried through to the process callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineMeta {
  /// Base URL of the host serving the target, when known up front.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub resolver: Option<String>,
  /// Opaque configuration map (`params`, `infrastructureConfiguration`,
  /// `dataExchange`, ...), never interpreted by the core.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub configuration: Option<Value>,
}

/// One outbound service of a node.
///
/// Accepts both the shorthand wire form (a bare target id string) and the
/// full object form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ServiceEntry")]
pub struct ServiceConfig {
  pub target_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub meta: Option<PipelineMeta>,
}

impl ServiceConfig {
  pub fn new(target_id: impl Into<String>) -> Self {
    Self {
      target_id: target_id.into(),
      meta: None,
    }
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ServiceEntry {
  Plain(String),
  Detailed {
    #[serde(rename = "targetId")]
    target_id: String,
    #[serde(default)]
    meta: Option<PipelineMeta>,
  },
}

impl From<ServiceEntry> for ServiceConfig {
  fn from(entry: ServiceEntry) -> Self {
    match entry {
      ServiceEntry::Plain(target_id) => ServiceConfig {
        target_id,
        meta: None,
      },
      ServiceEntry::Detailed { target_id, meta } => ServiceConfig { target_id, meta },
    }
  }
}

/// Configuration of one node (one stage) of a chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
  /// Chain the node belongs to. Assigned at chain creation for deploys;
  /// must already be present on remote setup payloads.
  #[serde(default)]
  pub chain_id: String,
  /// Dense position within the chain, filled in at chain creation.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub index: Option<usize>,
  /// Total number of node configs in the chain, filled in at chain creation.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub count: Option<usize>,
  #[serde(default)]
  pub location: Location,
  pub services: Vec<ServiceConfig>,
  /// URL receiving the chain's global-signal reports. `None` (or the
  /// literal `"local"`) means the deploying supervisor is the monitor.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub monitoring_host: Option<String>,
  #[serde(default)]
  pub chain_type: ChainType,
  #[serde(default)]
  pub child_mode: ChildMode,
  /// Pre-stage sub-chains, executed before the node's own pipelines.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub pre: Vec<Vec<NodeConfig>>,
  /// Child chain deployed by the node during execution.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub chain_config: Option<Vec<NodeConfig>>,
  /// On a child chain's root config: the deploying parent's config.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub root_config: Option<Box<NodeConfig>>,
  /// Next-hop annotations computed by the distributor's lookahead.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_target_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_node_resolver: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_meta: Option<PipelineMeta>,
  /// Control signals enqueued at setup, observed at the first execution's
  /// batch boundaries.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub signal_queue: Vec<ChainSignal>,
  /// Reserved metadata, never consulted in scheduling decisions.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub dependencies: Vec<String>,
}

impl NodeConfig {
  /// Shorthand for a local config over the given services.
  pub fn local(services: Vec<ServiceConfig>) -> Self {
    NodeConfig {
      location: Location::Local,
      services,
      ..NodeConfig::default()
    }
  }

  /// The chain id, or a config-invalid error when it was never assigned.
  pub fn require_chain_id(&self) -> Result<&str, ConfigError> {
    if self.chain_id.is_empty() {
      return Err(ConfigError::MissingChainId {
        index: self.index.unwrap_or(0),
      });
    }
    Ok(&self.chain_id)
  }

  /// First service of the config, the canonical target of the node.
  pub fn first_service(&self) -> Option<&ServiceConfig> {
    self.services.first()
  }
}

/// An ordered chain of node configurations.
pub type ChainConfig = Vec<NodeConfig>;

/// Structural validation applied before a chain is accepted for deploy.
pub fn validate_chain_config(config: &[NodeConfig]) -> Result<(), ConfigError> {
  if config.is_empty() {
    return Err(ConfigError::EmptyChain);
  }
  for (index, node) in config.iter().enumerate() {
    if node.services.is_empty() {
      return Err(ConfigError::MissingServices { index });
    }
    if node.services.iter().any(|s| s.target_id.is_empty()) {
      return Err(ConfigError::EmptyTargetId { index });
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn services_accept_shorthand_and_object_forms() {
    let config: NodeConfig = serde_json::from_value(json!({
      "location": "local",
      "services": [
        "svc-A",
        { "targetId": "http://h:9/svc", "meta": { "resolver": "http://h:9/" } }
      ]
    }))
    .unwrap();

    assert_eq!(config.services.len(), 2);
    assert_eq!(config.services[0].target_id, "svc-A");
    assert_eq!(config.services[1].target_id, "http://h:9/svc");
    assert_eq!(
      config.services[1].meta.as_ref().unwrap().resolver.as_deref(),
      Some("http://h:9/")
    );
  }

  #[test]
  fn chain_type_bits() {
    let both = ChainType(ChainType::PERSISTENT.0 | ChainType::AUTO_DELETE.0);
    assert!(both.contains(ChainType::PERSISTENT));
    assert!(both.contains(ChainType::AUTO_DELETE));
    assert!(!ChainType::DEFAULT.contains(ChainType::PERSISTENT));
  }

  #[test]
  fn validation_rejects_empty_and_unnamed_services() {
    assert!(matches!(
      validate_chain_config(&[]),
      Err(ConfigError::EmptyChain)
    ));

    let no_services = NodeConfig::local(vec![]);
    assert!(matches!(
      validate_chain_config(&[no_services]),
      Err(ConfigError::MissingServices { index: 0 })
    ));

    let unnamed = NodeConfig::local(vec![ServiceConfig::new("")]);
    assert!(matches!(
      validate_chain_config(&[unnamed]),
      Err(ConfigError::EmptyTargetId { index: 0 })
    ));
  }

  #[test]
  fn nested_sub_configs_round_trip() {
    let config = NodeConfig {
      chain_id: "c1".into(),
      services: vec![ServiceConfig::new("svc")],
      pre: vec![vec![NodeConfig::local(vec![ServiceConfig::new("pre1")])]],
      signal_queue: vec![ChainSignal::NodeSuspend],
      ..NodeConfig::default()
    };

    let encoded = serde_json::to_value(&config).unwrap();
    assert_eq!(encoded["chainId"], "c1");
    assert_eq!(encoded["signalQueue"][0], "NODE_SUSPEND");

    let decoded: NodeConfig = serde_json::from_value(encoded).unwrap();
    assert_eq!(decoded.pre.len(), 1);
    assert_eq!(decoded.pre[0][0].services[0].target_id, "pre1");
  }
}
