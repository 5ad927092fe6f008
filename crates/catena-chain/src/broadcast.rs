//! Outbound broadcast contracts.
//!
//! The supervisor and its nodes never talk to remote hosts directly; they go
//! through these traits. `catena-remote` provides the default HTTP POST
//! implementations, tests plug in recording stubs, and [`NoopBroadcast`]
//! discards everything for purely local deployments.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{NodeConfig, PipelineMeta};
use crate::error::BroadcastError;
use crate::signal::ChainSignal;

/// Setup message delivered to the supervisor hosting a remote segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupPayload {
  pub chain_id: String,
  pub remote_configs: Vec<NodeConfig>,
}

/// Data hand-off to the next remote hop of a chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRunPayload {
  pub chain_id: String,
  pub target_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub meta: Option<PipelineMeta>,
  pub data: Value,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_target_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_node_resolver: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_meta: Option<PipelineMeta>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub previous_target_id: Option<String>,
}

/// Node addressed by a cross-host status signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTarget {
  pub target_id: String,
  #[serde(rename = "hostURI", skip_serializing_if = "Option::is_none")]
  pub host_uri: Option<String>,
}

/// Suspend/resume signal forwarded to the host owning the target node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBroadcastPayload {
  pub chain_id: String,
  pub signal: ChainSignal,
  pub payload: StatusTarget,
}

/// Progress report emitted by a node's reporting agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMessage {
  pub chain_id: String,
  pub node_id: String,
  pub index: usize,
  pub count: usize,
  pub status: ChainSignal,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub signal: Option<ChainSignal>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub payload: Option<Value>,
}

/// Distributes remote node configs to their hosting supervisors.
#[async_trait]
pub trait BroadcastSetup: Send + Sync {
  async fn broadcast_setup(&self, payload: SetupPayload) -> Result<(), BroadcastError>;
}

/// Dispatches a pre-stage sub-chain and returns its result, if any.
#[async_trait]
pub trait BroadcastPre: Send + Sync {
  async fn broadcast_pre(
    &self,
    configs: &[NodeConfig],
    data: Value,
  ) -> Result<Option<Value>, BroadcastError>;
}

/// Forwards data to the next remote hop of a chain.
#[async_trait]
pub trait RemoteService: Send + Sync {
  async fn call_remote_service(&self, payload: RemoteRunPayload) -> Result<(), BroadcastError>;
}

/// Enqueues a suspend/resume signal on a remote host.
#[async_trait]
pub trait NodeStatusBroadcast: Send + Sync {
  async fn broadcast_node_status(
    &self,
    payload: StatusBroadcastPayload,
  ) -> Result<(), BroadcastError>;
}

/// Delivers global-signal reports to a chain's monitoring host.
#[async_trait]
pub trait ReportingSink: Send + Sync {
  async fn report(
    &self,
    monitoring_host: &str,
    message: ReportMessage,
  ) -> Result<(), BroadcastError>;
}

/// Discards every outbound message.
///
/// Useful for tests and for supervisors that only ever run fully local
/// chains.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBroadcast;

#[async_trait]
impl BroadcastSetup for NoopBroadcast {
  async fn broadcast_setup(&self, payload: SetupPayload) -> Result<(), BroadcastError> {
    tracing::debug!(chain_id = %payload.chain_id, "setup broadcast discarded");
    Ok(())
  }
}

#[async_trait]
impl BroadcastPre for NoopBroadcast {
  async fn broadcast_pre(
    &self,
    _configs: &[NodeConfig],
    _data: Value,
  ) -> Result<Option<Value>, BroadcastError> {
    Ok(None)
  }
}

#[async_trait]
impl RemoteService for NoopBroadcast {
  async fn call_remote_service(&self, payload: RemoteRunPayload) -> Result<(), BroadcastError> {
    tracing::debug!(
      chain_id = %payload.chain_id,
      target_id = %payload.target_id,
      "remote hand-off discarded"
    );
    Ok(())
  }
}

#[async_trait]
impl NodeStatusBroadcast for NoopBroadcast {
  async fn broadcast_node_status(
    &self,
    _payload: StatusBroadcastPayload,
  ) -> Result<(), BroadcastError> {
    Ok(())
  }
}

#[async_trait]
impl ReportingSink for NoopBroadcast {
  async fn report(
    &self,
    _monitoring_host: &str,
    _message: ReportMessage,
  ) -> Result<(), BroadcastError> {
    Ok(())
  }
}
