//! Process callback contracts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use catena_chain::PipelineMeta;

use crate::error::PipelineError;

/// Everything a process callback needs to invoke the external service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPayload {
  pub target_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub meta: Option<PipelineMeta>,
  pub chain_id: String,
  pub data: Value,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_target_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_node_resolver: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub previous_target_id: Option<String>,
}

/// Invokes the external service behind a processor.
#[async_trait]
pub trait ProcessCallback: Send + Sync {
  async fn digest(&self, payload: CallbackPayload) -> Result<Value, PipelineError>;
}

/// Invokes the service behind a pre-stage processor.
///
/// Kept as a separate seam so embedders can route pre-stage traffic
/// differently from regular digestion.
#[async_trait]
pub trait PreProcessCallback: Send + Sync {
  async fn pre_digest(&self, payload: CallbackPayload) -> Result<Value, PipelineError>;
}

/// Returns the payload data unchanged. The reference callback for demos
/// and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoCallback;

#[async_trait]
impl ProcessCallback for EchoCallback {
  async fn digest(&self, payload: CallbackPayload) -> Result<Value, PipelineError> {
    Ok(payload.data)
  }
}

#[async_trait]
impl PreProcessCallback for EchoCallback {
  async fn pre_digest(&self, payload: CallbackPayload) -> Result<Value, PipelineError> {
    Ok(payload.data)
  }
}
