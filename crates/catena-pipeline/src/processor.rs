//! A processor wraps one outbound service call.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use catena_chain::{PipelineMeta, ServiceConfig};

use crate::callback::{CallbackPayload, ProcessCallback};
use crate::error::PipelineError;

/// Per-execution context shared by every processor of a node.
#[derive(Debug, Clone, Default)]
pub struct ProcessorContext {
  pub chain_id: String,
  pub next_target_id: Option<String>,
  pub next_node_resolver: Option<String>,
  pub previous_target_id: Option<String>,
}

/// Wraps a single outbound service call.
///
/// Holds the target id and opaque meta of the service, and delegates the
/// actual invocation to the injected process callback.
#[derive(Clone)]
pub struct Processor {
  target_id: String,
  meta: Option<PipelineMeta>,
  callback: Option<Arc<dyn ProcessCallback>>,
}

impl Processor {
  pub fn new(service: &ServiceConfig, callback: Option<Arc<dyn ProcessCallback>>) -> Self {
    Self {
      target_id: service.target_id.clone(),
      meta: service.meta.clone(),
      callback,
    }
  }

  pub fn target_id(&self) -> &str {
    &self.target_id
  }

  /// Digest a data value through the external service.
  ///
  /// A processor without a registered callback is tolerated: it yields an
  /// empty value and logs the miss.
  pub async fn digest(&self, ctx: &ProcessorContext, data: Value) -> Result<Value, PipelineError> {
    let Some(callback) = &self.callback else {
      warn!(
        target_id = %self.target_id,
        "no process callback registered, yielding empty value"
      );
      return Ok(Value::Null);
    };

    let payload = CallbackPayload {
      target_id: self.target_id.clone(),
      meta: self.meta.clone(),
      chain_id: ctx.chain_id.clone(),
      data,
      next_target_id: ctx.next_target_id.clone(),
      next_node_resolver: ctx.next_node_resolver.clone(),
      previous_target_id: ctx.previous_target_id.clone(),
    };

    callback.digest(payload).await
  }
}

impl std::fmt::Debug for Processor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Processor")
      .field("target_id", &self.target_id)
      .field("meta", &self.meta)
      .field("callback", &self.callback.is_some())
      .finish()
  }
}
