//! An ordered sequence of processors over one data value.

use std::sync::Arc;

use serde_json::Value;

use catena_chain::ServiceConfig;

use crate::callback::ProcessCallback;
use crate::error::PipelineError;
use crate::processor::{Processor, ProcessorContext};

/// An ordered list of processors; the output of step *i* is the input of
/// step *i+1*. Processors share no state beyond the data passed between
/// them.
#[derive(Debug, Clone)]
pub struct Pipeline {
  processors: Vec<Processor>,
}

impl Pipeline {
  pub fn new(services: &[ServiceConfig], callback: Option<Arc<dyn ProcessCallback>>) -> Self {
    let processors = services
      .iter()
      .map(|service| Processor::new(service, callback.clone()))
      .collect();
    Self { processors }
  }

  pub fn len(&self) -> usize {
    self.processors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.processors.is_empty()
  }

  /// Fold the data through every processor left-to-right. The first
  /// processor failure aborts the pipeline and propagates.
  pub async fn run(&self, ctx: &ProcessorContext, mut data: Value) -> Result<Value, PipelineError> {
    for processor in &self.processors {
      data = processor.digest(ctx, data).await?;
    }
    Ok(data)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use serde_json::json;

  use crate::callback::CallbackPayload;

  /// Appends its target id to a list under `"seen"`, so tests can assert
  /// processor ordering.
  struct TraceCallback;

  #[async_trait]
  impl ProcessCallback for TraceCallback {
    async fn digest(&self, payload: CallbackPayload) -> Result<Value, PipelineError> {
      let mut data = payload.data;
      data["seen"]
        .as_array_mut()
        .expect("seen list")
        .push(json!(payload.target_id));
      Ok(data)
    }
  }

  struct FailingCallback;

  #[async_trait]
  impl ProcessCallback for FailingCallback {
    async fn digest(&self, payload: CallbackPayload) -> Result<Value, PipelineError> {
      Err(PipelineError::callback(payload.target_id, "boom"))
    }
  }

  fn services(ids: &[&str]) -> Vec<ServiceConfig> {
    ids.iter().map(|id| ServiceConfig::new(*id)).collect()
  }

  #[tokio::test]
  async fn runs_processors_left_to_right() {
    let pipeline = Pipeline::new(&services(&["a", "b", "c"]), Some(Arc::new(TraceCallback)));
    let result = pipeline
      .run(&ProcessorContext::default(), json!({"seen": []}))
      .await
      .unwrap();
    assert_eq!(result["seen"], json!(["a", "b", "c"]));
  }

  #[tokio::test]
  async fn first_failure_aborts_and_propagates() {
    let pipeline = Pipeline::new(&services(&["only"]), Some(Arc::new(FailingCallback)));
    let err = pipeline
      .run(&ProcessorContext::default(), json!({}))
      .await
      .unwrap_err();
    assert!(matches!(
      err,
      PipelineError::Callback { ref target_id, .. } if target_id == "only"
    ));
  }

  #[tokio::test]
  async fn missing_callback_yields_empty_value() {
    let pipeline = Pipeline::new(&services(&["svc"]), None);
    let result = pipeline
      .run(&ProcessorContext::default(), json!({"k": 1}))
      .await
      .unwrap();
    assert_eq!(result, Value::Null);
  }
}
