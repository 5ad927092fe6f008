//! Pipeline error types.

/// Errors raised while digesting data through a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
  /// The process callback (the external service call) failed.
  #[error("processor '{target_id}' failed: {message}")]
  Callback { target_id: String, message: String },
}

impl PipelineError {
  pub fn callback(target_id: impl Into<String>, message: impl Into<String>) -> Self {
    PipelineError::Callback {
      target_id: target_id.into(),
      message: message.into(),
    }
  }
}
