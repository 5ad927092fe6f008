//! Catena Pipeline
//!
//! Processors wrap single outbound service calls; pipelines run an ordered
//! list of processors over a data value. The actual service invocation is
//! delegated to a [`ProcessCallback`] injected by the embedder, so the crate
//! itself never performs I/O.

mod callback;
mod error;
mod pipeline;
mod processor;

pub use callback::{CallbackPayload, EchoCallback, PreProcessCallback, ProcessCallback};
pub use error::PipelineError;
pub use pipeline::Pipeline;
pub use processor::{Processor, ProcessorContext};
