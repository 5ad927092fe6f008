//! Catena Node
//!
//! A node runs one stage of a chain: it digests data through its pipelines
//! in batches of three, observes control signals at batch boundaries, and
//! hands the result off to the next hop. The node reaches back into its
//! hosting supervisor only through the [`ChainHost`] trait, so the engine
//! stays independent of the registry that owns it.

mod error;
mod host;
mod node;
mod reporting;
mod status;

pub use error::NodeError;
pub use host::ChainHost;
pub use node::{Node, NodeCallbacks, NodeOutput, NodeRouting, NextNodeInfo, BATCH_SIZE};
pub use reporting::{ChannelReportSink, LocalReportSink, NoopReportSink, ReportingAgent};
pub use status::{NodeStatusManager, ResumedExecution, SuspendedState};
