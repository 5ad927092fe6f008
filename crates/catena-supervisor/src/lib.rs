//! Catena Supervisor
//!
//! The supervisor is the per-host orchestrator: it owns the local node
//! registry and the chain relations, dispatches the protocol's request
//! signals, distributes chain configs across hosts, and hosts the
//! monitoring fan-in for the chains it deployed.
//!
//! There is no implicit global instance; embedders construct one with
//! [`NodeSupervisor::new`] and hold on to the returned handle.

mod error;
mod monitoring;
mod request;
mod supervisor;

pub use error::SupervisorError;
pub use monitoring::{MonitoringAgent, NodeProgress};
pub use request::{SupervisorRequest, SupervisorResponse};
pub use supervisor::{ChainRelation, NodeSupervisor, SupervisorCallbacks};
