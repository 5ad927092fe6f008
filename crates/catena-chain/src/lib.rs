//! Catena Chain
//!
//! This crate provides the data model for the catena orchestrator: chain and
//! node configurations, the signal vocabulary shared between supervisors, and
//! the broadcast contracts the core uses to talk to remote hosts.
//!
//! Nothing in here performs I/O. The broadcast traits are implemented over
//! HTTP by `catena-remote`; tests and embedders are free to supply their own
//! in-process implementations.

mod broadcast;
mod config;
mod data;
mod error;
mod signal;

pub use broadcast::{
  BroadcastPre, BroadcastSetup, NodeStatusBroadcast, NoopBroadcast, RemoteService, ReportMessage,
  ReportingSink, RemoteRunPayload, SetupPayload, StatusBroadcastPayload, StatusTarget,
};
pub use config::{
  validate_chain_config, ChainConfig, ChainType, ChildMode, Location, NodeConfig, PipelineMeta,
  ServiceConfig,
};
pub use data::merge_pre_data;
pub use error::{BroadcastError, ConfigError};
pub use signal::{ChainSignal, NodeStatus, ResumePayload};
