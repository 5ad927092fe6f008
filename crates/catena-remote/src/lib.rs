//! Catena Remote
//!
//! Reference implementations of the broadcast contracts over HTTP POST on
//! the connector's conventional paths. The core never assumes HTTP; these
//! shims are what a default deployment wires into its supervisor.

mod http;
mod resolver;

pub use http::{paths, HttpBroadcaster, HttpReportingSink};
pub use resolver::resolve_host;
