//! Per-chain monitoring fan-in.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use catena_chain::{ChainSignal, ReportMessage};
use catena_node::LocalReportSink;

/// Latest known progress of one node within a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeProgress {
  pub index: usize,
  pub count: usize,
  pub last_status: ChainSignal,
}

#[derive(Debug, Default)]
struct MonitoringInner {
  /// chainId → nodeId → latest progress entry.
  workflows: HashMap<String, HashMap<String, NodeProgress>>,
  /// chainId → remote monitoring host.
  remote_hosts: HashMap<String, String>,
  /// Every message observed, in arrival order.
  history: Vec<ReportMessage>,
}

/// Tracks progress across all nodes of the chains this process monitors.
///
/// One instance per supervisor; it is wired into every node as the
/// local-signal sink, and the connector feeds inbound remote reports into
/// it through [`MonitoringAgent::receive`].
#[derive(Debug, Default)]
pub struct MonitoringAgent {
  inner: Mutex<MonitoringInner>,
}

impl MonitoringAgent {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record an inbound report (local or forwarded from a remote node).
  pub fn receive(&self, message: ReportMessage) {
    debug!(
      chain_id = %message.chain_id,
      node_id = %message.node_id,
      status = ?message.status,
      "report received"
    );
    let mut inner = self.inner.lock().expect("monitoring lock poisoned");
    inner
      .workflows
      .entry(message.chain_id.clone())
      .or_default()
      .insert(
        message.node_id.clone(),
        NodeProgress {
          index: message.index,
          count: message.count,
          last_status: message.status,
        },
      );
    inner.history.push(message);
  }

  /// Remember where a chain's global signals should be forwarded.
  pub fn set_remote_monitoring_host(&self, chain_id: &str, host: &str) {
    self
      .inner
      .lock()
      .expect("monitoring lock poisoned")
      .remote_hosts
      .insert(chain_id.to_string(), host.to_string());
  }

  pub fn remote_monitoring_host(&self, chain_id: &str) -> Option<String> {
    self
      .inner
      .lock()
      .expect("monitoring lock poisoned")
      .remote_hosts
      .get(chain_id)
      .cloned()
  }

  /// Latest status per node of a chain.
  pub fn workflow_summary(&self, chain_id: &str) -> HashMap<String, NodeProgress> {
    self
      .inner
      .lock()
      .expect("monitoring lock poisoned")
      .workflows
      .get(chain_id)
      .cloned()
      .unwrap_or_default()
  }

  /// All messages observed so far, in arrival order.
  pub fn history(&self) -> Vec<ReportMessage> {
    self
      .inner
      .lock()
      .expect("monitoring lock poisoned")
      .history
      .clone()
  }
}

impl LocalReportSink for MonitoringAgent {
  fn notify(&self, message: ReportMessage) {
    self.receive(message);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn message(chain: &str, node: &str, index: usize, status: ChainSignal) -> ReportMessage {
    ReportMessage {
      chain_id: chain.to_string(),
      node_id: node.to_string(),
      index,
      count: 2,
      status,
      signal: None,
      payload: None,
    }
  }

  #[test]
  fn keeps_the_latest_status_per_node() {
    let agent = MonitoringAgent::new();
    agent.receive(message("c1", "n1", 0, ChainSignal::NodeInProgress));
    agent.receive(message("c1", "n1", 0, ChainSignal::NodeCompleted));
    agent.receive(message("c1", "n2", 1, ChainSignal::NodeInProgress));

    let summary = agent.workflow_summary("c1");
    assert_eq!(summary["n1"].last_status, ChainSignal::NodeCompleted);
    assert_eq!(summary["n2"].last_status, ChainSignal::NodeInProgress);
    assert_eq!(agent.history().len(), 3);
  }

  #[test]
  fn remote_hosts_are_tracked_per_chain() {
    let agent = MonitoringAgent::new();
    agent.set_remote_monitoring_host("c1", "http://monitor:8900");
    assert_eq!(
      agent.remote_monitoring_host("c1").as_deref(),
      Some("http://monitor:8900")
    );
    assert!(agent.remote_monitoring_host("c2").is_none());
  }
}
