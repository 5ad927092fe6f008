//! Per-node reporting agent and the local report bus.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::warn;

use catena_chain::{ChainSignal, ReportMessage, ReportingSink};

/// In-process handler for local-signal reports.
pub trait LocalReportSink: Send + Sync {
  fn notify(&self, message: ReportMessage);
}

/// Discards local reports. Useful for tests that only care about outputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReportSink;

impl LocalReportSink for NoopReportSink {
  fn notify(&self, _message: ReportMessage) {}
}

/// Forwards local reports into an unbounded channel.
///
/// Reports are low-volume (a handful per node lifetime), so the unbounded
/// buffer cannot grow meaningfully.
#[derive(Debug, Clone)]
pub struct ChannelReportSink {
  sender: mpsc::UnboundedSender<ReportMessage>,
}

impl ChannelReportSink {
  pub fn new(sender: mpsc::UnboundedSender<ReportMessage>) -> Self {
    Self { sender }
  }
}

impl LocalReportSink for ChannelReportSink {
  fn notify(&self, message: ReportMessage) {
    // The receiver may have been dropped; reports are best-effort.
    let _ = self.sender.send(message);
  }
}

/// Emits `{chainId, nodeId, index, count, status}` messages for one node.
///
/// Local signals go to the in-process sink; global signals go to the
/// chain's monitoring host through the reporting sink. When the monitoring
/// host is this process (`None` or the literal `"local"`), global signals
/// loop back onto the local sink so the fan-in still observes them.
#[derive(Clone)]
pub struct ReportingAgent {
  chain_id: String,
  node_id: String,
  index: usize,
  count: usize,
  monitoring_host: Option<String>,
  local: Arc<dyn LocalReportSink>,
  global: Arc<dyn ReportingSink>,
}

impl ReportingAgent {
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    chain_id: String,
    node_id: String,
    index: usize,
    count: usize,
    monitoring_host: Option<String>,
    local: Arc<dyn LocalReportSink>,
    global: Arc<dyn ReportingSink>,
  ) -> Self {
    Self {
      chain_id,
      node_id,
      index,
      count,
      monitoring_host,
      local,
      global,
    }
  }

  fn message(
    &self,
    status: ChainSignal,
    signal: Option<ChainSignal>,
    payload: Option<Value>,
  ) -> ReportMessage {
    ReportMessage {
      chain_id: self.chain_id.clone(),
      node_id: self.node_id.clone(),
      index: self.index,
      count: self.count,
      status,
      signal,
      payload,
    }
  }

  fn remote_host(&self) -> Option<&str> {
    match self.monitoring_host.as_deref() {
      Some("local") | None => None,
      Some(host) => Some(host),
    }
  }

  /// Emit a status transition on the local bus, and on the global bus when
  /// the chain is monitored remotely.
  pub async fn emit_status(&self, status: ChainSignal) {
    self.emit_status_with(status, None).await;
  }

  /// Like [`emit_status`](Self::emit_status), with an attached payload
  /// (e.g. the captured cause of a failure).
  pub async fn emit_status_with(&self, status: ChainSignal, payload: Option<Value>) {
    self.local.notify(self.message(status, None, payload.clone()));
    if let Some(host) = self.remote_host() {
      if let Err(error) = self
        .global
        .report(host, self.message(status, None, payload))
        .await
      {
        warn!(
          chain_id = %self.chain_id,
          node_id = %self.node_id,
          error = %error,
          "global status report failed"
        );
      }
    }
  }

  /// Emit a global signal toward the chain's monitoring host. Falls back
  /// to the local bus when this process is the monitor.
  pub async fn emit_global(&self, signal: ChainSignal, payload: Option<Value>) {
    let message = self.message(signal, Some(signal), payload);
    match self.remote_host() {
      Some(host) => {
        if let Err(error) = self.global.report(host, message).await {
          warn!(
            chain_id = %self.chain_id,
            node_id = %self.node_id,
            error = %error,
            "global signal report failed"
          );
        }
      }
      None => self.local.notify(message),
    }
  }
}

impl std::fmt::Debug for ReportingAgent {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ReportingAgent")
      .field("chain_id", &self.chain_id)
      .field("node_id", &self.node_id)
      .field("index", &self.index)
      .field("count", &self.count)
      .field("monitoring_host", &self.monitoring_host)
      .finish()
  }
}
