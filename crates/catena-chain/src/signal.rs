//! Signal vocabulary shared between supervisors, nodes and monitoring.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The flat signal vocabulary of the chain protocol.
///
/// Covers both the request signals a supervisor dispatches on and the
/// statuses nodes report back on the monitoring buses. Wire form is the
/// literal protocol name (`NODE_SETUP`, `CHAIN_DEPLOYED`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainSignal {
  // Request signals.
  NodeSetup,
  NodeCreate,
  NodeDelete,
  NodeRun,
  NodeSendData,
  NodePre,
  NodeSuspend,
  NodeResume,
  ChainPrepare,
  ChainStart,
  ChainStartPendingOccurrence,
  ChainDeploy,

  // Reported statuses.
  NodePending,
  NodeInProgress,
  NodeCompleted,
  NodeSuspended,
  NodeFailed,
  NodeDeleted,
  NodeSetupCompleted,
  NodeEndOfPipeline,
  NodePendingDeletion,
  ChainDeployed,
  ChildChainStarted,
  ChildChainCompleted,
  ChainNotified,
}

impl ChainSignal {
  /// The node status a pass-through signal maps to, if any.
  ///
  /// Control signals drained from a node's queue that are not suspend/resume
  /// are applied to the node's status setter through this mapping.
  pub fn as_status(self) -> Option<NodeStatus> {
    match self {
      ChainSignal::NodePending => Some(NodeStatus::Pending),
      ChainSignal::NodeInProgress => Some(NodeStatus::InProgress),
      ChainSignal::NodeCompleted => Some(NodeStatus::Completed),
      ChainSignal::NodeSuspended => Some(NodeStatus::Suspended),
      ChainSignal::NodeFailed => Some(NodeStatus::Failed),
      ChainSignal::NodeDeleted => Some(NodeStatus::Deleted),
      _ => None,
    }
  }
}

/// Internal state of a node's execution state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
  #[default]
  Pending,
  InProgress,
  Suspended,
  Completed,
  Failed,
  Deleted,
}

impl NodeStatus {
  pub fn as_signal(self) -> ChainSignal {
    match self {
      NodeStatus::Pending => ChainSignal::NodePending,
      NodeStatus::InProgress => ChainSignal::NodeInProgress,
      NodeStatus::Suspended => ChainSignal::NodeSuspended,
      NodeStatus::Completed => ChainSignal::NodeCompleted,
      NodeStatus::Failed => ChainSignal::NodeFailed,
      NodeStatus::Deleted => ChainSignal::NodeDeleted,
    }
  }

  /// Terminal states accept no further transitions except deletion.
  pub fn is_terminal(self) -> bool {
    matches!(
      self,
      NodeStatus::Completed | NodeStatus::Failed | NodeStatus::Deleted
    )
  }
}

/// Payload attached to a `NODE_RESUME` signal.
///
/// `data` replaces the stashed suspended data as the node's new input;
/// `params` is carried through to the restored output entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumePayload {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub params: Option<Value>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn signals_serialize_to_protocol_literals() {
    let encoded = serde_json::to_string(&ChainSignal::ChainStartPendingOccurrence).unwrap();
    assert_eq!(encoded, "\"CHAIN_START_PENDING_OCCURRENCE\"");
    let decoded: ChainSignal = serde_json::from_str("\"NODE_SETUP_COMPLETED\"").unwrap();
    assert_eq!(decoded, ChainSignal::NodeSetupCompleted);
  }

  #[test]
  fn status_round_trips_through_signal() {
    assert_eq!(
      ChainSignal::NodeCompleted.as_status(),
      Some(NodeStatus::Completed)
    );
    assert_eq!(
      NodeStatus::Suspended.as_signal(),
      ChainSignal::NodeSuspended
    );
    assert_eq!(ChainSignal::ChainDeploy.as_status(), None);
  }
}
