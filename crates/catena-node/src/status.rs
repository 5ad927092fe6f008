//! Node status manager: control-signal queue and suspension state.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;
use tracing::warn;

use catena_chain::{ChainSignal, NodeStatus, ResumePayload};

use crate::error::NodeError;

/// Execution state stashed when a `NODE_SUSPEND` fires between batches.
#[derive(Debug, Clone)]
pub struct SuspendedState {
  /// Cursor of the batch that would have run next.
  pub next_batch_index: usize,
  /// Pipeline indices of the batch that completed last.
  pub batch: Vec<usize>,
  /// The data value the node was digesting.
  pub data: Value,
}

/// A consumed `NODE_RESUME`: the input for the node's next execution.
#[derive(Debug, Clone)]
pub struct ResumedExecution {
  pub data: Value,
  pub params: Option<Value>,
}

#[derive(Debug, Default)]
struct StatusInner {
  queue: VecDeque<ChainSignal>,
  resume_payload: Option<ResumePayload>,
  status: NodeStatus,
  suspended: Option<SuspendedState>,
  resumed: Option<ResumedExecution>,
}

/// Owns a node's FIFO queue of control signals and its state machine.
///
/// Enqueueing is allowed at any time from any task; draining happens only
/// at the node's inter-batch checkpoints (and at the start of a resumed
/// execution), which is what makes suspension points well defined.
#[derive(Debug, Default)]
pub struct NodeStatusManager {
  inner: Mutex<StatusInner>,
}

impl NodeStatusManager {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append control signals; a `NODE_RESUME` may carry a payload that
  /// replaces the suspended data as the node's new input.
  pub fn enqueue_signals(&self, signals: Vec<ChainSignal>, resume_payload: Option<ResumePayload>) {
    let mut inner = self.inner.lock().expect("status lock poisoned");
    if resume_payload.is_some() {
      inner.resume_payload = resume_payload;
    }
    inner.queue.extend(signals);
  }

  /// Drain the queue, apply each signal, and return the effective list.
  ///
  /// `NODE_SUSPEND` marks the node suspended (the executor stashes its
  /// cursor right after). `NODE_RESUME` consumes the suspended state and
  /// the pending resume payload; a resume without a suspension is a
  /// state violation and degrades to a warning no-op. Everything else
  /// passes through for the executor to apply to the status setter.
  pub fn process(&self) -> Vec<ChainSignal> {
    let mut inner = self.inner.lock().expect("status lock poisoned");
    let mut effective = Vec::new();

    while let Some(signal) = inner.queue.pop_front() {
      match signal {
        ChainSignal::NodeSuspend => {
          inner.status = NodeStatus::Suspended;
          effective.push(signal);
        }
        ChainSignal::NodeResume => match inner.suspended.take() {
          Some(state) => {
            let payload = inner.resume_payload.take().unwrap_or_default();
            inner.resumed = Some(ResumedExecution {
              data: payload.data.unwrap_or(state.data),
              params: payload.params,
            });
            inner.status = NodeStatus::InProgress;
            effective.push(signal);
          }
          None => {
            let violation = NodeError::StateViolation {
              message: "resume without a suspended state".to_string(),
            };
            warn!(error = %violation, "ignoring resume signal");
          }
        },
        other => effective.push(other),
      }
    }

    effective
  }

  pub fn status(&self) -> NodeStatus {
    self.inner.lock().expect("status lock poisoned").status
  }

  pub fn set_status(&self, status: NodeStatus) {
    self.inner.lock().expect("status lock poisoned").status = status;
  }

  /// Stash the execution cursor after a suspend signal took effect.
  pub fn stash(&self, state: SuspendedState) {
    self.inner.lock().expect("status lock poisoned").suspended = Some(state);
  }

  pub fn suspended_state(&self) -> Option<SuspendedState> {
    self
      .inner
      .lock()
      .expect("status lock poisoned")
      .suspended
      .clone()
  }

  /// Take the input produced by a consumed `NODE_RESUME`, if any.
  pub fn take_resumed(&self) -> Option<ResumedExecution> {
    self.inner.lock().expect("status lock poisoned").resumed.take()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn drains_in_fifo_order() {
    let manager = NodeStatusManager::new();
    manager.enqueue_signals(
      vec![ChainSignal::NodeInProgress, ChainSignal::NodeCompleted],
      None,
    );
    assert_eq!(
      manager.process(),
      vec![ChainSignal::NodeInProgress, ChainSignal::NodeCompleted]
    );
    assert!(manager.process().is_empty());
  }

  #[test]
  fn suspend_marks_node_suspended() {
    let manager = NodeStatusManager::new();
    manager.enqueue_signals(vec![ChainSignal::NodeSuspend], None);
    let effective = manager.process();
    assert_eq!(effective, vec![ChainSignal::NodeSuspend]);
    assert_eq!(manager.status(), NodeStatus::Suspended);
  }

  #[test]
  fn resume_consumes_stash_and_payload() {
    let manager = NodeStatusManager::new();
    manager.enqueue_signals(vec![ChainSignal::NodeSuspend], None);
    manager.process();
    manager.stash(SuspendedState {
      next_batch_index: 1,
      batch: vec![0, 1, 2],
      data: json!({"k": 1}),
    });

    manager.enqueue_signals(
      vec![ChainSignal::NodeResume],
      Some(ResumePayload {
        data: Some(json!({"z": 9})),
        params: None,
      }),
    );
    manager.process();

    let resumed = manager.take_resumed().expect("resumed execution");
    assert_eq!(resumed.data, json!({"z": 9}));
    assert!(manager.suspended_state().is_none());
    assert_eq!(manager.status(), NodeStatus::InProgress);
  }

  #[test]
  fn resume_without_payload_restores_stashed_data() {
    let manager = NodeStatusManager::new();
    manager.enqueue_signals(vec![ChainSignal::NodeSuspend], None);
    manager.process();
    manager.stash(SuspendedState {
      next_batch_index: 2,
      batch: vec![3, 4, 5],
      data: json!({"stashed": true}),
    });

    manager.enqueue_signals(vec![ChainSignal::NodeResume], None);
    manager.process();

    let resumed = manager.take_resumed().expect("resumed execution");
    assert_eq!(resumed.data, json!({"stashed": true}));
  }

  #[test]
  fn resume_without_suspension_is_a_no_op() {
    let manager = NodeStatusManager::new();
    manager.enqueue_signals(vec![ChainSignal::NodeResume], None);
    assert!(manager.process().is_empty());
    assert!(manager.take_resumed().is_none());
    assert_eq!(manager.status(), NodeStatus::Pending);
  }
}
