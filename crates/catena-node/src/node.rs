//! Node: one runtime stage of a chain.
//!
//! Every call to [`Node::execute`] chains onto the node's serial execution
//! queue (an async mutex), so a node is only ever digesting one data value
//! at a time. Within one execution, pipelines run concurrently in batches
//! of [`BATCH_SIZE`]; control signals are observed only between batches.

use std::sync::{Arc, Mutex as StdMutex, Weak};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use catena_chain::{
  merge_pre_data, BroadcastPre, ChainSignal, ChainType, NodeConfig, NodeStatus, PipelineMeta,
  RemoteRunPayload, RemoteService, ReportingSink, ServiceConfig,
};
use catena_pipeline::{Pipeline, ProcessCallback, ProcessorContext};

use crate::error::NodeError;
use crate::host::ChainHost;
use crate::reporting::{LocalReportSink, ReportingAgent};
use crate::status::{NodeStatusManager, SuspendedState};

/// Pipelines scheduled concurrently per batch.
pub const BATCH_SIZE: usize = 3;

/// Where a node hands its output off to.
#[derive(Debug, Clone)]
pub enum NextNodeInfo {
  /// The next stage lives on this supervisor.
  Local { node_id: String },
  /// The next stage lives on a peer supervisor.
  Remote {
    target_id: String,
    meta: Option<PipelineMeta>,
  },
}

/// One pipeline result collected during execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeOutput {
  pub data: Value,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub previous_node_params: Option<Value>,
}

/// Callback bundle a node uses to reach the outside world.
#[derive(Clone)]
pub struct NodeCallbacks {
  pub process: Option<Arc<dyn ProcessCallback>>,
  pub broadcast_pre: Arc<dyn BroadcastPre>,
  pub remote_service: Arc<dyn RemoteService>,
  pub reporting: Arc<dyn ReportingSink>,
  pub local_report: Arc<dyn LocalReportSink>,
}

/// Identity used to resolve a node by `(targetId, chainId)`.
#[derive(Debug, Clone)]
pub struct NodeRouting {
  pub chain_id: String,
  pub target_ids: Vec<String>,
  pub chain_type: ChainType,
}

#[derive(Default)]
struct NodeState {
  config: Option<NodeConfig>,
  pipelines: Vec<Pipeline>,
  output: Vec<NodeOutput>,
  progress: f64,
  next: Option<NextNodeInfo>,
}

/// A runtime instance executing one stage of a chain on one host.
pub struct Node {
  id: String,
  host: Weak<dyn ChainHost>,
  callbacks: NodeCallbacks,
  cancel: CancellationToken,
  status: NodeStatusManager,
  reporting: StdMutex<Option<ReportingAgent>>,
  routing: StdMutex<Option<NodeRouting>>,
  state: Mutex<NodeState>,
}

impl Node {
  pub fn new(
    host: Weak<dyn ChainHost>,
    callbacks: NodeCallbacks,
    cancel: CancellationToken,
  ) -> Arc<Self> {
    Arc::new(Self {
      id: Uuid::new_v4().to_string(),
      host,
      callbacks,
      cancel,
      status: NodeStatusManager::new(),
      reporting: StdMutex::new(None),
      routing: StdMutex::new(None),
      state: Mutex::new(NodeState::default()),
    })
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn status(&self) -> NodeStatus {
    self.status.status()
  }

  pub fn status_manager(&self) -> &NodeStatusManager {
    &self.status
  }

  pub fn routing(&self) -> Option<NodeRouting> {
    self.routing.lock().expect("routing lock poisoned").clone()
  }

  pub fn reporting(&self) -> Option<ReportingAgent> {
    self.reporting.lock().expect("reporting lock poisoned").clone()
  }

  /// Store the node's configuration and perform deferred setup: routing
  /// identity, the pipeline over the configured services, the reporting
  /// agent (when `index`/`count` are known), and any pre-enqueued signals.
  pub async fn set_config(&self, config: NodeConfig) {
    let mut state = self.state.lock().await;

    *self.routing.lock().expect("routing lock poisoned") = Some(NodeRouting {
      chain_id: config.chain_id.clone(),
      target_ids: config.services.iter().map(|s| s.target_id.clone()).collect(),
      chain_type: config.chain_type,
    });

    state
      .pipelines
      .push(Pipeline::new(&config.services, self.callbacks.process.clone()));

    if let (Some(index), Some(count)) = (config.index, config.count) {
      let agent = ReportingAgent::new(
        config.chain_id.clone(),
        self.id.clone(),
        index,
        count,
        config.monitoring_host.clone(),
        self.callbacks.local_report.clone(),
        self.callbacks.reporting.clone(),
      );
      agent.emit_status(ChainSignal::NodeSetupCompleted).await;
      *self.reporting.lock().expect("reporting lock poisoned") = Some(agent);
    }

    if !config.signal_queue.is_empty() {
      self
        .status
        .enqueue_signals(config.signal_queue.clone(), None);
    }

    state.config = Some(config);
  }

  pub async fn set_next(&self, next: Option<NextNodeInfo>) {
    self.state.lock().await.next = next;
  }

  /// Append another pipeline over the given services.
  pub async fn add_pipeline(&self, services: &[ServiceConfig]) {
    self
      .state
      .lock()
      .await
      .pipelines
      .push(Pipeline::new(services, self.callbacks.process.clone()));
  }

  pub async fn output(&self) -> Vec<NodeOutput> {
    self.state.lock().await.output.clone()
  }

  pub async fn progress(&self) -> f64 {
    self.state.lock().await.progress
  }

  /// Digest a data value through the node.
  ///
  /// Chains onto the node's serial execution queue. A resumed execution
  /// (after `NODE_RESUME` consumed a suspension) skips the generator
  /// entirely: the restored output replaces the normal advance and the
  /// node completes immediately.
  #[instrument(name = "node_execute", skip(self, input), fields(node_id = %self.id))]
  pub async fn execute(&self, input: Option<Value>) -> Result<(), NodeError> {
    let mut state = self.state.lock().await;
    let config = state.config.clone().ok_or(NodeError::NotConfigured)?;

    if self.status.status() == NodeStatus::Suspended {
      let effective = self.status.process();
      self.apply_signals(&effective);
    }
    if let Some(resumed) = self.status.take_resumed() {
      info!(node_id = %self.id, "resuming suspended execution");
      state.output = vec![NodeOutput {
        data: resumed.data,
        previous_node_params: resumed.params,
      }];
      state.progress = 1.0;
      return self.complete(&mut state, &config).await;
    }

    let mut data = input.unwrap_or(Value::Null);

    // Pre-stage: only the first non-empty sub-chain is dispatched.
    if let Some(pre) = config.pre.iter().find(|inner| !inner.is_empty()) {
      match self
        .callbacks
        .broadcast_pre
        .broadcast_pre(pre, data.clone())
        .await
      {
        Ok(Some(pre_data)) => data = merge_pre_data(data, pre_data),
        Ok(None) => {}
        Err(error) => {
          warn!(node_id = %self.id, error = %error, "pre-stage broadcast failed");
        }
      }
    }

    // Child chains deploy before the node's own digestion starts; a serial
    // child failure aborts this execution, a parallel one never does.
    if let Some(child_config) = config.chain_config.clone() {
      if let Err(error) = self.run_child_chain(child_config, data.clone(), &config).await {
        self.fail(&error).await;
        return Err(error);
      }
    }

    self.transition(NodeStatus::InProgress).await;

    let total = state.pipelines.len();
    let mut next_batch = 0usize;
    while next_batch * BATCH_SIZE < total {
      if self.cancel.is_cancelled() {
        return Err(NodeError::Cancelled);
      }

      let start = next_batch * BATCH_SIZE;
      let end = (start + BATCH_SIZE).min(total);
      let ctx = self.processor_context(&config);

      let batch_results = {
        let batch = state.pipelines[start..end]
          .iter()
          .map(|pipeline| pipeline.run(&ctx, data.clone()));
        join_all(batch).await
      };

      for result in batch_results {
        match result {
          Ok(value) => {
            state.output.push(NodeOutput {
              data: value,
              previous_node_params: None,
            });
            state.progress += 1.0 / total as f64;
          }
          Err(error) => {
            let error = NodeError::from(error);
            self.fail(&error).await;
            return Err(error);
          }
        }
      }
      next_batch += 1;

      // Inter-batch checkpoint: the only place control signals take effect.
      let effective = self.status.process();
      self.apply_signals(&effective);
      if effective.contains(&ChainSignal::NodeSuspend) {
        self.status.stash(SuspendedState {
          next_batch_index: next_batch,
          batch: (start..end).collect(),
          data: data.clone(),
        });
        self.emit(ChainSignal::NodeSuspended, None).await;
        info!(node_id = %self.id, batch = next_batch - 1, "execution suspended");
        return Ok(());
      }
    }

    state.progress = 1.0;
    self.complete(&mut state, &config).await
  }

  /// Pass-through signals drained from the queue are applied to the status
  /// setter; suspend/resume were already handled by the manager itself.
  fn apply_signals(&self, signals: &[ChainSignal]) {
    for signal in signals {
      if matches!(signal, ChainSignal::NodeSuspend | ChainSignal::NodeResume) {
        continue;
      }
      if let Some(status) = signal.as_status() {
        self.status.set_status(status);
      }
    }
  }

  async fn complete(&self, state: &mut NodeState, config: &NodeConfig) -> Result<(), NodeError> {
    self.transition(NodeStatus::Completed).await;

    // The first pipeline's result is the canonical forward value; the rest
    // of the output stays observable on the node.
    let forward = state
      .output
      .first()
      .map(|output| output.data.clone())
      .unwrap_or(Value::Null);

    self.move_to_next_node(state, config, forward).await;
    self.apply_deletion_policy(config).await;
    Ok(())
  }

  async fn move_to_next_node(&self, state: &NodeState, config: &NodeConfig, data: Value) {
    match &state.next {
      Some(NextNodeInfo::Local { node_id }) => match self.host.upgrade() {
        Some(host) => {
          if let Err(error) = host.run_node(node_id, Some(data)).await {
            warn!(node_id = %self.id, next = %node_id, error = %error, "local hand-off failed");
          }
        }
        None => warn!(node_id = %self.id, "chain host gone, dropping hand-off"),
      },
      Some(NextNodeInfo::Remote { target_id, meta }) => {
        let payload = RemoteRunPayload {
          chain_id: config.chain_id.clone(),
          target_id: target_id.clone(),
          meta: meta.clone(),
          data,
          next_target_id: config.next_target_id.clone(),
          next_node_resolver: config.next_node_resolver.clone(),
          next_meta: config.next_meta.clone(),
          previous_target_id: config.services.last().map(|s| s.target_id.clone()),
        };
        if let Err(error) = self.callbacks.remote_service.call_remote_service(payload).await {
          warn!(node_id = %self.id, target_id = %target_id, error = %error, "remote hand-off failed");
        }
      }
      None => {
        if let Some(agent) = self.reporting() {
          agent.emit_global(ChainSignal::NodeEndOfPipeline, None).await;
        }
      }
    }
  }

  async fn run_child_chain(
    &self,
    child_config: Vec<NodeConfig>,
    data: Value,
    config: &NodeConfig,
  ) -> Result<(), NodeError> {
    let host = self.host.upgrade().ok_or(NodeError::HostGone)?;
    let child_chain_id = host
      .deploy_chain(child_config, data, Some(config.chain_id.clone()))
      .await?;
    info!(node_id = %self.id, child_chain_id = %child_chain_id, "child chain deployed");
    host.start_pending_chain(&child_chain_id).await
  }

  async fn apply_deletion_policy(&self, config: &NodeConfig) {
    if config.chain_type.contains(ChainType::PERSISTENT) {
      return;
    }
    if config.chain_type.contains(ChainType::AUTO_DELETE) {
      match self.host.upgrade() {
        Some(host) => {
          if let Err(error) = host.delete_node(&self.id).await {
            warn!(node_id = %self.id, error = %error, "auto-delete failed");
          }
        }
        None => warn!(node_id = %self.id, "chain host gone, skipping auto-delete"),
      }
    } else if let Some(agent) = self.reporting() {
      agent
        .emit_global(ChainSignal::NodePendingDeletion, None)
        .await;
    }
  }

  fn processor_context(&self, config: &NodeConfig) -> ProcessorContext {
    ProcessorContext {
      chain_id: config.chain_id.clone(),
      next_target_id: config.next_target_id.clone(),
      next_node_resolver: config.next_node_resolver.clone(),
      previous_target_id: None,
    }
  }

  async fn transition(&self, status: NodeStatus) {
    self.status.set_status(status);
    self.emit(status.as_signal(), None).await;
  }

  async fn fail(&self, error: &NodeError) {
    self.status.set_status(NodeStatus::Failed);
    self
      .emit(
        ChainSignal::NodeFailed,
        Some(json!({ "error": error.to_string() })),
      )
      .await;
  }

  async fn emit(&self, signal: ChainSignal, payload: Option<Value>) {
    if let Some(agent) = self.reporting() {
      agent.emit_status_with(signal, payload).await;
    }
  }
}

impl std::fmt::Debug for Node {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Node")
      .field("id", &self.id)
      .field("status", &self.status.status())
      .finish()
  }
}
