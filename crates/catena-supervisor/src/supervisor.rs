//! The per-host orchestrator.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use catena_chain::{
  validate_chain_config, BroadcastPre, BroadcastSetup, ChainConfig, ChainSignal, ChainType,
  ChildMode, ConfigError, Location, NodeConfig, NodeStatus, NodeStatusBroadcast, RemoteService,
  ReportMessage, ReportingSink, ResumePayload, SetupPayload, StatusBroadcastPayload, StatusTarget,
};
use catena_node::{ChainHost, NextNodeInfo, Node, NodeCallbacks, NodeError};
use catena_pipeline::{CallbackPayload, PreProcessCallback, ProcessCallback};

use crate::error::SupervisorError;
use crate::monitoring::MonitoringAgent;
use crate::request::{SupervisorRequest, SupervisorResponse};

/// The callback bundle a supervisor is initialized with.
#[derive(Clone)]
pub struct SupervisorCallbacks {
  pub process: Option<Arc<dyn ProcessCallback>>,
  pub pre_process: Option<Arc<dyn PreProcessCallback>>,
  pub broadcast_setup: Arc<dyn BroadcastSetup>,
  pub broadcast_pre: Arc<dyn BroadcastPre>,
  pub remote_service: Arc<dyn RemoteService>,
  pub node_status: Arc<dyn NodeStatusBroadcast>,
  pub reporting: Arc<dyn ReportingSink>,
}

impl SupervisorCallbacks {
  /// A bundle with no process callbacks and discarding broadcasts, for
  /// tests and purely local setups.
  pub fn noop() -> Self {
    let noop = Arc::new(catena_chain::NoopBroadcast);
    Self {
      process: None,
      pre_process: None,
      broadcast_setup: noop.clone(),
      broadcast_pre: noop.clone(),
      remote_service: noop.clone(),
      node_status: noop.clone(),
      reporting: noop,
    }
  }
}

/// Local view of a deployed chain.
#[derive(Debug, Clone)]
pub struct ChainRelation {
  pub config: ChainConfig,
  pub root_node_id: Option<String>,
  /// Deferred initial data, consumed when a pending chain starts.
  pub data_ref: Option<Value>,
  pub parent_chain_id: Option<String>,
}

#[derive(Default)]
struct SupervisorState {
  nodes: HashMap<String, Arc<Node>>,
  chains: HashMap<String, ChainRelation>,
  child_chains: HashMap<String, Vec<String>>,
}

/// The per-host orchestrator: registry of local nodes and chains, request
/// dispatcher, and chain distributor.
///
/// The supervisor is authoritative: only it mutates the node registry,
/// creates chain ids, or issues `NODE_RUN` into a node's execution queue.
/// All registry mutation happens under one mutex that is never held across
/// an await point.
pub struct NodeSupervisor {
  uid: String,
  callbacks: SupervisorCallbacks,
  monitoring: Arc<MonitoringAgent>,
  state: Mutex<SupervisorState>,
  cancel: CancellationToken,
  self_ref: Weak<NodeSupervisor>,
}

impl NodeSupervisor {
  /// Explicitly initialize a supervisor for this host.
  pub fn new(uid: impl Into<String>, callbacks: SupervisorCallbacks) -> Arc<Self> {
    let uid = uid.into();
    info!(supervisor = %format!("@supervisor:{uid}"), "supervisor initialized");
    Arc::new_cyclic(|self_ref| Self {
      uid,
      callbacks,
      monitoring: Arc::new(MonitoringAgent::new()),
      state: Mutex::new(SupervisorState::default()),
      cancel: CancellationToken::new(),
      self_ref: self_ref.clone(),
    })
  }

  pub fn uid(&self) -> &str {
    &self.uid
  }

  /// The supervisor's rendered identity, `@supervisor:<uid>`.
  pub fn tag(&self) -> String {
    format!("@supervisor:{}", self.uid)
  }

  pub fn monitoring(&self) -> &Arc<MonitoringAgent> {
    &self.monitoring
  }

  pub fn node(&self, node_id: &str) -> Option<Arc<Node>> {
    self.lock_state().nodes.get(node_id).cloned()
  }

  pub fn chain(&self, chain_id: &str) -> Option<ChainRelation> {
    self.lock_state().chains.get(chain_id).cloned()
  }

  /// Child chain ids deployed under the given parent chain.
  pub fn child_chains(&self, parent_chain_id: &str) -> Vec<String> {
    self
      .lock_state()
      .child_chains
      .get(parent_chain_id)
      .cloned()
      .unwrap_or_default()
  }

  /// Cancel every in-flight execution at its next batch boundary.
  pub fn shutdown(&self) {
    self.cancel.cancel();
  }

  /// The single entry point for all protocol requests.
  #[instrument(name = "supervisor_request", skip(self, request), fields(supervisor = %self.tag()))]
  pub async fn handle_request(
    &self,
    request: SupervisorRequest,
  ) -> Result<SupervisorResponse, SupervisorError> {
    match request {
      SupervisorRequest::NodeSetup {
        chain_id,
        remote_configs,
      } => self
        .setup_remote_segment(&chain_id, remote_configs)
        .await
        .map(SupervisorResponse::NodeId),

      SupervisorRequest::NodeCreate { config } => self
        .create_node(config)
        .await
        .map(SupervisorResponse::NodeId),

      SupervisorRequest::NodeDelete { node_id } => {
        self.remove_node(&node_id).await?;
        Ok(SupervisorResponse::Ack)
      }

      SupervisorRequest::NodeRun { node_id, data } => {
        if let Err(err) = self.run_node_by_id(&node_id, Some(data)).await {
          error!(node_id = %node_id, error = %err, "node run failed");
        }
        Ok(SupervisorResponse::Ack)
      }

      SupervisorRequest::NodeSendData {
        chain_id,
        target_id,
        data,
      } => {
        match self.find_node_by_target(&chain_id, &target_id) {
          Some(node) => {
            if let Err(err) = node.execute(Some(data)).await {
              error!(chain_id = %chain_id, target_id = %target_id, error = %err, "node run failed");
            }
          }
          None => {
            let miss = SupervisorError::RoutingMiss {
              chain_id,
              target_id,
            };
            error!(error = %miss, "dropping data");
          }
        }
        Ok(SupervisorResponse::Ack)
      }

      SupervisorRequest::NodePre { config, data } => self
        .run_pre(config, data)
        .await
        .map(SupervisorResponse::Data),

      SupervisorRequest::NodeSuspend {
        chain_id,
        target_id,
        host_uri,
      } => {
        self
          .enqueue_node_status(ChainSignal::NodeSuspend, chain_id, target_id, host_uri, None)
          .await?;
        Ok(SupervisorResponse::Ack)
      }

      SupervisorRequest::NodeResume {
        chain_id,
        target_id,
        host_uri,
        data,
        params,
      } => {
        let payload = ResumePayload { data, params };
        self
          .enqueue_node_status(
            ChainSignal::NodeResume,
            chain_id,
            target_id,
            host_uri,
            Some(payload),
          )
          .await?;
        Ok(SupervisorResponse::Ack)
      }

      SupervisorRequest::ChainPrepare { chain_id } => {
        self.prepare_chain_distribution(&chain_id).await?;
        Ok(SupervisorResponse::Ack)
      }

      SupervisorRequest::ChainStart { chain_id, data } => {
        self.start_chain(&chain_id, data).await?;
        Ok(SupervisorResponse::Ack)
      }

      SupervisorRequest::ChainStartPendingOccurrence { chain_id } => {
        self.start_pending_chain(&chain_id).await?;
        Ok(SupervisorResponse::Ack)
      }

      SupervisorRequest::ChainDeploy {
        config,
        data,
        parent_chain_id,
      } => {
        let chain_id = self.deploy(config, data.clone(), parent_chain_id).await?;
        // The deploy is accepted at this point; root execution failures
        // surface on the monitoring stream, not here.
        if let Err(err) = self.start_chain(&chain_id, Some(data)).await {
          error!(chain_id = %chain_id, error = %err, "chain start failed");
        }
        Ok(SupervisorResponse::ChainId(chain_id))
      }
    }
  }

  /// Assign a chain id and spread `index`/`count`/`monitoringHost` across
  /// the configuration.
  pub fn create_chain(&self, mut config: ChainConfig) -> Result<String, SupervisorError> {
    validate_chain_config(&config)?;

    let chain_id = self.generate_chain_id();
    let count = config.len();
    let monitoring_host = config.iter().find_map(|c| c.monitoring_host.clone());

    for (index, node_config) in config.iter_mut().enumerate() {
      node_config.chain_id = chain_id.clone();
      node_config.index = Some(index);
      node_config.count = Some(count);
      if node_config.monitoring_host.is_none() {
        node_config.monitoring_host = monitoring_host.clone();
      }
    }

    if let Some(host) = monitoring_host.as_deref().filter(|h| *h != "local") {
      self.monitoring.set_remote_monitoring_host(&chain_id, host);
    }

    let mut state = self.lock_state();
    if state.chains.contains_key(&chain_id) {
      return Err(SupervisorError::DuplicateChain { chain_id });
    }
    state.chains.insert(
      chain_id.clone(),
      ChainRelation {
        config,
        root_node_id: None,
        data_ref: None,
        parent_chain_id: None,
      },
    );
    drop(state);

    info!(chain_id = %chain_id, nodes = count, "chain_created");
    Ok(chain_id)
  }

  /// Partition the chain config by location: local configs become linked
  /// nodes, remote configs are annotated with their next hop and delivered
  /// through the setup broadcast.
  pub async fn prepare_chain_distribution(&self, chain_id: &str) -> Result<(), SupervisorError> {
    let config = self
      .chain(chain_id)
      .ok_or_else(|| SupervisorError::UnknownChain {
        chain_id: chain_id.to_string(),
      })?
      .config;

    let local_configs: Vec<NodeConfig> = config
      .iter()
      .filter(|c| c.location == Location::Local)
      .cloned()
      .collect();
    let mut remote_configs: Vec<NodeConfig> = config
      .iter()
      .filter(|c| c.location == Location::Remote)
      .cloned()
      .collect();

    let mut node_ids = Vec::with_capacity(local_configs.len());
    for node_config in local_configs {
      node_ids.push(self.create_node(node_config).await?);
    }

    // Link the local segment; its tail points at the first remote service.
    for (i, node_id) in node_ids.iter().enumerate() {
      let next = match node_ids.get(i + 1) {
        Some(next_id) => Some(NextNodeInfo::Local {
          node_id: next_id.clone(),
        }),
        None => remote_configs
          .first()
          .and_then(|cfg| cfg.first_service())
          .map(|service| NextNodeInfo::Remote {
            target_id: service.target_id.clone(),
            meta: service.meta.clone(),
          }),
      };
      if let Some(node) = self.node(node_id) {
        node.set_next(next).await;
      }
    }

    // Lookahead through the remote list so every remote segment knows its
    // own next hop.
    for i in 0..remote_configs.len() {
      let next_service = remote_configs
        .get(i + 1)
        .and_then(|cfg| cfg.first_service())
        .cloned();
      if let Some(service) = next_service {
        let cfg = &mut remote_configs[i];
        cfg.next_target_id = Some(service.target_id.clone());
        cfg.next_node_resolver = service.meta.as_ref().and_then(|m| m.resolver.clone());
        cfg.next_meta = service.meta;
      }
    }

    if let Some(relation) = self.lock_state().chains.get_mut(chain_id) {
      relation.root_node_id = node_ids.first().cloned();
    }

    // Remote setups are delivered at-least-once, best-effort.
    for remote_config in remote_configs {
      let payload = SetupPayload {
        chain_id: chain_id.to_string(),
        remote_configs: vec![remote_config],
      };
      if let Err(err) = self.callbacks.broadcast_setup.broadcast_setup(payload).await {
        warn!(chain_id = %chain_id, error = %err, "setup broadcast failed");
      }
    }

    Ok(())
  }

  /// `create_chain` + `prepare_chain_distribution`, stashing the initial
  /// data and registering the chain under its parent when one is given.
  pub async fn deploy(
    &self,
    config: ChainConfig,
    data: Value,
    parent_chain_id: Option<String>,
  ) -> Result<String, SupervisorError> {
    let chain_id = self.create_chain(config)?;
    self.prepare_chain_distribution(&chain_id).await?;

    let (root_node_id, count) = {
      let mut state = self.lock_state();
      if let Some(parent_id) = &parent_chain_id {
        state
          .child_chains
          .entry(parent_id.clone())
          .or_default()
          .push(chain_id.clone());
      }
      let relation = state
        .chains
        .get_mut(&chain_id)
        .ok_or_else(|| SupervisorError::UnknownChain {
          chain_id: chain_id.clone(),
        })?;
      relation.data_ref = Some(data);
      relation.parent_chain_id = parent_chain_id.clone();
      (relation.root_node_id.clone(), relation.config.len())
    };

    self.monitoring.receive(ReportMessage {
      chain_id: chain_id.clone(),
      node_id: root_node_id.unwrap_or_else(|| self.tag()),
      index: 0,
      count,
      status: ChainSignal::ChainDeployed,
      signal: None,
      payload: None,
    });

    info!(chain_id = %chain_id, parent_chain_id = ?parent_chain_id, "chain_deployed");
    Ok(chain_id)
  }

  /// Run the chain's local root node with the given (or stashed) data.
  pub async fn start_chain(
    &self,
    chain_id: &str,
    data: Option<Value>,
  ) -> Result<(), SupervisorError> {
    let relation = self
      .chain(chain_id)
      .ok_or_else(|| SupervisorError::UnknownChain {
        chain_id: chain_id.to_string(),
      })?;
    let data = data.or(relation.data_ref);

    match relation.root_node_id {
      Some(root_id) => self.run_node_by_id(&root_id, data).await,
      None => {
        warn!(chain_id = %chain_id, "chain has no local root node, nothing to start");
        Ok(())
      }
    }
  }

  /// Start a deployed chain with its stashed data. A parallel child chain
  /// runs in the background while the parent root node is notified of its
  /// start and completion; everything else runs to completion inline.
  pub async fn start_pending_chain(&self, chain_id: &str) -> Result<(), SupervisorError> {
    let (relation, parent_agent) = {
      let state = self.lock_state();
      let relation =
        state
          .chains
          .get(chain_id)
          .cloned()
          .ok_or_else(|| SupervisorError::UnknownChain {
            chain_id: chain_id.to_string(),
          })?;
      let parent_agent = relation
        .parent_chain_id
        .as_ref()
        .and_then(|parent_id| state.chains.get(parent_id))
        .and_then(|parent| parent.root_node_id.as_ref())
        .and_then(|root_id| state.nodes.get(root_id))
        .and_then(|node| node.reporting());
      (relation, parent_agent)
    };

    let data = relation.data_ref.clone();
    let child_mode = relation
      .config
      .first()
      .map(|cfg| cfg.child_mode)
      .unwrap_or_default();
    let payload = json!({ "childChainId": chain_id });

    if child_mode == ChildMode::Parallel {
      if let Some(agent) = &parent_agent {
        agent
          .emit_status_with(ChainSignal::ChildChainStarted, Some(payload.clone()))
          .await;
      }
      let Some(supervisor) = self.self_ref.upgrade() else {
        warn!(chain_id = %chain_id, "supervisor dropped, cannot start child chain");
        return Ok(());
      };
      let chain_id = chain_id.to_string();
      tokio::spawn(async move {
        if let Err(err) = supervisor.start_chain(&chain_id, data).await {
          // A parallel child's failure never cancels the parent.
          error!(chain_id = %chain_id, error = %err, "parallel child chain failed");
        }
        if let Some(agent) = parent_agent {
          agent
            .emit_status_with(ChainSignal::ChildChainCompleted, Some(payload))
            .await;
        }
      });
      Ok(())
    } else {
      self.start_chain(chain_id, data).await?;
      if let Some(agent) = parent_agent {
        agent
          .emit_status_with(ChainSignal::ChildChainCompleted, Some(payload))
          .await;
      }
      Ok(())
    }
  }

  /// Create a local node from a config and register it.
  pub async fn create_node(&self, config: NodeConfig) -> Result<String, SupervisorError> {
    let host: Weak<dyn ChainHost> = self.self_ref.clone();
    let callbacks = NodeCallbacks {
      process: self.callbacks.process.clone(),
      broadcast_pre: self.callbacks.broadcast_pre.clone(),
      remote_service: self.callbacks.remote_service.clone(),
      reporting: self.callbacks.reporting.clone(),
      local_report: self.monitoring.clone(),
    };
    let node = Node::new(host, callbacks, self.cancel.child_token());
    node.set_config(config).await;

    let node_id = node.id().to_string();
    self.lock_state().nodes.insert(node_id.clone(), node);
    info!(node_id = %node_id, "node_created");
    Ok(node_id)
  }

  /// Register and link a remote segment delivered by a peer's distributor.
  /// Returns the id of the segment's first node.
  pub async fn setup_remote_segment(
    &self,
    chain_id: &str,
    configs: Vec<NodeConfig>,
  ) -> Result<String, SupervisorError> {
    if configs.is_empty() {
      return Err(ConfigError::EmptyChain.into());
    }

    {
      let mut state = self.lock_state();
      if state.chains.contains_key(chain_id) {
        return Err(SupervisorError::DuplicateChain {
          chain_id: chain_id.to_string(),
        });
      }
      state.chains.insert(
        chain_id.to_string(),
        ChainRelation {
          config: configs.clone(),
          root_node_id: None,
          data_ref: None,
          parent_chain_id: None,
        },
      );
    }

    if let Some(host) = configs
      .iter()
      .find_map(|c| c.monitoring_host.clone())
      .filter(|h| h != "local")
    {
      self.monitoring.set_remote_monitoring_host(chain_id, &host);
    }

    let mut node_ids = Vec::with_capacity(configs.len());
    for config in &configs {
      let mut config = config.clone();
      config.chain_id = chain_id.to_string();
      node_ids.push(self.create_node(config).await?);
    }

    // Link the segment; the tail follows its own lookahead annotations.
    for (i, node_id) in node_ids.iter().enumerate() {
      let next = match node_ids.get(i + 1) {
        Some(next_id) => Some(NextNodeInfo::Local {
          node_id: next_id.clone(),
        }),
        None => configs[i]
          .next_target_id
          .as_ref()
          .map(|target_id| NextNodeInfo::Remote {
            target_id: target_id.clone(),
            meta: configs[i].next_meta.clone(),
          }),
      };
      if let Some(node) = self.node(node_id) {
        node.set_next(next).await;
      }
    }

    if let Some(relation) = self.lock_state().chains.get_mut(chain_id) {
      relation.root_node_id = node_ids.first().cloned();
    }

    info!(chain_id = %chain_id, nodes = node_ids.len(), "remote segment set up");
    Ok(node_ids.first().cloned().unwrap_or_default())
  }

  /// Run the pre-processor callback over a config's first service.
  pub async fn run_pre(&self, config: NodeConfig, data: Value) -> Result<Value, SupervisorError> {
    let service = config
      .first_service()
      .cloned()
      .ok_or(ConfigError::MissingServices {
        index: config.index.unwrap_or(0),
      })?;

    let Some(pre_process) = &self.callbacks.pre_process else {
      warn!(target_id = %service.target_id, "no pre-process callback registered, yielding empty value");
      return Ok(Value::Null);
    };

    let payload = CallbackPayload {
      target_id: service.target_id,
      meta: service.meta,
      chain_id: config.chain_id.clone(),
      data,
      next_target_id: config.next_target_id.clone(),
      next_node_resolver: config.next_node_resolver.clone(),
      previous_target_id: None,
    };
    Ok(pre_process.pre_digest(payload).await?)
  }

  /// Enqueue a suspend/resume for the node resolved by `(targetId,
  /// chainId)`, or forward it when the target lives on another host.
  pub async fn enqueue_node_status(
    &self,
    signal: ChainSignal,
    chain_id: String,
    target_id: String,
    host_uri: Option<String>,
    resume_payload: Option<ResumePayload>,
  ) -> Result<(), SupervisorError> {
    if let Some(host) = host_uri.filter(|h| h != "local") {
      let payload = StatusBroadcastPayload {
        chain_id: chain_id.clone(),
        signal,
        payload: StatusTarget {
          target_id: target_id.clone(),
          host_uri: Some(host),
        },
      };
      if let Err(err) = self.callbacks.node_status.broadcast_node_status(payload).await {
        warn!(chain_id = %chain_id, target_id = %target_id, error = %err, "status broadcast failed");
      }
      self.monitoring.receive(ReportMessage {
        chain_id,
        node_id: self.tag(),
        index: 0,
        count: 0,
        status: ChainSignal::ChainNotified,
        signal: Some(signal),
        payload: None,
      });
      return Ok(());
    }

    match self.find_node_by_target(&chain_id, &target_id) {
      Some(node) => {
        node
          .status_manager()
          .enqueue_signals(vec![signal], resume_payload);
        if signal == ChainSignal::NodeResume {
          if node.status() == NodeStatus::Suspended {
            if let Err(err) = node.execute(None).await {
              error!(chain_id = %chain_id, target_id = %target_id, error = %err, "resumed execution failed");
            }
          } else {
            warn!(
              chain_id = %chain_id,
              target_id = %target_id,
              "resume enqueued for a node that is not suspended"
            );
          }
        }
        Ok(())
      }
      None => {
        let miss = SupervisorError::RoutingMiss {
          chain_id,
          target_id,
        };
        error!(error = %miss, "dropping status signal");
        Ok(())
      }
    }
  }

  /// Forward an inbound chain notification to the chain's local root node
  /// as a global signal. Backs the connector's notify endpoint.
  pub async fn notify_chain(
    &self,
    chain_id: &str,
    signal: ChainSignal,
  ) -> Result<(), SupervisorError> {
    let relation = self
      .chain(chain_id)
      .ok_or_else(|| SupervisorError::UnknownChain {
        chain_id: chain_id.to_string(),
      })?;
    let agent = relation
      .root_node_id
      .as_ref()
      .and_then(|root_id| self.node(root_id))
      .and_then(|node| node.reporting());

    match agent {
      Some(agent) => {
        agent.emit_global(signal, None).await;
        Ok(())
      }
      None => {
        warn!(chain_id = %chain_id, "no local root node to notify");
        Ok(())
      }
    }
  }

  /// Remove a node from the registry. Persistent nodes are kept: deleting
  /// them is a warning no-op.
  pub async fn remove_node(&self, node_id: &str) -> Result<(), SupervisorError> {
    let Some(node) = self.node(node_id) else {
      warn!(node_id = %node_id, "delete requested for unknown node");
      return Ok(());
    };

    if node
      .routing()
      .is_some_and(|r| r.chain_type.contains(ChainType::PERSISTENT))
    {
      warn!(node_id = %node_id, "delete ignored for persistent node");
      return Ok(());
    }

    self.lock_state().nodes.remove(node_id);
    node.status_manager().set_status(NodeStatus::Deleted);
    if let Some(agent) = node.reporting() {
      agent.emit_status(ChainSignal::NodeDeleted).await;
    }
    info!(node_id = %node_id, "node_deleted");
    Ok(())
  }

  /// Resolve a local node by `(targetId, chainId)`.
  pub fn find_node_by_target(&self, chain_id: &str, target_id: &str) -> Option<Arc<Node>> {
    self
      .lock_state()
      .nodes
      .values()
      .find(|node| {
        node.routing().is_some_and(|routing| {
          routing.chain_id == chain_id && routing.target_ids.iter().any(|t| t == target_id)
        })
      })
      .cloned()
  }

  async fn run_node_by_id(&self, node_id: &str, data: Option<Value>) -> Result<(), SupervisorError> {
    let Some(node) = self.node(node_id) else {
      error!(node_id = %node_id, "no node registered under id");
      return Ok(());
    };
    node.execute(data).await?;
    Ok(())
  }

  fn generate_chain_id(&self) -> String {
    let millis = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .unwrap_or_default()
      .as_millis();
    let simple = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", self.uid, millis, &simple[..8])
  }

  fn lock_state(&self) -> std::sync::MutexGuard<'_, SupervisorState> {
    self.state.lock().expect("supervisor state lock poisoned")
  }
}

#[async_trait]
impl ChainHost for NodeSupervisor {
  async fn run_node(&self, node_id: &str, data: Option<Value>) -> Result<(), NodeError> {
    self
      .run_node_by_id(node_id, data)
      .await
      .map_err(|err| NodeError::Host {
        message: err.to_string(),
      })
  }

  async fn deploy_chain(
    &self,
    config: ChainConfig,
    data: Value,
    parent_chain_id: Option<String>,
  ) -> Result<String, NodeError> {
    self
      .deploy(config, data, parent_chain_id)
      .await
      .map_err(|err| NodeError::Host {
        message: err.to_string(),
      })
  }

  async fn start_pending_chain(&self, chain_id: &str) -> Result<(), NodeError> {
    NodeSupervisor::start_pending_chain(self, chain_id)
      .await
      .map_err(|err| NodeError::Host {
        message: err.to_string(),
      })
  }

  async fn delete_node(&self, node_id: &str) -> Result<(), NodeError> {
    self.remove_node(node_id).await.map_err(|err| NodeError::Host {
      message: err.to_string(),
    })
  }
}
