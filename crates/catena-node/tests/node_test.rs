//! Integration tests for the node execution engine.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use catena_chain::{
  BroadcastError, BroadcastPre, ChainSignal, NodeConfig, NodeStatus, NoopBroadcast, ReportMessage,
  ResumePayload, ServiceConfig,
};
use catena_node::{ChainHost, ChannelReportSink, Node, NodeCallbacks, NodeError};
use catena_pipeline::EchoCallback;

/// Host stub for tests that never leave the node.
struct StubHost;

#[async_trait]
impl ChainHost for StubHost {
  async fn run_node(&self, _node_id: &str, _data: Option<Value>) -> Result<(), NodeError> {
    Ok(())
  }

  async fn deploy_chain(
    &self,
    _config: Vec<NodeConfig>,
    _data: Value,
    _parent_chain_id: Option<String>,
  ) -> Result<String, NodeError> {
    Ok("child-chain".to_string())
  }

  async fn start_pending_chain(&self, _chain_id: &str) -> Result<(), NodeError> {
    Ok(())
  }

  async fn delete_node(&self, _node_id: &str) -> Result<(), NodeError> {
    Ok(())
  }
}

/// Records the pre-stage dispatch and answers with a fixed value.
struct RecordingPre {
  seen: Mutex<Vec<Value>>,
  answer: Value,
}

#[async_trait]
impl BroadcastPre for RecordingPre {
  async fn broadcast_pre(
    &self,
    _configs: &[NodeConfig],
    data: Value,
  ) -> Result<Option<Value>, BroadcastError> {
    self.seen.lock().unwrap().push(data);
    Ok(Some(self.answer.clone()))
  }
}

struct TestBench {
  host: Arc<StubHost>,
  node: Arc<Node>,
  reports: mpsc::UnboundedReceiver<ReportMessage>,
}

fn bench_with_pre(pre: Option<Arc<RecordingPre>>) -> TestBench {
  let host = Arc::new(StubHost);
  let (sender, reports) = mpsc::unbounded_channel();
  let broadcast_pre: Arc<dyn BroadcastPre> = match pre {
    Some(pre) => pre,
    None => Arc::new(NoopBroadcast),
  };
  let callbacks = NodeCallbacks {
    process: Some(Arc::new(EchoCallback)),
    broadcast_pre,
    remote_service: Arc::new(NoopBroadcast),
    reporting: Arc::new(NoopBroadcast),
    local_report: Arc::new(ChannelReportSink::new(sender)),
  };
  let weak = Arc::downgrade(&host);
  let node = Node::new(weak, callbacks, CancellationToken::new());
  TestBench {
    host,
    node,
    reports,
  }
}

fn bench() -> TestBench {
  bench_with_pre(None)
}

fn node_config(chain_id: &str) -> NodeConfig {
  NodeConfig {
    chain_id: chain_id.to_string(),
    index: Some(0),
    count: Some(1),
    services: vec![ServiceConfig::new("svc-A")],
    ..NodeConfig::default()
  }
}

fn drain_statuses(reports: &mut mpsc::UnboundedReceiver<ReportMessage>) -> Vec<ChainSignal> {
  let mut statuses = Vec::new();
  while let Ok(message) = reports.try_recv() {
    statuses.push(message.status);
  }
  statuses
}

#[tokio::test]
async fn completes_with_one_output_per_pipeline() {
  let mut bench = bench();
  bench.node.set_config(node_config("chain-basic")).await;
  for _ in 0..4 {
    bench
      .node
      .add_pipeline(&[ServiceConfig::new("svc-A")])
      .await;
  }

  bench.node.execute(Some(json!({"k": 1}))).await.unwrap();

  assert_eq!(bench.node.status(), NodeStatus::Completed);
  let output = bench.node.output().await;
  assert_eq!(output.len(), 5);
  assert!(output.iter().all(|entry| entry.data == json!({"k": 1})));
  assert!((bench.node.progress().await - 1.0).abs() < 1e-9);

  let statuses = drain_statuses(&mut bench.reports);
  assert!(statuses.contains(&ChainSignal::NodeSetupCompleted));
  assert!(statuses.contains(&ChainSignal::NodeInProgress));
  assert!(statuses.contains(&ChainSignal::NodeCompleted));
  // No next hop: the end of the pipeline loops back onto the local bus.
  assert!(statuses.contains(&ChainSignal::NodeEndOfPipeline));
  drop(bench.host);
}

#[tokio::test]
async fn suspend_takes_effect_after_the_current_batch() {
  let mut bench = bench();
  bench.node.set_config(node_config("chain-suspend")).await;
  for _ in 0..5 {
    bench
      .node
      .add_pipeline(&[ServiceConfig::new("svc-A")])
      .await;
  }

  bench
    .node
    .status_manager()
    .enqueue_signals(vec![ChainSignal::NodeSuspend], None);

  bench.node.execute(Some(json!({"k": 1}))).await.unwrap();

  assert_eq!(bench.node.status(), NodeStatus::Suspended);
  // Batch 1 (three pipelines) completed before the signal was observed.
  assert_eq!(bench.node.output().await.len(), 3);
  let progress = bench.node.progress().await;
  assert!((progress - 0.5).abs() < 1e-9);

  let stashed = bench
    .node
    .status_manager()
    .suspended_state()
    .expect("suspended state");
  assert_eq!(stashed.next_batch_index, 1);
  assert_eq!(stashed.data, json!({"k": 1}));

  let statuses = drain_statuses(&mut bench.reports);
  assert!(statuses.contains(&ChainSignal::NodeSuspended));
  assert!(!statuses.contains(&ChainSignal::NodeCompleted));
  drop(bench.host);
}

#[tokio::test]
async fn resume_with_payload_replaces_output_and_completes() {
  let mut bench = bench();
  bench.node.set_config(node_config("chain-resume")).await;
  for _ in 0..5 {
    bench
      .node
      .add_pipeline(&[ServiceConfig::new("svc-A")])
      .await;
  }

  bench
    .node
    .status_manager()
    .enqueue_signals(vec![ChainSignal::NodeSuspend], None);
  bench.node.execute(Some(json!({"k": 1}))).await.unwrap();
  assert_eq!(bench.node.status(), NodeStatus::Suspended);

  bench.node.status_manager().enqueue_signals(
    vec![ChainSignal::NodeResume],
    Some(ResumePayload {
      data: Some(json!({"z": 9})),
      params: Some(json!({"from": "svc-prev"})),
    }),
  );
  bench.node.execute(None).await.unwrap();

  assert_eq!(bench.node.status(), NodeStatus::Completed);
  let output = bench.node.output().await;
  assert_eq!(output.len(), 1);
  assert_eq!(output[0].data, json!({"z": 9}));
  assert_eq!(output[0].previous_node_params, Some(json!({"from": "svc-prev"})));

  let statuses = drain_statuses(&mut bench.reports);
  assert!(statuses.contains(&ChainSignal::NodeCompleted));
  drop(bench.host);
}

#[tokio::test]
async fn suspend_resume_round_trip_matches_plain_execution() {
  // With deterministic (echo) processors, suspending and resuming with the
  // stashed data must land on the same forward value as a plain run.
  let plain = bench();
  plain.node.set_config(node_config("chain-law-a")).await;
  for _ in 0..5 {
    plain.node.add_pipeline(&[ServiceConfig::new("svc-A")]).await;
  }
  plain.node.execute(Some(json!({"k": 7}))).await.unwrap();
  let plain_forward = plain.node.output().await[0].data.clone();

  let suspended = bench();
  suspended.node.set_config(node_config("chain-law-b")).await;
  for _ in 0..5 {
    suspended
      .node
      .add_pipeline(&[ServiceConfig::new("svc-A")])
      .await;
  }
  suspended
    .node
    .status_manager()
    .enqueue_signals(vec![ChainSignal::NodeSuspend], None);
  suspended.node.execute(Some(json!({"k": 7}))).await.unwrap();
  suspended
    .node
    .status_manager()
    .enqueue_signals(vec![ChainSignal::NodeResume], None);
  suspended.node.execute(None).await.unwrap();

  assert_eq!(suspended.node.output().await[0].data, plain_forward);
  drop(plain.host);
  drop(suspended.host);
}

#[tokio::test]
async fn pre_stage_result_is_merged_into_the_input() {
  let pre = Arc::new(RecordingPre {
    seen: Mutex::new(Vec::new()),
    answer: json!({"y": 2}),
  });
  let bench = bench_with_pre(Some(pre.clone()));

  let mut config = node_config("chain-pre");
  config.pre = vec![vec![NodeConfig {
    services: vec![ServiceConfig::new("pre1")],
    ..NodeConfig::default()
  }]];
  bench.node.set_config(config).await;

  bench.node.execute(Some(json!({"x": 1}))).await.unwrap();

  let seen = pre.seen.lock().unwrap();
  assert_eq!(seen.as_slice(), &[json!({"x": 1})]);

  let output = bench.node.output().await;
  assert_eq!(
    output[0].data,
    json!({"origin": {"x": 1}, "additionalData": [{"y": 2}]})
  );
  drop(bench.host);
}

#[tokio::test]
async fn execute_without_config_is_rejected() {
  let bench = bench();
  let err = bench.node.execute(Some(json!({}))).await.unwrap_err();
  assert!(matches!(err, NodeError::NotConfigured));
  drop(bench.host);
}
