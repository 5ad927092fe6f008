use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use catena_chain::ChainConfig;
use catena_pipeline::EchoCallback;
use catena_remote::{HttpBroadcaster, HttpReportingSink};
use catena_supervisor::{
  NodeSupervisor, SupervisorCallbacks, SupervisorRequest, SupervisorResponse,
};

/// Catena - a distributed data-processing chain orchestrator
#[derive(Parser)]
#[command(name = "catena")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Supervisor uid (default: $CONNECTOR_UID, then "local")
  #[arg(long, global = true)]
  uid: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Deploy and run a chain from a config file
  Run {
    /// Path to the chain config (JSON)
    chain_file: PathBuf,

    /// Initial data as inline JSON (default: {})
    #[arg(long)]
    data: Option<String>,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let cli = Cli::parse();
  let uid = cli
    .uid
    .or_else(|| std::env::var("CONNECTOR_UID").ok())
    .unwrap_or_else(|| "local".to_string());

  match cli.command {
    Commands::Run { chain_file, data } => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(run_chain(chain_file, data, uid))
    }
  }
}

async fn run_chain(chain_file: PathBuf, data: Option<String>, uid: String) -> Result<()> {
  let config_content = std::fs::read_to_string(&chain_file)
    .with_context(|| format!("failed to read chain file: {}", chain_file.display()))?;
  let config: ChainConfig = serde_json::from_str(&config_content)
    .with_context(|| format!("failed to parse chain file: {}", chain_file.display()))?;

  let data: serde_json::Value = match data {
    Some(raw) => serde_json::from_str(&raw).context("failed to parse --data JSON")?,
    None => serde_json::json!({}),
  };

  eprintln!("Loaded chain config with {} nodes", config.len());

  let broadcaster = Arc::new(HttpBroadcaster::new());
  let callbacks = SupervisorCallbacks {
    process: Some(Arc::new(EchoCallback)),
    pre_process: Some(Arc::new(EchoCallback)),
    broadcast_setup: broadcaster.clone(),
    broadcast_pre: broadcaster.clone(),
    remote_service: broadcaster.clone(),
    node_status: broadcaster,
    reporting: Arc::new(HttpReportingSink::new()),
  };
  let supervisor = NodeSupervisor::new(uid, callbacks);

  let response = supervisor
    .handle_request(SupervisorRequest::ChainDeploy {
      config,
      data,
      parent_chain_id: None,
    })
    .await
    .context("chain deploy failed")?;

  let chain_id = match response {
    SupervisorResponse::ChainId(chain_id) => chain_id,
    other => anyhow::bail!("unexpected deploy response: {other:?}"),
  };

  eprintln!("Chain deployed: {chain_id}");

  // Print the monitoring summary as JSON.
  let summary: serde_json::Map<String, serde_json::Value> = supervisor
    .monitoring()
    .workflow_summary(&chain_id)
    .into_iter()
    .map(|(node_id, progress)| {
      (
        node_id,
        serde_json::json!({
          "index": progress.index,
          "count": progress.count,
          "status": progress.last_status,
        }),
      )
    })
    .collect();

  println!("{}", serde_json::to_string_pretty(&summary)?);
  Ok(())
}
