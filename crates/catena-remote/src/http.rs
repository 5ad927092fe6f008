//! Default HTTP POST implementations of the broadcast contracts.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use catena_chain::{
  BroadcastError, BroadcastPre, BroadcastSetup, NodeConfig, NodeStatusBroadcast, RemoteService,
  RemoteRunPayload, ReportMessage, ReportingSink, SetupPayload, StatusBroadcastPayload,
};

use crate::resolver::resolve_host;

/// Conventional connector paths the default callbacks POST to.
pub mod paths {
  pub const SETUP: &str = "/node/communicate/setup";
  pub const RUN: &str = "/node/communicate/run";
  pub const NOTIFY: &str = "/node/communicate/notify";
  pub const ENQUEUE_STATUS: &str = "/node/communicate/enqueue-status";
  pub const PRE: &str = "/node/pre";
  pub const REPORT: &str = "/monitoring/report";
}

/// HTTP POST implementation of the outbound broadcast contracts.
#[derive(Debug, Clone, Default)]
pub struct HttpBroadcaster {
  client: Client,
}

impl HttpBroadcaster {
  pub fn new() -> Self {
    Self::default()
  }

  async fn post_json<B: Serialize + ?Sized>(
    &self,
    url: &str,
    body: &B,
  ) -> Result<reqwest::Response, BroadcastError> {
    debug!(url = %url, "outbound POST");
    let response = self
      .client
      .post(url)
      .json(body)
      .send()
      .await
      .map_err(|err| BroadcastError::Transport {
        url: url.to_string(),
        message: err.to_string(),
      })?;

    if !response.status().is_success() {
      return Err(BroadcastError::Transport {
        url: url.to_string(),
        message: format!("unexpected status {}", response.status()),
      });
    }
    Ok(response)
  }
}

fn config_host(config: &NodeConfig) -> Result<String, BroadcastError> {
  let service = config
    .first_service()
    .ok_or(BroadcastError::Unresolvable {
      target_id: String::new(),
    })?;
  resolve_host(&service.target_id, service.meta.as_ref()).ok_or_else(|| {
    BroadcastError::Unresolvable {
      target_id: service.target_id.clone(),
    }
  })
}

#[async_trait]
impl BroadcastSetup for HttpBroadcaster {
  async fn broadcast_setup(&self, payload: SetupPayload) -> Result<(), BroadcastError> {
    let config = payload
      .remote_configs
      .first()
      .ok_or(BroadcastError::Unresolvable {
        target_id: String::new(),
      })?;
    let host = config_host(config)?;
    let url = format!("{host}{}", paths::SETUP);
    self.post_json(&url, &payload).await?;
    Ok(())
  }
}

/// Wire body for the pre-stage POST: the sub-chain's entry config plus the
/// data it digests.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PreRequest<'a> {
  config: &'a NodeConfig,
  data: &'a Value,
}

#[async_trait]
impl BroadcastPre for HttpBroadcaster {
  async fn broadcast_pre(
    &self,
    configs: &[NodeConfig],
    data: Value,
  ) -> Result<Option<Value>, BroadcastError> {
    let Some(config) = configs.first() else {
      return Ok(None);
    };
    let host = config_host(config)?;
    let url = format!("{host}{}", paths::PRE);

    let response = self
      .post_json(
        &url,
        &PreRequest {
          config,
          data: &data,
        },
      )
      .await?;

    let body: Value = response
      .json()
      .await
      .map_err(|err| BroadcastError::InvalidResponse {
        message: err.to_string(),
      })?;
    Ok(body.get("data").cloned().filter(|v| !v.is_null()))
  }
}

#[async_trait]
impl RemoteService for HttpBroadcaster {
  async fn call_remote_service(&self, payload: RemoteRunPayload) -> Result<(), BroadcastError> {
    let host = resolve_host(&payload.target_id, payload.meta.as_ref()).ok_or_else(|| {
      BroadcastError::Unresolvable {
        target_id: payload.target_id.clone(),
      }
    })?;
    let url = format!("{host}{}", paths::RUN);
    self.post_json(&url, &payload).await?;
    Ok(())
  }
}

#[async_trait]
impl NodeStatusBroadcast for HttpBroadcaster {
  async fn broadcast_node_status(
    &self,
    payload: StatusBroadcastPayload,
  ) -> Result<(), BroadcastError> {
    let host = match payload.payload.host_uri.as_deref() {
      Some(host) => host.trim_end_matches('/').to_string(),
      None => resolve_host(&payload.payload.target_id, None).ok_or_else(|| {
        BroadcastError::Unresolvable {
          target_id: payload.payload.target_id.clone(),
        }
      })?,
    };
    let url = format!("{host}{}", paths::ENQUEUE_STATUS);
    self.post_json(&url, &payload).await?;
    Ok(())
  }
}

/// HTTP POST delivery of global-signal reports to a monitoring host.
#[derive(Debug, Clone, Default)]
pub struct HttpReportingSink {
  client: Client,
}

impl HttpReportingSink {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl ReportingSink for HttpReportingSink {
  async fn report(
    &self,
    monitoring_host: &str,
    message: ReportMessage,
  ) -> Result<(), BroadcastError> {
    let url = format!("{}{}", monitoring_host.trim_end_matches('/'), paths::REPORT);
    debug!(url = %url, status = ?message.status, "report POST");
    let response = self
      .client
      .post(&url)
      .json(&message)
      .send()
      .await
      .map_err(|err| BroadcastError::Transport {
        url: url.clone(),
        message: err.to_string(),
      })?;

    if !response.status().is_success() {
      return Err(BroadcastError::Transport {
        url,
        message: format!("unexpected status {}", response.status()),
      });
    }
    Ok(())
  }
}
