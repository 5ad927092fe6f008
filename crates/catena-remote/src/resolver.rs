//! Host resolution for outbound calls.

use reqwest::Url;

use catena_chain::PipelineMeta;

/// Resolve the base URL of the host serving a target.
///
/// `meta.resolver` wins when set; otherwise the scheme, host and port of
/// the target id parsed as a URL. Returns `None` when no host can be
/// determined, in which case callers drop the message with a warning.
pub fn resolve_host(target_id: &str, meta: Option<&PipelineMeta>) -> Option<String> {
  if let Some(resolver) = meta.and_then(|m| m.resolver.as_deref()) {
    return Some(resolver.trim_end_matches('/').to_string());
  }

  let url = Url::parse(target_id).ok()?;
  let host = url.host_str()?;
  let mut base = format!("{}://{}", url.scheme(), host);
  if let Some(port) = url.port() {
    base.push_str(&format!(":{port}"));
  }
  Some(base)
}
