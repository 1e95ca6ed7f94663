//! Network transport behind discovery, with cache-busting applied to every
//! request so a kiosk never shows a stale copy of mutable album content.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::Error;

/// Metadata returned by a successful existence probe.
#[derive(Debug, Clone)]
pub struct ProbeHit {
    pub last_modified: Option<DateTime<Utc>>,
}

/// Fetch operations discovery and the viewer need. Failures are soft:
/// strategies fall through on `None`, they never abort the caller.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// GET a JSON document. `None` when the resource is missing,
    /// unreachable, or not JSON.
    async fn get_json(&self, url: &str) -> Option<Value>;

    /// HEAD-style existence check, no body transfer. `None` on a miss.
    async fn head(&self, url: &str) -> Option<ProbeHit>;

    /// GET a resource body. `None` on any failure.
    async fn get_bytes(&self, url: &str) -> Option<Vec<u8>>;
}

/// Production transport over `reqwest`.
pub struct HttpTransport {
    client: Client,
    bust: String,
}

impl HttpTransport {
    pub fn new(timeout: Duration, cache_bust: Option<String>) -> Result<Self, Error> {
        let client = Client::builder().timeout(timeout).build()?;
        let bust = cache_bust.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs()
                .to_string()
        });
        Ok(Self { client, bust })
    }

    fn busted(&self, url: &str) -> String {
        cache_busted(url, &self.bust)
    }
}

impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> Option<Value> {
        match self.client.get(self.busted(url)).send().await {
            Ok(res) if res.status().is_success() => res.json().await.ok(),
            Ok(res) => {
                debug!(url, status = %res.status(), "json fetch miss");
                None
            }
            Err(err) => {
                debug!(url, error = %err, "json fetch failed");
                None
            }
        }
    }

    async fn head(&self, url: &str) -> Option<ProbeHit> {
        match self.client.head(self.busted(url)).send().await {
            Ok(res) if res.status().is_success() => {
                let last_modified = res
                    .headers()
                    .get(reqwest::header::LAST_MODIFIED)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| DateTime::parse_from_rfc2822(s).ok())
                    .map(|d| d.with_timezone(&Utc));
                Some(ProbeHit { last_modified })
            }
            Ok(_) => None,
            Err(err) => {
                debug!(url, error = %err, "probe failed");
                None
            }
        }
    }

    async fn get_bytes(&self, url: &str) -> Option<Vec<u8>> {
        match self.client.get(self.busted(url)).send().await {
            Ok(res) if res.status().is_success() => {
                res.bytes().await.ok().map(|b| b.to_vec())
            }
            Ok(res) => {
                debug!(url, status = %res.status(), "body fetch miss");
                None
            }
            Err(err) => {
                debug!(url, error = %err, "body fetch failed");
                None
            }
        }
    }
}

/// Join a base URL and a relative path with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Append the volatile `v` query parameter.
pub fn cache_busted(url: &str, token: &str) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}v={token}")
}
