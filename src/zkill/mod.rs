//! Client for the proof-of-work-gated zKill proxy.
//!
//! Each page request carries a freshly mined token; the proxy validates
//! it and forwards the query to the killboard. Transient failures retry
//! with capped exponential backoff; proof-of-work failures do not retry.

pub mod pow;

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::zkill::ZkillError;
use crate::model::entity::EntityKind;
use crate::model::killmail::KillRef;

/// HTTP client for the kill feed proxy.
pub struct ZkillClient {
    http: reqwest::Client,
    proxy_url: String,
    pow_difficulty: u32,
    timeout: Duration,
    max_retries: u32,
}

impl ZkillClient {
    pub fn new(config: &PipelineConfig) -> Result<Self, ZkillError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| ZkillError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            proxy_url: config.zkill_proxy.clone(),
            pow_difficulty: config.pow_difficulty,
            timeout: config.zkill_timeout,
            max_retries: config.max_retries,
        })
    }

    /// Overrides the retry ceiling. Tests use this to fail fast.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Fetches one page of kill references for an entity.
    ///
    /// `404` and non-array bodies normalize to an empty page; the
    /// paginator treats an empty page as the end of the feed.
    pub async fn kills_page(
        &self,
        kind: EntityKind,
        id: i64,
        page: u32,
    ) -> Result<Vec<KillRef>, ZkillError> {
        let mut attempt = 0u32;
        loop {
            let err = match self.kills_page_once(kind, id, page).await {
                Ok(kills) => return Ok(kills),
                Err(err) => err,
            };

            let Some(delay) = err.retry_delay(attempt) else {
                return Err(err);
            };
            if attempt >= self.max_retries {
                return Err(err);
            }

            debug!(attempt, ?delay, %kind, id, page, "retrying zKill request: {err}");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn kills_page_once(
        &self,
        kind: EntityKind,
        id: i64,
        page: u32,
    ) -> Result<Vec<KillRef>, ZkillError> {
        // A fresh token per attempt; the proxy rejects stale timestamps.
        let token = pow::solve(id, Utc::now().timestamp(), self.pow_difficulty)?;

        let response = self
            .http
            .get(&self.proxy_url)
            .timeout(self.timeout)
            .query(&[
                ("kills", kind.as_str().to_string()),
                ("id", id.to_string()),
                ("page", page.to_string()),
                ("nonce", token.nonce.to_string()),
                ("ts", token.ts.to_string()),
                ("hash", token.hash),
            ])
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ZkillError::Timeout
                } else {
                    ZkillError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => {}
            404 => return Ok(Vec::new()),
            420 | 429 => {
                let retry_after_secs = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(ZkillError::RateLimited { retry_after_secs });
            }
            400 => {
                let body = response.text().await.unwrap_or_default();
                return Err(ZkillError::BadRequest(body));
            }
            s if status.is_server_error() => return Err(ZkillError::Server { status: s }),
            s => {
                return Err(ZkillError::Transport(format!(
                    "unexpected proxy status {s}"
                )))
            }
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|err| ZkillError::Transport(format!("failed to decode page: {err}")))?;

        // The proxy occasionally returns an error object with status 200;
        // anything that is not an array is an empty page.
        match body {
            serde_json::Value::Array(items) => {
                let mut kills = Vec::with_capacity(items.len());
                for item in items {
                    match serde_json::from_value::<KillRef>(item) {
                        Ok(kill) => kills.push(kill),
                        Err(err) => warn!(%kind, id, page, "skipping malformed kill ref: {err}"),
                    }
                }
                Ok(kills)
            }
            _ => Ok(Vec::new()),
        }
    }
}
