//! Rate-limit-aware ESI HTTP client.
//!
//! Wraps `reqwest` with the behavior ESI expects from well-behaved
//! consumers: the error-limit headers are tracked across requests, a
//! pre-flight guard sleeps when the remaining budget is nearly exhausted,
//! and transient failures retry with server-driven or exponential delays.
//! Batch dispatch is chunked so no more than `max_concurrency` requests
//! are in flight at once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::MAX_RETRIES;
use crate::error::esi::EsiError;
use crate::progress::ProgressSink;

/// Remaining error budget below which the client waits out the window
/// before sending anything new.
const ERROR_LIMIT_FLOOR: i64 = 10;

/// Fallback delay when a rate-limit response carries no `retry-after`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Last-known server-side error-limit state, parsed from the
/// `x-esi-error-limit-remain` / `x-esi-error-limit-reset` headers.
#[derive(Clone, Copy, Debug)]
pub struct ErrorLimitState {
    pub remaining: i64,
    pub reset_at: Option<Instant>,
    pub last_update: Option<Instant>,
}

impl Default for ErrorLimitState {
    fn default() -> Self {
        Self {
            remaining: i64::MAX,
            reset_at: None,
            last_update: None,
        }
    }
}

/// Options for a chunked batch of GET requests.
pub struct BatchOptions {
    pub max_concurrency: usize,
    pub chunk_delay: Duration,
    pub progress: Option<ProgressSink>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            chunk_delay: Duration::from_millis(50),
            progress: None,
        }
    }
}

/// JSON HTTP client for ESI.
pub struct EsiClient {
    http: reqwest::Client,
    base_url: String,
    max_retries: u32,
    request_count: AtomicU64,
    error_limit: Mutex<ErrorLimitState>,
}

impl EsiClient {
    /// Builds a client with the stable headers ESI requires.
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, EsiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(agent) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, agent);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: MAX_RETRIES,
            request_count: AtomicU64::new(0),
            error_limit: Mutex::new(ErrorLimitState::default()),
        })
    }

    /// Overrides the retry ceiling. Tests use this to fail fast.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Total requests issued by this client instance.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Snapshot of the last-known error-limit state.
    pub fn error_limit(&self) -> ErrorLimitState {
        *self.error_limit.lock().expect("error limit lock poisoned")
    }

    /// `GET {base}/{path}` decoded as JSON. Returns `Ok(None)` on 404.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, EsiError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.execute(|| self.http.get(&url)).await
    }

    /// `POST {base}/{path}` with a JSON body, decoded as JSON.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, EsiError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let payload = serde_json::to_string(body)
            .map_err(|err| EsiError::Decode(format!("failed to encode request body: {err}")))?;
        self.execute(move || {
            self.http
                .post(&url)
                .header(CONTENT_TYPE, "application/json")
                .body(payload.clone())
        })
        .await
    }

    /// Issues `paths` as GETs in chunks of `max_concurrency`, returning a
    /// positionally-aligned vector. A failed request yields `None` in its
    /// slot; the batch itself never aborts.
    pub async fn get_batch<T: DeserializeOwned>(
        &self,
        paths: &[String],
        options: &BatchOptions,
    ) -> Vec<Option<T>> {
        let total = paths.len();
        let mut results: Vec<Option<T>> = Vec::with_capacity(total);
        let mut completed = 0usize;

        for chunk in paths.chunks(options.max_concurrency.max(1)) {
            let chunk_results =
                futures::future::join_all(chunk.iter().map(|path| self.get_json::<T>(path))).await;

            for (path, result) in chunk.iter().zip(chunk_results) {
                completed += 1;
                match result {
                    Ok(value) => results.push(value),
                    Err(err) => {
                        warn!(%path, "batch request failed: {err}");
                        results.push(None);
                    }
                }
            }

            if let Some(progress) = &options.progress {
                progress(completed, total, None);
            }

            if completed < total && !options.chunk_delay.is_zero() {
                tokio::time::sleep(options.chunk_delay).await;
            }
        }

        results
    }

    /// Runs one logical request: pre-flight guard, then up to
    /// `MAX_RETRIES` attempts with per-class delays.
    async fn execute<T, F>(&self, build: F) -> Result<Option<T>, EsiError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        self.preflight_wait().await;

        let mut attempt = 0u32;
        loop {
            let outcome = self.send_once(build()).await;

            let err = match outcome {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let Some(delay) = err.retry_delay(attempt) else {
                return Err(err);
            };
            if attempt >= self.max_retries {
                return Err(err);
            }

            let jitter = Duration::from_millis(rand::rng().random_range(0..1000));
            debug!(attempt, ?delay, "retrying ESI request: {err}");
            tokio::time::sleep(delay + jitter).await;
            attempt += 1;
        }
    }

    /// Sleep until the error-limit window resets when the remaining
    /// budget is below the floor. Consulted once per logical request,
    /// before the first attempt.
    async fn preflight_wait(&self) {
        let state = self.error_limit();
        if state.remaining >= ERROR_LIMIT_FLOOR {
            return;
        }

        if let Some(reset_at) = state.reset_at {
            let now = Instant::now();
            if reset_at > now {
                let wait = reset_at - now;
                warn!(
                    remaining = state.remaining,
                    ?wait,
                    "ESI error budget low, waiting for window reset"
                );
                tokio::time::sleep(wait).await;
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, EsiError> {
        self.request_count.fetch_add(1, Ordering::Relaxed);

        let response = request.send().await?;
        self.observe_rate_headers(&response);

        let status = response.status();
        match status {
            s if s.is_success() => {
                let value = response
                    .json::<T>()
                    .await
                    .map_err(|err| EsiError::Decode(err.to_string()))?;
                Ok(Some(value))
            }
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                Err(EsiError::BadRequest(body))
            }
            s if s.as_u16() == 420 || s == StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                Err(EsiError::RateLimited { retry_after_secs })
            }
            s if s.is_server_error() => Err(EsiError::Server { status: s.as_u16() }),
            s => Err(EsiError::Unexpected { status: s.as_u16() }),
        }
    }

    /// Updates the shared error-limit state from response headers.
    /// Mutations happen only at response boundaries.
    fn observe_rate_headers(&self, response: &Response) {
        let headers = response.headers();
        let remain = headers
            .get("x-esi-error-limit-remain")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());
        let reset_secs = headers
            .get("x-esi-error-limit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        if remain.is_none() && reset_secs.is_none() {
            return;
        }

        let mut state = self.error_limit.lock().expect("error limit lock poisoned");
        if let Some(remaining) = remain {
            state.remaining = remaining;
        }
        if let Some(secs) = reset_secs {
            state.reset_at = Some(Instant::now() + Duration::from_secs(secs));
        }
        state.last_update = Some(Instant::now());
    }
}
