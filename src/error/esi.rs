use std::time::Duration;

use thiserror::Error;

/// Errors produced by the ESI HTTP client.
///
/// `404` is not represented here: the client normalizes it to an absent
/// value because a missing entity is an expected outcome, not a failure.
#[derive(Error, Debug)]
pub enum EsiError {
    /// The request was malformed; surfaced to the caller unretried.
    #[error("ESI rejected the request as malformed: {0}")]
    BadRequest(String),
    /// Error-limited by ESI (HTTP 420 or 429).
    #[error("ESI rate limit reached, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    /// ESI is temporarily unavailable.
    #[error("ESI server error (status {status})")]
    Server { status: u16 },
    /// A status outside the documented mapping.
    #[error("Unexpected ESI response status {status}")]
    Unexpected { status: u16 },
    /// Network-level failure from the underlying transport.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// The response body did not match the expected shape.
    #[error("Failed to decode ESI response: {0}")]
    Decode(String),
}

impl EsiError {
    /// Delay before the next attempt, or `None` when the error is not
    /// retryable. `attempt` is zero-based; server errors back off
    /// exponentially while rate limits honor the server-provided delay.
    /// Jitter is added by the client, not here.
    pub fn retry_delay(&self, attempt: u32) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after_secs } => {
                Some(Duration::from_secs(*retry_after_secs))
            }
            Self::Server { .. } => Some(Duration::from_millis(1000 * 2u64.pow(attempt))),
            Self::Transport(err) if err.is_connect() || err.is_request() => {
                Some(Duration::from_millis(1000 * 2u64.pow(attempt)))
            }
            _ => None,
        }
    }
}
