use std::time::Duration;

use thiserror::Error;

use crate::model::entity::EntityKind;

/// Backoff ceiling for zKill proxy retries.
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Errors produced by the zKill proxy client and the kill feed built on it.
///
/// The enum is `Clone` because a single-flight feed fans one failure out
/// to every subscriber.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZkillError {
    /// Throttled by the proxy (HTTP 420 or 429).
    #[error("zKill rate limit reached, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    /// The proxy or the killboard behind it is unavailable.
    #[error("zKill server error (status {status})")]
    Server { status: u16 },
    /// The request was malformed; surfaced unretried.
    #[error("zKill rejected the request as malformed: {0}")]
    BadRequest(String),
    /// The 15 second per-request deadline elapsed.
    #[error("zKill request timed out")]
    Timeout,
    /// Proof-of-work search exhausted its iteration bound. Not retryable:
    /// this indicates a logic bug or severe clock skew, and re-running the
    /// same search would burn another million hashes for nothing.
    #[error("Proof-of-work search exhausted {0} iterations without a valid nonce")]
    PowExhausted(u64),
    /// Network-level failure, stringified to keep the error cloneable.
    #[error("zKill transport error: {0}")]
    Transport(String),
    /// A kill feed failed for reasons outside the transport taxonomy
    /// (verification, cache persistence). Carries the feed identity so
    /// subscribers know which entity failed.
    #[error("Kill feed for {kind} {id} failed: {message}")]
    Feed {
        kind: EntityKind,
        id: i64,
        message: String,
    },
}

impl ZkillError {
    /// Delay before the next attempt, or `None` when the error is not
    /// retryable. Transient classes use capped exponential backoff.
    pub fn retry_delay(&self, attempt: u32) -> Option<Duration> {
        let backoff = || Duration::from_millis(1000 * 2u64.pow(attempt)).min(MAX_BACKOFF);

        match self {
            Self::RateLimited { retry_after_secs } => {
                Some(Duration::from_secs(*retry_after_secs).min(MAX_BACKOFF))
            }
            Self::Server { .. } | Self::Timeout | Self::Transport(_) => Some(backoff()),
            Self::BadRequest(_) | Self::PowExhausted(_) | Self::Feed { .. } => None,
        }
    }
}
