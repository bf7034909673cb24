//! Time helpers for cache timestamps.
//!
//! Cache rows store milliseconds since epoch; freshness is evaluated
//! against a per-table TTL.

use std::time::Duration;

use chrono::Utc;

/// Current time in milliseconds since epoch, the unit every cache row uses.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Whether a row written at `timestamp_ms` is still within `ttl`.
/// Rows stamped in the future (clock skew) count as fresh.
pub fn is_fresh(timestamp_ms: i64, ttl: Duration, now_ms: i64) -> bool {
    let age = now_ms.saturating_sub(timestamp_ms);
    if age < 0 {
        return true;
    }
    (age as u128) < ttl.as_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_within_ttl() {
        assert!(is_fresh(1_000, Duration::from_millis(500), 1_400));
    }

    #[test]
    fn stale_at_ttl_boundary() {
        assert!(!is_fresh(1_000, Duration::from_millis(500), 1_500));
    }

    #[test]
    fn future_timestamp_counts_as_fresh() {
        // Clock skew between processes should not evict rows.
        assert!(is_fresh(2_000, Duration::from_millis(500), 1_000));
    }
}
