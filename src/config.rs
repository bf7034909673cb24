//! Pipeline configuration.
//!
//! Collects every tunable the pipeline consults: API endpoints, cache
//! TTLs, retry policy, batch sizing, and pagination heuristics. Values the
//! user may adjust at runtime live in [`crate::service::settings`]; this
//! struct carries the fixed defaults and operator-level knobs.

use std::time::Duration;

/// Default public ESI endpoint.
pub const DEFAULT_ESI_BASE: &str = "https://esi.evetech.net/latest";

/// Maximum names per `POST /universe/ids/` request.
pub const ESI_IDS_REQUEST_LIMIT: usize = 100;

/// Maximum character IDs per `POST /characters/affiliation/` request.
pub const ESI_AFFILIATION_REQUEST_LIMIT: usize = 100;

/// Retry ceiling shared by both HTTP clients.
pub const MAX_RETRIES: u32 = 3;

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Base URL of the ESI API, overridable for tests.
    pub esi_base: String,
    /// URL of the proof-of-work-gated zKill proxy.
    pub zkill_proxy: String,
    /// Stable User-Agent sent on every request.
    pub user_agent: String,

    /// Retry ceiling for both HTTP clients.
    pub max_retries: u32,

    /// TTL for affiliation rows and corporation war-eligibility.
    pub short_ttl: Duration,
    /// TTL for resolved names, org names, alliances, killmails, and
    /// universe rows.
    pub long_ttl: Duration,
    /// TTL for cached kill feeds.
    pub feed_ttl: Duration,

    /// Concurrent requests per ESI batch chunk.
    pub esi_max_concurrency: usize,
    /// Delay between ESI batch chunks.
    pub esi_batch_delay: Duration,
    /// Concurrent requests when fetching corporation/alliance info.
    pub org_info_concurrency: usize,
    /// Delay between killmail fetch chunks.
    pub killmail_batch_delay: Duration,

    /// zKill proxy proof-of-work difficulty in bits; 12 means the token
    /// digest must start with three zero hex characters.
    pub pow_difficulty: u32,
    /// Per-request timeout on the zKill proxy.
    pub zkill_timeout: Duration,
    /// Delay between kill feed page fetches.
    pub page_fetch_delay: Duration,
    /// Pages fetched between timespan verifications.
    pub verify_after_pages: u32,
    /// Seed for the killmail-id-per-day rate used by the timespan
    /// estimate until a verification derives the real rate.
    pub seed_daily_rate: f64,

    /// Window for the "recent kills per day" scoring input.
    pub recent_window_days: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            esi_base: DEFAULT_ESI_BASE.to_string(),
            zkill_proxy: "https://zkill-proxy.autumn-order.com/api/kills".to_string(),
            user_agent: format!("heimdall/{}", env!("CARGO_PKG_VERSION")),
            max_retries: MAX_RETRIES,
            short_ttl: Duration::from_secs(12 * 3600),
            long_ttl: Duration::from_secs(168 * 3600),
            feed_ttl: Duration::from_secs(3600),
            esi_max_concurrency: 10,
            esi_batch_delay: Duration::from_millis(50),
            org_info_concurrency: 8,
            killmail_batch_delay: Duration::from_millis(100),
            pow_difficulty: 12,
            zkill_timeout: Duration::from_secs(15),
            page_fetch_delay: Duration::from_millis(500),
            verify_after_pages: 3,
            seed_daily_rate: 14_000.0,
            recent_window_days: 30,
        }
    }
}

impl PipelineConfig {
    /// Config pointing both clients at a mock server, with delays shrunk
    /// so paginated tests finish quickly.
    pub fn for_tests(base_url: &str) -> Self {
        Self {
            esi_base: base_url.to_string(),
            zkill_proxy: format!("{base_url}/zkill"),
            max_retries: 0,
            page_fetch_delay: Duration::from_millis(1),
            esi_batch_delay: Duration::from_millis(1),
            killmail_batch_delay: Duration::from_millis(1),
            ..Self::default()
        }
    }
}
