//! Mock endpoints for the zKill proxy.

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::Value;

/// Mounts one feed page at `/zkill`, matched on the `kills`, `id`, and
/// `page` query parameters (the proof-of-work parameters are ignored).
/// The mock expects exactly one hit.
pub async fn mock_kills_page(
    server: &mut ServerGuard,
    kind: &str,
    id: i64,
    page: u32,
    kills: Value,
) -> Mock {
    server
        .mock("GET", "/zkill")
        .match_query(Matcher::Regex(format!("kills={kind}&id={id}&page={page}&")))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(kills.to_string())
        .expect(1)
        .create_async()
        .await
}
