//! Batch killmail fetching with cache lookahead.
//!
//! All requested ids are checked against the body cache in one read;
//! only the misses go upstream, chunked at the concurrency bound. A
//! missing or unprocessable killmail (`404`/`422`) is skipped, never
//! fatal. Streaming callers receive each result the moment it exists.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::warn;

use crate::config::PipelineConfig;
use crate::data::killmail::KillmailRepository;
use crate::error::esi::EsiError;
use crate::error::Error;
use crate::esi::EsiClient;
use crate::model::killmail::{FetchedKillmail, KillRef, KillmailFull};
use crate::progress::ProgressSink;
use crate::util::time::now_ms;

/// Streaming sink receiving each fetched killmail as it completes.
pub type KillmailSink = Arc<dyn Fn(&FetchedKillmail) + Send + Sync>;

pub struct KillmailFetchOptions {
    pub max_concurrency: usize,
    pub batch_delay: Duration,
    /// Upper bound on bodies fetched; the kill list is truncated to this.
    pub max_killmails: usize,
    pub on_result: Option<KillmailSink>,
    pub progress: Option<ProgressSink>,
}

impl Default for KillmailFetchOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            batch_delay: Duration::from_millis(100),
            max_killmails: 100,
            on_result: None,
            progress: None,
        }
    }
}

pub struct KillmailService {
    db: DatabaseConnection,
    esi: Arc<EsiClient>,
    config: Arc<PipelineConfig>,
}

impl KillmailService {
    pub fn new(db: DatabaseConnection, esi: Arc<EsiClient>, config: Arc<PipelineConfig>) -> Self {
        Self { db, esi, config }
    }

    /// Fetches full bodies for `kills`, cache first. The result order is
    /// unspecified; cached bodies surface before upstream ones.
    pub async fn fetch_killmails(
        &self,
        kills: &[KillRef],
        options: &KillmailFetchOptions,
    ) -> Result<Vec<FetchedKillmail>, Error> {
        let kills: Vec<&KillRef> = kills.iter().take(options.max_killmails).collect();
        if kills.is_empty() {
            return Ok(Vec::new());
        }

        let total = kills.len();
        let ids: Vec<i64> = kills.iter().map(|k| k.killmail_id).collect();
        let mut cached = KillmailRepository::new(&self.db)
            .get_fresh_many(&ids, self.config.long_ttl, now_ms())
            .await
            .unwrap_or_else(|err| {
                warn!("killmail cache read failed, fetching everything: {err}");
                HashMap::new()
            });

        let mut results = Vec::with_capacity(total);
        let mut misses = Vec::new();

        for kill in kills {
            match cached.remove(&kill.killmail_id) {
                Some(body) => {
                    let result = FetchedKillmail {
                        killmail_id: kill.killmail_id,
                        hash: kill.zkb.hash.clone(),
                        zkb: kill.zkb.clone(),
                        killmail: body,
                    };
                    if let Some(sink) = &options.on_result {
                        sink(&result);
                    }
                    results.push(result);
                }
                None => misses.push(kill),
            }
        }

        if let Some(progress) = &options.progress {
            progress(results.len(), total, Some("loading killmails"));
        }

        if misses.is_empty() {
            return Ok(results);
        }

        let mut fetched = Vec::new();
        let mut completed = results.len();

        for chunk in misses.chunks(options.max_concurrency.max(1)) {
            let bodies = futures::future::join_all(chunk.iter().map(|kill| {
                let path = format!("killmails/{}/{}/", kill.killmail_id, kill.zkb.hash);
                async move { self.esi.get_json::<KillmailFull>(&path).await }
            }))
            .await;

            for (kill, body) in chunk.iter().zip(bodies) {
                completed += 1;
                match body {
                    Ok(Some(killmail)) => {
                        let result = FetchedKillmail {
                            killmail_id: kill.killmail_id,
                            hash: kill.zkb.hash.clone(),
                            zkb: kill.zkb.clone(),
                            killmail,
                        };
                        if let Some(sink) = &options.on_result {
                            sink(&result);
                        }
                        fetched.push(result);
                    }
                    // Purged or unprocessable killmails are skipped.
                    Ok(None) => {}
                    Err(EsiError::Unexpected { status: 422 }) => {}
                    Err(err) => {
                        warn!(
                            killmail_id = kill.killmail_id,
                            "killmail fetch failed, skipping: {err}"
                        );
                    }
                }
            }

            if let Some(progress) = &options.progress {
                progress(completed, total, Some("loading killmails"));
            }

            if completed < total && !options.batch_delay.is_zero() {
                tokio::time::sleep(options.batch_delay).await;
            }
        }

        self.persist(&fetched).await;
        results.extend(fetched);

        Ok(results)
    }

    async fn persist(&self, fetched: &[FetchedKillmail]) {
        if fetched.is_empty() {
            return;
        }

        let rows: Vec<(i64, String, KillmailFull)> = fetched
            .iter()
            .map(|f| (f.killmail_id, f.hash.clone(), f.killmail.clone()))
            .collect();

        let result = async {
            let txn = self.db.begin().await?;
            KillmailRepository::new(&txn)
                .upsert_many(&rows, now_ms())
                .await?;
            txn.commit().await
        }
        .await;

        if let Err(err) = result {
            warn!("killmail cache write failed: {err}");
        }
    }
}

/// Timestamp lookups the kill feed paginator needs during verification.
///
/// An explicit seam rather than a direct call so the paginator can be
/// tested against synthetic clocks.
#[async_trait::async_trait]
pub trait KillmailTimeSource: Send + Sync {
    async fn killmail_time(&self, killmail_id: i64, hash: &str) -> Result<DateTime<Utc>, Error>;
}

#[async_trait::async_trait]
impl KillmailTimeSource for KillmailService {
    async fn killmail_time(&self, killmail_id: i64, hash: &str) -> Result<DateTime<Utc>, Error> {
        if let Ok(cached) = KillmailRepository::new(&self.db)
            .get_fresh_many(&[killmail_id], self.config.long_ttl, now_ms())
            .await
        {
            if let Some(body) = cached.get(&killmail_id) {
                return Ok(body.killmail_time);
            }
        }

        let body: Option<KillmailFull> = self
            .esi
            .get_json(&format!("killmails/{killmail_id}/{hash}/"))
            .await?;
        let body = body.ok_or_else(|| {
            Error::InternalError(format!(
                "killmail {killmail_id} vanished between feed and verification"
            ))
        })?;

        let rows = vec![(killmail_id, hash.to_string(), body.clone())];
        if let Err(err) = KillmailRepository::new(&self.db).upsert_many(&rows, now_ms()).await {
            warn!(killmail_id, "killmail cache write failed: {err}");
        }

        Ok(body.killmail_time)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use heimdall_test_utils::fixtures::killmail::killmail_json;
    use heimdall_test_utils::setup::TestSetup;

    use crate::util::test::kill_ref;

    use super::*;

    fn service(test: &TestSetup) -> KillmailService {
        let config = Arc::new(PipelineConfig::for_tests(&test.server_url));
        let esi = Arc::new(
            EsiClient::new(&config.esi_base, &config.user_agent)
                .unwrap()
                .with_max_retries(0),
        );
        KillmailService::new(test.db.clone(), esi, config)
    }

    fn options() -> KillmailFetchOptions {
        KillmailFetchOptions {
            batch_delay: Duration::from_millis(1),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fetches_persists_and_reuses_bodies() {
        let mut test = TestSetup::new().await.unwrap();
        let mock = test
            .server
            .mock("GET", "/killmails/9100/abc/")
            .with_status(200)
            .with_body(killmail_json(9100, "2026-08-01T12:00:00Z", 30000142, 1001, 3).to_string())
            .expect(1)
            .create_async()
            .await;

        let kills = vec![kill_ref(9100, "abc", 150_000_000.0)];
        let killmails = service(&test);

        let first = killmails.fetch_killmails(&kills, &options()).await.unwrap();
        // Second call is served from the cache: the mock expects one hit.
        let second = killmails.fetch_killmails(&kills, &options()).await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].killmail.solar_system_id, 30000142);
        assert_eq!(first, second);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_killmail_is_skipped() {
        let mut test = TestSetup::new().await.unwrap();
        test.server
            .mock("GET", "/killmails/9100/abc/")
            .with_status(404)
            .create_async()
            .await;
        test.server
            .mock("GET", "/killmails/9101/def/")
            .with_status(200)
            .with_body(killmail_json(9101, "2026-08-01T13:00:00Z", 30000142, 1001, 1).to_string())
            .create_async()
            .await;

        let kills = vec![
            kill_ref(9100, "abc", 1000.0),
            kill_ref(9101, "def", 2000.0),
        ];
        let result = service(&test)
            .fetch_killmails(&kills, &options())
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].killmail_id, 9101);
    }

    #[tokio::test]
    async fn truncates_to_max_killmails() {
        let mut test = TestSetup::new().await.unwrap();
        test.server
            .mock("GET", "/killmails/9100/abc/")
            .with_status(200)
            .with_body(killmail_json(9100, "2026-08-01T12:00:00Z", 30000142, 1001, 1).to_string())
            .expect(1)
            .create_async()
            .await;

        let kills = vec![
            kill_ref(9100, "abc", 1000.0),
            kill_ref(9101, "def", 2000.0),
        ];
        let result = service(&test)
            .fetch_killmails(
                &kills,
                &KillmailFetchOptions {
                    max_killmails: 1,
                    batch_delay: Duration::from_millis(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].killmail_id, 9100);
    }

    #[tokio::test]
    async fn streaming_sink_sees_every_result() {
        let mut test = TestSetup::new().await.unwrap();
        test.server
            .mock("GET", "/killmails/9100/abc/")
            .with_status(200)
            .with_body(killmail_json(9100, "2026-08-01T12:00:00Z", 30000142, 1001, 1).to_string())
            .create_async()
            .await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut opts = options();
        opts.on_result = Some(Arc::new(move |result: &FetchedKillmail| {
            sink.lock().unwrap().push(result.killmail_id);
        }));

        let kills = vec![kill_ref(9100, "abc", 1000.0)];
        service(&test).fetch_killmails(&kills, &opts).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![9100]);
    }

    #[tokio::test]
    async fn time_source_prefers_cache() {
        let mut test = TestSetup::new().await.unwrap();
        let mock = test
            .server
            .mock("GET", "/killmails/9100/abc/")
            .with_status(200)
            .with_body(killmail_json(9100, "2026-08-01T12:00:00Z", 30000142, 1001, 1).to_string())
            .expect(1)
            .create_async()
            .await;

        let killmails = service(&test);
        let first = killmails.killmail_time(9100, "abc").await.unwrap();
        let second = killmails.killmail_time(9100, "abc").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.to_rfc3339(), "2026-08-01T12:00:00+00:00");
        mock.assert_async().await;
    }
}
