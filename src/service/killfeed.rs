//! Paginated kill feed retrieval.
//!
//! Feeds are expensive: each page costs a proof-of-work token and the
//! heuristics are order-sensitive, so concurrent interest in the same
//! `(kind, id)` is collapsed into one owning fetch. The owner publishes
//! every page to a subscriber list as it arrives; late joiners get the
//! earlier pages replayed, and everyone resolves with the same final
//! aggregate.
//!
//! Pagination stops when the feed covers the configured timespan. Page
//! data only carries monotonic killmail ids, so the covered span is
//! estimated from the id range and a kills-per-day rate; once the
//! estimate crosses the target, the real timestamps of the oldest and
//! newest kills are fetched and either confirm termination or correct
//! the rate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sea_orm::DatabaseConnection;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::data::kill_feed::KillFeedRepository;
use crate::error::zkill::ZkillError;
use crate::model::entity::EntityKind;
use crate::model::killmail::KillRef;
use crate::progress::ProgressSink;
use crate::service::killmail::KillmailTimeSource;
use crate::service::settings::SettingsService;
use crate::util::time::now_ms;
use crate::zkill::ZkillClient;

/// Page callback: `(page_kills, from_cache)`.
pub type PageSink = Arc<dyn Fn(&[KillRef], bool) + Send + Sync>;

/// One caller's interest in a feed.
#[derive(Clone, Default)]
pub struct FeedSubscription {
    pub on_page: Option<PageSink>,
    pub on_progress: Option<ProgressSink>,
    /// Caller-side bound on the kill list; `None` means unbounded.
    pub max_kills: Option<usize>,
}

type FeedResult = Result<Vec<KillRef>, ZkillError>;

struct Subscriber {
    on_page: Option<PageSink>,
    on_progress: Option<ProgressSink>,
    max_kills: Option<usize>,
    done: oneshot::Sender<FeedResult>,
}

#[derive(Default)]
struct FeedState {
    subscribers: Vec<Subscriber>,
    /// Pages broadcast so far, replayed to late joiners.
    pages: Vec<Vec<KillRef>>,
    finished: Option<FeedResult>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct FeedKey {
    kind: EntityKind,
    id: i64,
}

enum Joined {
    Pending(oneshot::Receiver<FeedResult>),
    Done(FeedResult),
}

enum FeedEntry {
    /// Another caller owns the fetch; this caller subscribed to it.
    Join(Joined),
    /// This caller owns the fetch.
    Own(Arc<Mutex<FeedState>>),
}

pub struct KillFeedService {
    db: DatabaseConnection,
    zkill: Arc<ZkillClient>,
    times: Arc<dyn KillmailTimeSource>,
    settings: Arc<SettingsService>,
    config: Arc<PipelineConfig>,
    inflight: Mutex<HashMap<FeedKey, Arc<Mutex<FeedState>>>>,
}

impl KillFeedService {
    pub fn new(
        db: DatabaseConnection,
        zkill: Arc<ZkillClient>,
        times: Arc<dyn KillmailTimeSource>,
        settings: Arc<SettingsService>,
        config: Arc<PipelineConfig>,
    ) -> Self {
        Self {
            db,
            zkill,
            times,
            settings,
            config,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Streams an entity's kill feed to the subscription and resolves
    /// with the aggregate list.
    ///
    /// Within one subscription, `on_page` calls arrive in page order.
    /// Rate-limit and server errors propagate as-is; everything else is
    /// wrapped as a feed error carrying `(kind, id)`.
    pub async fn entity_kills_streaming(
        &self,
        kind: EntityKind,
        id: i64,
        subscription: FeedSubscription,
    ) -> Result<Vec<KillRef>, ZkillError> {
        match KillFeedRepository::new(&self.db)
            .get_fresh(kind, id, self.config.feed_ttl, now_ms())
            .await
        {
            Ok(Some(mut kills)) => {
                if let Some(limit) = subscription.max_kills {
                    kills.truncate(limit);
                }
                if let Some(on_page) = &subscription.on_page {
                    on_page(&kills, true);
                }
                return Ok(kills);
            }
            Ok(None) => {}
            Err(err) => warn!(%kind, id, "feed cache read failed, fetching: {err}"),
        }

        let key = FeedKey { kind, id };

        // Join an in-flight fetch or become its owner; one lock scope so
        // the decision is atomic.
        let entry = {
            let mut inflight = self.inflight.lock().expect("inflight lock poisoned");
            match inflight.get(&key) {
                Some(state) => FeedEntry::Join(register(state, &subscription)),
                None => {
                    let state = Arc::new(Mutex::new(FeedState::default()));
                    inflight.insert(key, state.clone());
                    FeedEntry::Own(state)
                }
            }
        };

        let state = match entry {
            FeedEntry::Join(Joined::Done(result)) => {
                return truncated(result, subscription.max_kills);
            }
            FeedEntry::Join(Joined::Pending(rx)) => {
                let result = rx.await.unwrap_or_else(|_| {
                    Err(feed_error(kind, id, "feed owner dropped before resolving"))
                });
                return truncated(result, subscription.max_kills);
            }
            FeedEntry::Own(state) => state,
        };

        let result = self.paginate(kind, id, &subscription, &state).await;

        if let Ok(kills) = &result {
            self.persist(kind, id, kills, &subscription, &state).await;
        }

        // Resolve everyone, then retire the in-flight entry. A caller
        // arriving in between sees the finished state and resolves
        // immediately; one arriving after becomes a fresh owner against a
        // warm cache.
        {
            let mut feed = state.lock().expect("feed state lock poisoned");
            feed.finished = Some(result.clone());
            for subscriber in feed.subscribers.drain(..) {
                let _ = subscriber
                    .done
                    .send(truncated(result.clone(), subscriber.max_kills));
            }
        }
        self.inflight
            .lock()
            .expect("inflight lock poisoned")
            .remove(&key);

        truncated(result, subscription.max_kills)
    }

    async fn paginate(
        &self,
        kind: EntityKind,
        id: i64,
        leader: &FeedSubscription,
        state: &Arc<Mutex<FeedState>>,
    ) -> FeedResult {
        let settings = self
            .settings
            .get_settings()
            .await
            .map_err(|err| feed_error(kind, id, &format!("settings unavailable: {err}")))?;

        let min_killmails = settings.min_killmails as usize;
        let target_days = settings.target_days as f64;
        let max_pages = settings.max_pages as u32;

        let mut all_kills: Vec<KillRef> = Vec::new();
        let mut page: u32 = 1;
        let mut daily_rate = self.config.seed_daily_rate;
        let mut last_verified_page: u32 = 0;

        loop {
            if let Some(limit) = self.effective_limit(leader, state) {
                if all_kills.len() >= limit {
                    break;
                }
            }
            if page > max_pages {
                break;
            }

            let page_kills = self.zkill.kills_page(kind, id, page).await?;
            if page_kills.is_empty() {
                break;
            }

            all_kills.extend(page_kills.iter().cloned());
            self.broadcast_page(leader, state, &page_kills);

            let newest = all_kills.iter().map(|k| k.killmail_id).max().unwrap_or(0);
            let oldest = all_kills.iter().map(|k| k.killmail_id).min().unwrap_or(0);
            let span = (newest - oldest).max(0) as f64;
            let estimated_days = if daily_rate > 0.0 { span / daily_rate } else { 0.0 };

            self.broadcast_progress(leader, state, all_kills.len(), min_killmails, page);
            debug!(%kind, id, page, kills = all_kills.len(), estimated_days, "feed page appended");

            let verify_due = all_kills.len() >= min_killmails
                && estimated_days >= target_days
                && (page - last_verified_page >= self.config.verify_after_pages
                    || estimated_days >= 1.2 * target_days);

            if verify_due {
                let actual_days = self.verify_span(kind, id, &all_kills).await?;
                if actual_days >= target_days {
                    debug!(%kind, id, actual_days, "feed timespan confirmed, stopping");
                    break;
                }
                if actual_days > 0.0 {
                    daily_rate = span / actual_days;
                }
                last_verified_page = page;
            }

            tokio::time::sleep(self.config.page_fetch_delay).await;
            page += 1;
        }

        Ok(all_kills)
    }

    /// Resolves the real timestamps of the oldest and newest kills and
    /// returns the actual covered span in days.
    async fn verify_span(
        &self,
        kind: EntityKind,
        id: i64,
        all_kills: &[KillRef],
    ) -> Result<f64, ZkillError> {
        let oldest = all_kills
            .iter()
            .min_by_key(|k| k.killmail_id)
            .ok_or_else(|| feed_error(kind, id, "verification on an empty feed"))?;
        let newest = all_kills
            .iter()
            .max_by_key(|k| k.killmail_id)
            .ok_or_else(|| feed_error(kind, id, "verification on an empty feed"))?;

        let newest_time = self
            .times
            .killmail_time(newest.killmail_id, &newest.zkb.hash)
            .await
            .map_err(|err| feed_error(kind, id, &format!("verification failed: {err}")))?;
        let oldest_time = self
            .times
            .killmail_time(oldest.killmail_id, &oldest.zkb.hash)
            .await
            .map_err(|err| feed_error(kind, id, &format!("verification failed: {err}")))?;

        Ok((newest_time - oldest_time).num_seconds() as f64 / 86_400.0)
    }

    /// Persists the aggregate, truncated to the largest live limit.
    async fn persist(
        &self,
        kind: EntityKind,
        id: i64,
        kills: &[KillRef],
        leader: &FeedSubscription,
        state: &Arc<Mutex<FeedState>>,
    ) {
        let mut to_store = kills.to_vec();
        if let Some(limit) = self.effective_limit(leader, state) {
            to_store.truncate(limit);
        }

        if let Err(err) = KillFeedRepository::new(&self.db)
            .put(kind, id, &to_store, now_ms())
            .await
        {
            warn!(%kind, id, "feed cache write failed: {err}");
        }
    }

    /// Largest kill bound across the owner and all subscribers, `None`
    /// when any party wants the whole feed.
    fn effective_limit(
        &self,
        leader: &FeedSubscription,
        state: &Arc<Mutex<FeedState>>,
    ) -> Option<usize> {
        let mut limit = leader.max_kills?;

        let feed = state.lock().expect("feed state lock poisoned");
        for subscriber in &feed.subscribers {
            match subscriber.max_kills {
                Some(other) => limit = limit.max(other),
                None => return None,
            }
        }

        Some(limit)
    }

    fn broadcast_page(
        &self,
        leader: &FeedSubscription,
        state: &Arc<Mutex<FeedState>>,
        page_kills: &[KillRef],
    ) {
        if let Some(on_page) = &leader.on_page {
            on_page(page_kills, false);
        }

        let mut feed = state.lock().expect("feed state lock poisoned");
        feed.pages.push(page_kills.to_vec());
        for subscriber in &feed.subscribers {
            if let Some(on_page) = &subscriber.on_page {
                on_page(page_kills, false);
            }
        }
    }

    fn broadcast_progress(
        &self,
        leader: &FeedSubscription,
        state: &Arc<Mutex<FeedState>>,
        kills: usize,
        min_killmails: usize,
        page: u32,
    ) {
        let stage = format!("page {page}");

        if let Some(on_progress) = &leader.on_progress {
            on_progress(kills, min_killmails.max(kills), Some(&stage));
        }

        let feed = state.lock().expect("feed state lock poisoned");
        for subscriber in &feed.subscribers {
            if let Some(on_progress) = &subscriber.on_progress {
                on_progress(kills, min_killmails.max(kills), Some(&stage));
            }
        }
    }
}

/// Registers a subscription on an in-flight feed, replaying pages seen so
/// far so every subscriber observes every page.
fn register(state: &Arc<Mutex<FeedState>>, subscription: &FeedSubscription) -> Joined {
    let mut feed = state.lock().expect("feed state lock poisoned");

    if let Some(on_page) = &subscription.on_page {
        for page in &feed.pages {
            on_page(page, false);
        }
    }

    if let Some(result) = &feed.finished {
        return Joined::Done(result.clone());
    }

    let (tx, rx) = oneshot::channel();
    feed.subscribers.push(Subscriber {
        on_page: subscription.on_page.clone(),
        on_progress: subscription.on_progress.clone(),
        max_kills: subscription.max_kills,
        done: tx,
    });

    Joined::Pending(rx)
}

fn truncated(result: FeedResult, max_kills: Option<usize>) -> FeedResult {
    result.map(|mut kills| {
        if let Some(limit) = max_kills {
            kills.truncate(limit);
        }
        kills
    })
}

fn feed_error(kind: EntityKind, id: i64, message: &str) -> ZkillError {
    ZkillError::Feed {
        kind,
        id,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
    use heimdall_test_utils::fixtures::zkill::mock_kills_page;
    use heimdall_test_utils::setup::TestSetup;

    use crate::error::Error;
    use crate::util::test::{kill_ref, page_body};

    use super::*;

    /// Time source answering from a fixed table; pagination tests drive
    /// convergence without touching ESI.
    struct FixedTimes {
        times: HashMap<i64, DateTime<Utc>>,
    }

    #[async_trait]
    impl KillmailTimeSource for FixedTimes {
        async fn killmail_time(&self, killmail_id: i64, _hash: &str) -> Result<DateTime<Utc>, Error> {
            self.times.get(&killmail_id).copied().ok_or_else(|| {
                Error::InternalError(format!("no fixed time for killmail {killmail_id}"))
            })
        }
    }

    fn service_with_times(test: &TestSetup, times: HashMap<i64, DateTime<Utc>>) -> KillFeedService {
        let mut config = PipelineConfig::for_tests(&test.server_url);
        config.pow_difficulty = 0;
        let config = Arc::new(config);
        let zkill = Arc::new(ZkillClient::new(&config).unwrap().with_max_retries(0));
        KillFeedService::new(
            test.db.clone(),
            zkill,
            Arc::new(FixedTimes { times }),
            Arc::new(SettingsService::new(test.db.clone())),
            config,
        )
    }

    fn page_refs(newest_id: i64, count: usize, step: i64) -> Vec<KillRef> {
        (0..count)
            .map(|i| kill_ref(newest_id - i as i64 * step, &format!("h{i}"), 1_000_000.0))
            .collect()
    }

    fn page_sink() -> (Arc<Mutex<Vec<(usize, bool)>>>, PageSink) {
        let seen: Arc<Mutex<Vec<(usize, bool)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let on_page: PageSink = Arc::new(move |kills: &[KillRef], from_cache: bool| {
            sink.lock().unwrap().push((kills.len(), from_cache));
        });
        (seen, on_page)
    }

    #[tokio::test]
    async fn empty_first_page_terminates_immediately() {
        let mut test = TestSetup::new().await.unwrap();
        let mock = mock_kills_page(&mut test.server, "character", 1001, 1, page_body(&[])).await;

        let feed = service_with_times(&test, HashMap::new());
        let kills = feed
            .entity_kills_streaming(EntityKind::Character, 1001, FeedSubscription::default())
            .await
            .unwrap();

        assert!(kills.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn pagination_stops_on_empty_page_and_persists() {
        let mut test = TestSetup::new().await.unwrap();
        let page1 = page_refs(10_000, 50, 10);
        let page2 = page_refs(9_400, 50, 10);
        mock_kills_page(&mut test.server, "character", 1001, 1, page_body(&page1)).await;
        mock_kills_page(&mut test.server, "character", 1001, 2, page_body(&page2)).await;
        mock_kills_page(&mut test.server, "character", 1001, 3, page_body(&[])).await;

        let (seen, on_page) = page_sink();
        let feed = service_with_times(&test, HashMap::new());
        let kills = feed
            .entity_kills_streaming(
                EntityKind::Character,
                1001,
                FeedSubscription {
                    on_page: Some(on_page),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(kills.len(), 100);
        assert_eq!(*seen.lock().unwrap(), vec![(50, false), (50, false)]);

        // A follow-up call is served from the cache with the flag set.
        let (seen_cached, on_page_cached) = page_sink();
        let cached = feed
            .entity_kills_streaming(
                EntityKind::Character,
                1001,
                FeedSubscription {
                    on_page: Some(on_page_cached),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(cached, kills);
        assert_eq!(*seen_cached.lock().unwrap(), vec![(100, true)]);
    }

    #[tokio::test]
    async fn converges_once_verification_confirms_the_timespan() {
        let mut test = TestSetup::new().await.unwrap();
        // Page ids are tuned so the estimate crosses the 30 day target
        // at page 2 (first verification: only 10 real days, rate is
        // corrected) and again at page 3 (31 real days, stop).
        let page1 = page_refs(10_000_000, 50, 100);
        let page2 = page_refs(9_500_000, 49, 100);
        let mut page2_full = page2.clone();
        page2_full.push(kill_ref(9_400_000, "old2", 1_000_000.0));
        let page3 = page_refs(8_000_000, 49, 100);
        let mut page3_full = page3.clone();
        page3_full.push(kill_ref(7_000_000, "old3", 1_000_000.0));

        let p1 = mock_kills_page(&mut test.server, "character", 1001, 1, page_body(&page1)).await;
        let p2 = mock_kills_page(&mut test.server, "character", 1001, 2, page_body(&page2_full)).await;
        let p3 = mock_kills_page(&mut test.server, "character", 1001, 3, page_body(&page3_full)).await;

        let newest = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        let times = HashMap::from([
            (10_000_000, newest),
            (9_400_000, newest - ChronoDuration::days(10)),
            (7_000_000, newest - ChronoDuration::days(31)),
        ]);

        let (seen, on_page) = page_sink();
        let feed = service_with_times(&test, times);
        let kills = feed
            .entity_kills_streaming(
                EntityKind::Character,
                1001,
                FeedSubscription {
                    on_page: Some(on_page),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(kills.len(), 150);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(50, false), (50, false), (50, false)]
        );
        p1.assert_async().await;
        p2.assert_async().await;
        p3.assert_async().await;
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_pagination() {
        let mut test = TestSetup::new().await.unwrap();
        let page1 = page_refs(10_000, 50, 10);
        let p1 = mock_kills_page(&mut test.server, "character", 1001, 1, page_body(&page1)).await;
        let p2 = mock_kills_page(&mut test.server, "character", 1001, 2, page_body(&[])).await;

        let feed = Arc::new(service_with_times(&test, HashMap::new()));

        let (seen_a, on_page_a) = page_sink();
        let (seen_b, on_page_b) = page_sink();

        let (a, b) = tokio::join!(
            feed.entity_kills_streaming(
                EntityKind::Character,
                1001,
                FeedSubscription {
                    on_page: Some(on_page_a),
                    ..Default::default()
                },
            ),
            feed.entity_kills_streaming(
                EntityKind::Character,
                1001,
                FeedSubscription {
                    on_page: Some(on_page_b),
                    ..Default::default()
                },
            ),
        );

        let a = a.unwrap();
        let b = b.unwrap();

        assert_eq!(a, b);
        assert_eq!(*seen_a.lock().unwrap(), vec![(50, false)]);
        assert_eq!(*seen_b.lock().unwrap(), vec![(50, false)]);
        // The page mocks expect exactly one hit each.
        p1.assert_async().await;
        p2.assert_async().await;
    }

    #[tokio::test]
    async fn max_kills_bounds_pagination_and_cache() {
        let mut test = TestSetup::new().await.unwrap();
        let page1 = page_refs(10_000, 50, 10);
        let page2 = page_refs(9_400, 50, 10);
        mock_kills_page(&mut test.server, "character", 1001, 1, page_body(&page1)).await;
        mock_kills_page(&mut test.server, "character", 1001, 2, page_body(&page2)).await;

        let feed = service_with_times(&test, HashMap::new());
        let kills = feed
            .entity_kills_streaming(
                EntityKind::Character,
                1001,
                FeedSubscription {
                    max_kills: Some(60),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(kills.len(), 60);

        // The cached list is the truncated aggregate.
        let cached = KillFeedRepository::new(&test.db)
            .get_fresh(EntityKind::Character, 1001, std::time::Duration::from_secs(3600), now_ms())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cached.len(), 60);
        assert_eq!(cached, kills);
    }

    #[tokio::test]
    async fn rate_limit_errors_propagate_unwrapped() {
        let mut test = TestSetup::new().await.unwrap();
        test.server
            .mock("GET", "/zkill")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .with_header("retry-after", "7")
            .create_async()
            .await;

        let feed = service_with_times(&test, HashMap::new());
        let result = feed
            .entity_kills_streaming(EntityKind::Character, 1001, FeedSubscription::default())
            .await;

        assert_eq!(
            result,
            Err(ZkillError::RateLimited {
                retry_after_secs: 7
            })
        );

        // The in-flight entry is gone: the next call starts a fresh fetch
        // rather than joining a dead one.
        let result = feed
            .entity_kills_streaming(EntityKind::Character, 1001, FeedSubscription::default())
            .await;
        assert!(result.is_err());
    }
}
