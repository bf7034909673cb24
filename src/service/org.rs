//! Corporation and alliance info.
//!
//! Per-id GETs at bounded concurrency with two-tier caching. A missing or
//! failed corporation degrades to the `Unknown Corporation` sentinel so
//! downstream joins never fail; sentinels are returned but never cached,
//! so the next run retries upstream.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::config::PipelineConfig;
use crate::data::alliance::AllianceRepository;
use crate::data::corporation::CorporationRepository;
use crate::error::Error;
use crate::esi::{BatchOptions, EsiClient};
use crate::model::entity::{AllianceInfo, CorpInfo};
use crate::model::esi::{AllianceDto, CorporationDto};
use crate::progress::ProgressReporter;
use crate::util::time::now_ms;
use crate::util::validate::sanitize_entity_ids;

pub struct OrgInfoService {
    db: DatabaseConnection,
    esi: Arc<EsiClient>,
    config: Arc<PipelineConfig>,
    corporations: Mutex<HashMap<i64, CorpInfo>>,
    alliances: Mutex<HashMap<i64, AllianceInfo>>,
}

impl OrgInfoService {
    pub fn new(db: DatabaseConnection, esi: Arc<EsiClient>, config: Arc<PipelineConfig>) -> Self {
        Self {
            db,
            esi,
            config,
            corporations: Mutex::new(HashMap::new()),
            alliances: Mutex::new(HashMap::new()),
        }
    }

    /// Corporation info for every id, keyed by id. Every requested id is
    /// present in the result; failures carry the sentinel.
    pub async fn get_corporations(
        &self,
        corporation_ids: &[i64],
        reporter: &ProgressReporter,
    ) -> Result<HashMap<i64, CorpInfo>, Error> {
        let ids = unique_ids(sanitize_entity_ids(corporation_ids.to_vec()));
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut found: HashMap<i64, CorpInfo> = HashMap::new();

        {
            let cache = self.corporations.lock().expect("corp cache lock poisoned");
            for id in &ids {
                if let Some(info) = cache.get(id) {
                    found.insert(*id, info.clone());
                }
            }
        }

        let mut misses: Vec<i64> = ids
            .iter()
            .filter(|id| !found.contains_key(*id))
            .copied()
            .collect();
        if !misses.is_empty() {
            match CorporationRepository::new(&self.db)
                .get_fresh_many(&misses, self.config.long_ttl, self.config.short_ttl, now_ms())
                .await
            {
                Ok(rows) => {
                    for row in rows.into_iter().flatten() {
                        let info = CorpInfo {
                            corporation_id: row.corporation_id,
                            name: row.name,
                            war_eligible: row.war_eligible.unwrap_or(false),
                        };
                        self.corporations
                            .lock()
                            .expect("corp cache lock poisoned")
                            .insert(info.corporation_id, info.clone());
                        found.insert(info.corporation_id, info);
                    }
                }
                Err(err) => reporter.warn(&format!("corporation cache read failed: {err}")),
            }

            misses.retain(|id| !found.contains_key(id));
        }

        if !misses.is_empty() {
            let paths: Vec<String> = misses.iter().map(|id| format!("corporations/{id}/")).collect();
            let responses: Vec<Option<CorporationDto>> = self
                .esi
                .get_batch(
                    &paths,
                    &BatchOptions {
                        max_concurrency: self.config.org_info_concurrency,
                        chunk_delay: self.config.esi_batch_delay,
                        progress: None,
                    },
                )
                .await;

            let mut fetched = Vec::new();
            for (id, response) in misses.iter().zip(responses) {
                match response {
                    Some(dto) => {
                        let info = CorpInfo {
                            corporation_id: *id,
                            name: dto.name,
                            war_eligible: dto.war_eligible.unwrap_or(false),
                        };
                        fetched.push(info.clone());
                        found.insert(*id, info);
                    }
                    None => {
                        reporter.warn(&format!(
                            "corporation {id} could not be loaded, substituting placeholder"
                        ));
                        found.insert(*id, CorpInfo::unknown(*id));
                    }
                }
            }

            if !fetched.is_empty() {
                for info in &fetched {
                    self.corporations
                        .lock()
                        .expect("corp cache lock poisoned")
                        .insert(info.corporation_id, info.clone());
                }
                self.persist_corporations(&fetched, reporter).await;
            }
        }

        reporter.progress(found.len(), ids.len(), Some("loading corporations"));

        Ok(found)
    }

    /// Alliance info for every id that exists upstream, keyed by id.
    pub async fn get_alliances(
        &self,
        alliance_ids: &[i64],
        reporter: &ProgressReporter,
    ) -> Result<HashMap<i64, AllianceInfo>, Error> {
        let ids = unique_ids(sanitize_entity_ids(alliance_ids.to_vec()));
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut found: HashMap<i64, AllianceInfo> = HashMap::new();

        {
            let cache = self.alliances.lock().expect("alliance cache lock poisoned");
            for id in &ids {
                if let Some(info) = cache.get(id) {
                    found.insert(*id, info.clone());
                }
            }
        }

        let mut misses: Vec<i64> = ids
            .iter()
            .filter(|id| !found.contains_key(*id))
            .copied()
            .collect();
        if !misses.is_empty() {
            match AllianceRepository::new(&self.db)
                .get_fresh_many(&misses, self.config.long_ttl, now_ms())
                .await
            {
                Ok(rows) => {
                    for row in rows.into_iter().flatten() {
                        let info = AllianceInfo {
                            alliance_id: row.alliance_id,
                            name: row.name,
                        };
                        self.alliances
                            .lock()
                            .expect("alliance cache lock poisoned")
                            .insert(info.alliance_id, info.clone());
                        found.insert(info.alliance_id, info);
                    }
                }
                Err(err) => reporter.warn(&format!("alliance cache read failed: {err}")),
            }

            misses.retain(|id| !found.contains_key(id));
        }

        if !misses.is_empty() {
            let paths: Vec<String> = misses.iter().map(|id| format!("alliances/{id}/")).collect();
            let responses: Vec<Option<AllianceDto>> = self
                .esi
                .get_batch(
                    &paths,
                    &BatchOptions {
                        max_concurrency: self.config.org_info_concurrency,
                        chunk_delay: self.config.esi_batch_delay,
                        progress: None,
                    },
                )
                .await;

            let mut fetched = Vec::new();
            for (id, response) in misses.iter().zip(responses) {
                match response {
                    Some(dto) => {
                        let info = AllianceInfo {
                            alliance_id: *id,
                            name: dto.name,
                        };
                        fetched.push(info.clone());
                        found.insert(*id, info);
                    }
                    None => {
                        reporter.warn(&format!("alliance {id} could not be loaded"));
                    }
                }
            }

            if !fetched.is_empty() {
                for info in &fetched {
                    self.alliances
                        .lock()
                        .expect("alliance cache lock poisoned")
                        .insert(info.alliance_id, info.clone());
                }
                self.persist_alliances(&fetched, reporter).await;
            }
        }

        reporter.progress(found.len(), ids.len(), Some("loading alliances"));

        Ok(found)
    }

    async fn persist_corporations(&self, fetched: &[CorpInfo], reporter: &ProgressReporter) {
        let result = async {
            let txn = self.db.begin().await?;
            CorporationRepository::new(&txn)
                .upsert_many(fetched, now_ms())
                .await?;
            txn.commit().await
        }
        .await;

        if let Err(err) = result {
            reporter.warn(&format!("corporation cache write failed: {err}"));
        }
    }

    async fn persist_alliances(&self, fetched: &[AllianceInfo], reporter: &ProgressReporter) {
        let result = async {
            let txn = self.db.begin().await?;
            AllianceRepository::new(&txn)
                .upsert_many(fetched, now_ms())
                .await?;
            txn.commit().await
        }
        .await;

        if let Err(err) = result {
            reporter.warn(&format!("alliance cache write failed: {err}"));
        }
    }
}

fn unique_ids(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use heimdall_test_utils::setup::TestSetup;
    use serde_json::json;

    use super::*;

    fn service(test: &TestSetup) -> OrgInfoService {
        let config = Arc::new(PipelineConfig::for_tests(&test.server_url));
        let esi = Arc::new(
            EsiClient::new(&config.esi_base, &config.user_agent)
                .unwrap()
                .with_max_retries(0),
        );
        OrgInfoService::new(test.db.clone(), esi, config)
    }

    #[tokio::test]
    async fn corporation_info_round_trips_through_cache() {
        let mut test = TestSetup::new().await.unwrap();
        let mock = test
            .server
            .mock("GET", "/corporations/2001/")
            .with_status(200)
            .with_body(json!({"name": "Corp A", "war_eligible": true}).to_string())
            .expect(1)
            .create_async()
            .await;

        let orgs = service(&test);
        let first = orgs
            .get_corporations(&[2001], &ProgressReporter::noop())
            .await
            .unwrap();
        let second = orgs
            .get_corporations(&[2001], &ProgressReporter::noop())
            .await
            .unwrap();

        assert_eq!(first[&2001].name, "Corp A");
        assert!(first[&2001].war_eligible);
        assert_eq!(first, second);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_corporation_degrades_to_placeholder() {
        let mut test = TestSetup::new().await.unwrap();
        test.server
            .mock("GET", "/corporations/2001/")
            .with_status(404)
            .create_async()
            .await;

        let orgs = service(&test);
        let result = orgs
            .get_corporations(&[2001], &ProgressReporter::noop())
            .await
            .unwrap();

        assert_eq!(result[&2001].name, "Unknown Corporation");
        assert!(!result[&2001].war_eligible);
    }

    #[tokio::test]
    async fn failed_corporation_is_not_cached() {
        let mut test = TestSetup::new().await.unwrap();
        let mock = test
            .server
            .mock("GET", "/corporations/2001/")
            .with_status(500)
            .expect(2)
            .create_async()
            .await;

        let orgs = service(&test);
        let first = orgs
            .get_corporations(&[2001], &ProgressReporter::noop())
            .await
            .unwrap();
        let second = orgs
            .get_corporations(&[2001], &ProgressReporter::noop())
            .await
            .unwrap();

        // Both calls degrade to the sentinel and both hit upstream.
        assert_eq!(first[&2001].name, "Unknown Corporation");
        assert_eq!(second[&2001].name, "Unknown Corporation");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn alliance_info_is_fetched_and_cached() {
        let mut test = TestSetup::new().await.unwrap();
        let mock = test
            .server
            .mock("GET", "/alliances/99000001/")
            .with_status(200)
            .with_body(json!({"name": "Alliance C"}).to_string())
            .expect(1)
            .create_async()
            .await;

        let orgs = service(&test);
        let first = orgs
            .get_alliances(&[99000001], &ProgressReporter::noop())
            .await
            .unwrap();
        let second = orgs
            .get_alliances(&[99000001], &ProgressReporter::noop())
            .await
            .unwrap();

        assert_eq!(first[&99000001].name, "Alliance C");
        assert_eq!(first, second);
        mock.assert_async().await;
    }
}
