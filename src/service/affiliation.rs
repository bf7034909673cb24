//! Character affiliation lookups.
//!
//! Maps character IDs to their corporation and optional alliance through
//! `POST /characters/affiliation/`, chunked at the endpoint limit, with
//! the same two-tier cache shape as the resolver. Affiliations drift as
//! players move corps, so the persistent tier uses the short TTL.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::config::{PipelineConfig, ESI_AFFILIATION_REQUEST_LIMIT};
use crate::data::affiliation::AffiliationRepository;
use crate::error::Error;
use crate::esi::EsiClient;
use crate::model::entity::Affiliation;
use crate::model::esi::CharacterAffiliationDto;
use crate::progress::ProgressReporter;
use crate::util::time::now_ms;
use crate::util::validate::sanitize_entity_ids;

pub struct AffiliationService {
    db: DatabaseConnection,
    esi: Arc<EsiClient>,
    config: Arc<PipelineConfig>,
    cache: Mutex<HashMap<i64, Affiliation>>,
}

impl AffiliationService {
    pub fn new(db: DatabaseConnection, esi: Arc<EsiClient>, config: Arc<PipelineConfig>) -> Self {
        Self {
            db,
            esi,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Affiliations for the given characters, keyed by character id.
    ///
    /// Characters the upstream does not know stay absent from the map;
    /// the result builder flags them rather than failing the batch.
    pub async fn get_affiliations(
        &self,
        character_ids: &[i64],
        reporter: &ProgressReporter,
    ) -> Result<HashMap<i64, Affiliation>, Error> {
        let ids = unique_ids(sanitize_entity_ids(character_ids.to_vec()));
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let total = ids.len();
        let mut found: HashMap<i64, Affiliation> = HashMap::new();

        {
            let cache = self.cache.lock().expect("affiliation cache lock poisoned");
            for id in &ids {
                if let Some(affiliation) = cache.get(id) {
                    found.insert(*id, *affiliation);
                }
            }
        }

        let mut misses: Vec<i64> = ids
            .iter()
            .filter(|id| !found.contains_key(*id))
            .copied()
            .collect();
        if !misses.is_empty() {
            match AffiliationRepository::new(&self.db)
                .get_fresh_many(&misses, self.config.short_ttl, now_ms())
                .await
            {
                Ok(rows) => {
                    for row in rows.into_iter().flatten() {
                        let affiliation = Affiliation {
                            character_id: row.character_id,
                            corporation_id: row.corporation_id,
                            alliance_id: row.alliance_id,
                        };
                        self.remember(affiliation);
                        found.insert(affiliation.character_id, affiliation);
                    }
                }
                Err(err) => reporter.warn(&format!("affiliation cache read failed: {err}")),
            }

            misses.retain(|id| !found.contains_key(id));
        }

        reporter.progress(found.len(), total, Some("loading affiliations"));

        if !misses.is_empty() {
            let fetched = self.fetch_missing(&misses).await?;

            if !fetched.is_empty() {
                self.persist(&fetched, reporter).await;
                for affiliation in fetched {
                    found.insert(affiliation.character_id, affiliation);
                }
            }

            reporter.progress(found.len(), total, Some("loading affiliations"));
        }

        Ok(found)
    }

    async fn fetch_missing(&self, misses: &[i64]) -> Result<Vec<Affiliation>, Error> {
        let mut fetched = Vec::new();

        for chunk in misses.chunks(ESI_AFFILIATION_REQUEST_LIMIT) {
            let response: Option<Vec<CharacterAffiliationDto>> =
                self.esi.post_json("characters/affiliation/", &chunk).await?;

            for dto in response.unwrap_or_default() {
                let affiliation = Affiliation {
                    character_id: dto.character_id,
                    corporation_id: dto.corporation_id,
                    alliance_id: dto.alliance_id,
                };
                self.remember(affiliation);
                fetched.push(affiliation);
            }
        }

        Ok(fetched)
    }

    async fn persist(&self, fetched: &[Affiliation], reporter: &ProgressReporter) {
        let result = async {
            let txn = self.db.begin().await?;
            AffiliationRepository::new(&txn)
                .upsert_many(fetched, now_ms())
                .await?;
            txn.commit().await
        }
        .await;

        if let Err(err) = result {
            reporter.warn(&format!("affiliation cache write failed: {err}"));
        }
    }

    fn remember(&self, affiliation: Affiliation) {
        self.cache
            .lock()
            .expect("affiliation cache lock poisoned")
            .insert(affiliation.character_id, affiliation);
    }
}

fn unique_ids(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
