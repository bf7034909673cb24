//! Name resolution.
//!
//! Maps a heterogeneous list of names to typed `{id, name, kind}` records
//! through the batch `POST /universe/ids/` endpoint, with an in-process
//! map in front of the persistent cache. Unresolvable names are reported
//! and preserved in the `missing` list; they never abort the batch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::config::{PipelineConfig, ESI_IDS_REQUEST_LIMIT};
use crate::data::character_name::CharacterNameRepository;
use crate::data::entity_name::EntityNameRepository;
use crate::error::Error;
use crate::esi::EsiClient;
use crate::model::entity::{EntityKind, ResolvedEntity, ResolvedNames};
use crate::model::esi::UniverseIdsResponse;
use crate::progress::ProgressReporter;
use crate::util::time::now_ms;
use crate::util::validate::is_valid_entity_name;

pub struct ResolverService {
    db: DatabaseConnection,
    esi: Arc<EsiClient>,
    config: Arc<PipelineConfig>,
    /// In-process tier, keyed by lowercased name.
    names: Mutex<HashMap<String, ResolvedEntity>>,
    character_names: Mutex<HashMap<i64, String>>,
}

impl ResolverService {
    pub fn new(db: DatabaseConnection, esi: Arc<EsiClient>, config: Arc<PipelineConfig>) -> Self {
        Self {
            db,
            esi,
            config,
            names: Mutex::new(HashMap::new()),
            character_names: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves a list of raw name queries.
    ///
    /// Queries are validated and deduplicated case-insensitively before
    /// any lookup. Each miss tier is consulted in order: the in-process
    /// map, the persistent cache, then ESI in chunks of 100.
    pub async fn resolve_names(
        &self,
        names: &[String],
        reporter: &ProgressReporter,
    ) -> Result<ResolvedNames, Error> {
        let queries = self.validated_queries(names, reporter);
        if queries.is_empty() {
            return Ok(ResolvedNames::default());
        }

        let total = queries.len();
        let mut resolved: HashMap<String, ResolvedEntity> = HashMap::new();

        // Tier 1: process-memory map.
        {
            let cache = self.names.lock().expect("resolver cache lock poisoned");
            for key in &queries {
                if let Some(entry) = cache.get(key) {
                    resolved.insert(key.clone(), entry.clone());
                }
            }
        }

        // Tier 2: persistent cache. A failed read degrades to a miss.
        let mut misses: Vec<String> = queries
            .iter()
            .filter(|key| !resolved.contains_key(*key))
            .cloned()
            .collect();
        if !misses.is_empty() {
            match EntityNameRepository::new(&self.db)
                .get_fresh_many(&misses, self.config.long_ttl, now_ms())
                .await
            {
                Ok(rows) => {
                    for (key, row) in misses.iter().zip(rows) {
                        let Some(row) = row else { continue };
                        let Some(kind) = parse_kind(&row.kind) else {
                            continue;
                        };
                        let entry = ResolvedEntity {
                            id: row.entity_id,
                            name: row.name,
                            kind,
                        };
                        self.remember(key, &entry);
                        resolved.insert(key.clone(), entry);
                    }
                }
                Err(err) => reporter.warn(&format!("name cache read failed: {err}")),
            }

            misses.retain(|key| !resolved.contains_key(key));
        }

        reporter.progress(resolved.len(), total, Some("resolving names"));

        // Tier 3: batch resolution upstream.
        if !misses.is_empty() {
            let fetched = self.fetch_missing(&misses, reporter).await?;

            if !fetched.is_empty() {
                self.persist(&fetched, reporter).await;
                for entry in fetched {
                    resolved.insert(entry.name.to_lowercase(), entry);
                }
            }

            reporter.progress(resolved.len(), total, Some("resolving names"));
        }

        Ok(self.split_by_kind(queries, resolved, reporter))
    }

    /// Reverse lookup of a character name, serving the display surface.
    /// Consults both cache tiers; never fetches upstream.
    pub async fn character_name(&self, character_id: i64) -> Result<Option<String>, Error> {
        if let Some(name) = self
            .character_names
            .lock()
            .expect("resolver cache lock poisoned")
            .get(&character_id)
        {
            return Ok(Some(name.clone()));
        }

        let row = CharacterNameRepository::new(&self.db)
            .get_fresh(character_id, self.config.long_ttl, now_ms())
            .await?;

        Ok(row.map(|r| {
            self.character_names
                .lock()
                .expect("resolver cache lock poisoned")
                .insert(character_id, r.name.clone());
            r.name
        }))
    }

    /// Validates and deduplicates queries, preserving first-seen order of
    /// the lowercased form.
    fn validated_queries(&self, names: &[String], reporter: &ProgressReporter) -> Vec<String> {
        let mut seen = HashMap::new();
        let mut queries = Vec::new();

        for raw in names {
            if !is_valid_entity_name(raw) {
                reporter.warn(&format!("ignoring invalid name query: {raw:?}"));
                continue;
            }
            let key = raw.trim().to_lowercase();
            if seen.insert(key.clone(), ()).is_none() {
                queries.push(key);
            }
        }

        queries
    }

    async fn fetch_missing(
        &self,
        misses: &[String],
        reporter: &ProgressReporter,
    ) -> Result<Vec<ResolvedEntity>, Error> {
        let mut fetched = Vec::new();

        for chunk in misses.chunks(ESI_IDS_REQUEST_LIMIT) {
            let body: Vec<&String> = chunk.iter().collect();
            let response: Option<UniverseIdsResponse> =
                self.esi.post_json("universe/ids/", &body).await?;

            let Some(response) = response else { continue };

            for (items, kind) in [
                (response.characters, EntityKind::Character),
                (response.corporations, EntityKind::Corporation),
                (response.alliances, EntityKind::Alliance),
            ] {
                for item in items {
                    let entry = ResolvedEntity {
                        id: item.id,
                        name: item.name,
                        kind,
                    };
                    self.remember(&entry.name.to_lowercase(), &entry);
                    fetched.push(entry);
                }
            }

            reporter.progress(fetched.len(), misses.len(), Some("resolving names"));
        }

        Ok(fetched)
    }

    /// Write-through to the persistent tier. Failures degrade to a
    /// warning; the in-process tier already has the values.
    async fn persist(&self, fetched: &[ResolvedEntity], reporter: &ProgressReporter) {
        let character_names: Vec<(i64, String)> = fetched
            .iter()
            .filter(|e| e.kind == EntityKind::Character)
            .map(|e| (e.id, e.name.clone()))
            .collect();

        let result = async {
            let txn = self.db.begin().await?;
            EntityNameRepository::new(&txn)
                .upsert_many(fetched, now_ms())
                .await?;
            CharacterNameRepository::new(&txn)
                .upsert_many(&character_names, now_ms())
                .await?;
            txn.commit().await
        }
        .await;

        if let Err(err) = result {
            reporter.warn(&format!("name cache write failed: {err}"));
        }
    }

    fn remember(&self, key: &str, entry: &ResolvedEntity) {
        self.names
            .lock()
            .expect("resolver cache lock poisoned")
            .insert(key.to_string(), entry.clone());

        if entry.kind == EntityKind::Character {
            self.character_names
                .lock()
                .expect("resolver cache lock poisoned")
                .insert(entry.id, entry.name.clone());
        }
    }

    fn split_by_kind(
        &self,
        queries: Vec<String>,
        mut resolved: HashMap<String, ResolvedEntity>,
        reporter: &ProgressReporter,
    ) -> ResolvedNames {
        let mut result = ResolvedNames::default();

        for key in queries {
            match resolved.remove(&key) {
                Some(entry) => match entry.kind {
                    EntityKind::Character => result.characters.push(entry),
                    EntityKind::Corporation => result.corporations.push(entry),
                    EntityKind::Alliance => result.alliances.push(entry),
                },
                None => {
                    reporter.warn(&format!("could not resolve name: {key:?}"));
                    result.missing.push(key);
                }
            }
        }

        result
    }
}

fn parse_kind(kind: &str) -> Option<EntityKind> {
    match kind {
        "character" => Some(EntityKind::Character),
        "corporation" => Some(EntityKind::Corporation),
        "alliance" => Some(EntityKind::Alliance),
        _ => None,
    }
}
