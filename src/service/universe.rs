//! Solar system lookups.
//!
//! Resolves `solar_system_id`s to name and security status through
//! `GET /universe/systems/{id}/` with the usual two-tier cache. System
//! data is effectively static, so rows use the long TTL. An unknown or
//! unfetchable system is reported and skipped; the stats builder treats
//! it as unclassified space.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sea_orm::DatabaseConnection;

use crate::config::PipelineConfig;
use crate::data::universe::UniverseRepository;
use crate::error::Error;
use crate::esi::EsiClient;
use crate::model::esi::SolarSystemDto;
use crate::progress::ProgressReporter;
use crate::util::time::now_ms;

/// Cached view of one solar system.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemInfo {
    pub system_id: i64,
    pub name: String,
    pub security_status: f64,
}

pub struct UniverseService {
    db: DatabaseConnection,
    esi: Arc<EsiClient>,
    config: Arc<PipelineConfig>,
    cache: Mutex<HashMap<i64, SystemInfo>>,
}

impl UniverseService {
    pub fn new(db: DatabaseConnection, esi: Arc<EsiClient>, config: Arc<PipelineConfig>) -> Self {
        Self {
            db,
            esi,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Info for every resolvable system in `system_ids`, keyed by id.
    pub async fn get_systems(
        &self,
        system_ids: &[i64],
        reporter: &ProgressReporter,
    ) -> Result<HashMap<i64, SystemInfo>, Error> {
        let mut unique: Vec<i64> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for &id in system_ids {
            if id > 0 && seen.insert(id) {
                unique.push(id);
            }
        }

        let mut found = HashMap::new();

        for id in unique {
            match self.get_system(id).await {
                Ok(Some(info)) => {
                    found.insert(id, info);
                }
                Ok(None) => reporter.warn(&format!("solar system {id} is unknown to ESI")),
                Err(err) => reporter.warn(&format!("solar system {id} lookup failed: {err}")),
            }
        }

        Ok(found)
    }

    pub async fn get_system(&self, system_id: i64) -> Result<Option<SystemInfo>, Error> {
        if let Some(info) = self
            .cache
            .lock()
            .expect("universe cache lock poisoned")
            .get(&system_id)
        {
            return Ok(Some(info.clone()));
        }

        let repo = UniverseRepository::new(&self.db);
        if let Some(row) = repo
            .get_fresh(system_id, self.config.long_ttl, now_ms())
            .await?
        {
            let info = SystemInfo {
                system_id,
                name: row.name,
                security_status: row.security_status,
            };
            self.remember(info.clone());
            return Ok(Some(info));
        }

        let dto: Option<SolarSystemDto> = self
            .esi
            .get_json(&format!("universe/systems/{system_id}/"))
            .await?;
        let Some(dto) = dto else {
            return Ok(None);
        };

        if let Err(err) = repo
            .upsert(system_id, &dto.name, dto.security_status, now_ms())
            .await
        {
            tracing::warn!(system_id, "universe cache write failed: {err}");
        }

        let info = SystemInfo {
            system_id,
            name: dto.name,
            security_status: dto.security_status,
        };
        self.remember(info.clone());

        Ok(Some(info))
    }

    fn remember(&self, info: SystemInfo) {
        self.cache
            .lock()
            .expect("universe cache lock poisoned")
            .insert(info.system_id, info);
    }
}
