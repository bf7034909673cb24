use std::collections::HashMap;
use std::time::Duration;

use sea_orm::{
    sea_query::OnConflict, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter,
};

use crate::model::entity::CorpInfo;
use crate::util::time::is_fresh;

/// Repository over the `corporations` cache.
///
/// The name and the war-eligibility flag age independently: a row is a
/// hit only while the name is within the long TTL and the war-eligibility
/// fields are present and within the short TTL.
pub struct CorporationRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CorporationRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Batch read, positionally aligned with `corporation_ids`.
    pub async fn get_fresh_many(
        &self,
        corporation_ids: &[i64],
        name_ttl: Duration,
        war_ttl: Duration,
        now_ms: i64,
    ) -> Result<Vec<Option<entity::corporation::Model>>, DbErr> {
        if corporation_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = entity::prelude::Corporation::find()
            .filter(
                entity::corporation::Column::CorporationId.is_in(corporation_ids.iter().copied()),
            )
            .all(self.db)
            .await?;

        let mut by_id: HashMap<i64, entity::corporation::Model> = rows
            .into_iter()
            .filter(|row| {
                let name_fresh = is_fresh(row.timestamp, name_ttl, now_ms);
                let war_fresh = row.war_eligible.is_some()
                    && row
                        .war_eligible_timestamp
                        .is_some_and(|ts| is_fresh(ts, war_ttl, now_ms));
                name_fresh && war_fresh
            })
            .map(|row| (row.corporation_id, row))
            .collect();

        Ok(corporation_ids.iter().map(|id| by_id.remove(id)).collect())
    }

    pub async fn upsert_many(&self, corporations: &[CorpInfo], now_ms: i64) -> Result<(), DbErr> {
        if corporations.is_empty() {
            return Ok(());
        }

        let models = corporations.iter().map(|corp| entity::corporation::ActiveModel {
            corporation_id: ActiveValue::Set(corp.corporation_id),
            name: ActiveValue::Set(corp.name.clone()),
            war_eligible: ActiveValue::Set(Some(corp.war_eligible)),
            war_eligible_timestamp: ActiveValue::Set(Some(now_ms)),
            timestamp: ActiveValue::Set(now_ms),
        });

        entity::prelude::Corporation::insert_many(models)
            .on_conflict(
                OnConflict::column(entity::corporation::Column::CorporationId)
                    .update_columns([
                        entity::corporation::Column::Name,
                        entity::corporation::Column::WarEligible,
                        entity::corporation::Column::WarEligibleTimestamp,
                        entity::corporation::Column::Timestamp,
                    ])
                    .to_owned(),
            )
            .exec(self.db)
            .await?;

        Ok(())
    }
}
