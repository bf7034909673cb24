use std::collections::HashMap;
use std::time::Duration;

use sea_orm::{
    sea_query::OnConflict, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter,
};

use crate::model::entity::AllianceInfo;
use crate::util::time::is_fresh;

/// Repository over the long-TTL `alliances` cache.
pub struct AllianceRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> AllianceRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Batch read, positionally aligned with `alliance_ids`.
    pub async fn get_fresh_many(
        &self,
        alliance_ids: &[i64],
        ttl: Duration,
        now_ms: i64,
    ) -> Result<Vec<Option<entity::alliance::Model>>, DbErr> {
        if alliance_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = entity::prelude::Alliance::find()
            .filter(entity::alliance::Column::AllianceId.is_in(alliance_ids.iter().copied()))
            .all(self.db)
            .await?;

        let mut by_id: HashMap<i64, entity::alliance::Model> = rows
            .into_iter()
            .filter(|row| is_fresh(row.timestamp, ttl, now_ms))
            .map(|row| (row.alliance_id, row))
            .collect();

        Ok(alliance_ids.iter().map(|id| by_id.remove(id)).collect())
    }

    pub async fn upsert_many(&self, alliances: &[AllianceInfo], now_ms: i64) -> Result<(), DbErr> {
        if alliances.is_empty() {
            return Ok(());
        }

        let models = alliances.iter().map(|alliance| entity::alliance::ActiveModel {
            alliance_id: ActiveValue::Set(alliance.alliance_id),
            name: ActiveValue::Set(alliance.name.clone()),
            timestamp: ActiveValue::Set(now_ms),
        });

        entity::prelude::Alliance::insert_many(models)
            .on_conflict(
                OnConflict::column(entity::alliance::Column::AllianceId)
                    .update_columns([
                        entity::alliance::Column::Name,
                        entity::alliance::Column::Timestamp,
                    ])
                    .to_owned(),
            )
            .exec(self.db)
            .await?;

        Ok(())
    }
}
