use std::collections::HashMap;
use std::time::Duration;

use sea_orm::{
    sea_query::OnConflict, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter,
};

use crate::model::entity::ResolvedEntity;
use crate::util::time::is_fresh;

/// Repository over the polymorphic `entity_names` resolution cache.
pub struct EntityNameRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> EntityNameRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Batch read by lowercased name key. The result is positionally
    /// aligned with `name_keys`; stale rows surface as `None`.
    pub async fn get_fresh_many(
        &self,
        name_keys: &[String],
        ttl: Duration,
        now_ms: i64,
    ) -> Result<Vec<Option<entity::entity_name::Model>>, DbErr> {
        if name_keys.is_empty() {
            return Ok(Vec::new());
        }

        let rows = entity::prelude::EntityName::find()
            .filter(entity::entity_name::Column::NameKey.is_in(name_keys.iter().cloned()))
            .all(self.db)
            .await?;

        let mut by_key: HashMap<String, entity::entity_name::Model> = rows
            .into_iter()
            .filter(|row| is_fresh(row.timestamp, ttl, now_ms))
            .map(|row| (row.name_key.clone(), row))
            .collect();

        Ok(name_keys.iter().map(|key| by_key.remove(key)).collect())
    }

    /// Write-through of freshly resolved entities, keyed by lowercased
    /// name.
    pub async fn upsert_many(
        &self,
        resolved: &[ResolvedEntity],
        now_ms: i64,
    ) -> Result<(), DbErr> {
        if resolved.is_empty() {
            return Ok(());
        }

        let models = resolved
            .iter()
            .map(|entry| entity::entity_name::ActiveModel {
                name_key: ActiveValue::Set(entry.name.to_lowercase()),
                entity_id: ActiveValue::Set(entry.id),
                name: ActiveValue::Set(entry.name.clone()),
                kind: ActiveValue::Set(entry.kind.as_str().to_string()),
                timestamp: ActiveValue::Set(now_ms),
            });

        entity::prelude::EntityName::insert_many(models)
            .on_conflict(
                OnConflict::column(entity::entity_name::Column::NameKey)
                    .update_columns([
                        entity::entity_name::Column::EntityId,
                        entity::entity_name::Column::Name,
                        entity::entity_name::Column::Kind,
                        entity::entity_name::Column::Timestamp,
                    ])
                    .to_owned(),
            )
            .exec(self.db)
            .await?;

        Ok(())
    }
}
