use std::time::Duration;

use sea_orm::{sea_query::OnConflict, ActiveValue, ConnectionTrait, DbErr, EntityTrait};

use crate::util::time::is_fresh;

/// Repository over the `universe_names` solar system cache.
pub struct UniverseRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> UniverseRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn get_fresh(
        &self,
        system_id: i64,
        ttl: Duration,
        now_ms: i64,
    ) -> Result<Option<entity::universe_name::Model>, DbErr> {
        let row = entity::prelude::UniverseName::find_by_id(system_id)
            .one(self.db)
            .await?;

        Ok(row.filter(|r| is_fresh(r.timestamp, ttl, now_ms)))
    }

    pub async fn upsert(
        &self,
        system_id: i64,
        name: &str,
        security_status: f64,
        now_ms: i64,
    ) -> Result<(), DbErr> {
        let model = entity::universe_name::ActiveModel {
            system_id: ActiveValue::Set(system_id),
            name: ActiveValue::Set(name.to_string()),
            security_status: ActiveValue::Set(security_status),
            timestamp: ActiveValue::Set(now_ms),
        };

        entity::prelude::UniverseName::insert(model)
            .on_conflict(
                OnConflict::column(entity::universe_name::Column::SystemId)
                    .update_columns([
                        entity::universe_name::Column::Name,
                        entity::universe_name::Column::SecurityStatus,
                        entity::universe_name::Column::Timestamp,
                    ])
                    .to_owned(),
            )
            .exec(self.db)
            .await?;

        Ok(())
    }
}
