use std::collections::HashMap;
use std::time::Duration;

use sea_orm::{
    sea_query::OnConflict, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter,
};
use tracing::warn;

use crate::model::killmail::KillmailFull;
use crate::util::time::is_fresh;

/// Repository over the `esi_killmails` body cache.
///
/// Killmails are immutable once observed, so the long TTL only bounds
/// unbounded growth; a fresh row is always authoritative.
pub struct KillmailRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> KillmailRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// One batched read for all requested ids. Corrupt rows are logged
    /// and dropped from the result, which makes them upstream fetches.
    pub async fn get_fresh_many(
        &self,
        killmail_ids: &[i64],
        ttl: Duration,
        now_ms: i64,
    ) -> Result<HashMap<i64, KillmailFull>, DbErr> {
        if killmail_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = entity::prelude::EsiKillmail::find()
            .filter(entity::esi_killmail::Column::KillmailId.is_in(killmail_ids.iter().copied()))
            .all(self.db)
            .await?;

        let mut bodies = HashMap::with_capacity(rows.len());
        for row in rows {
            if !is_fresh(row.timestamp, ttl, now_ms) {
                continue;
            }
            match serde_json::from_str::<KillmailFull>(&row.killmail) {
                Ok(body) => {
                    bodies.insert(row.killmail_id, body);
                }
                Err(err) => {
                    warn!(
                        killmail_id = row.killmail_id,
                        "corrupt killmail row, treating as miss: {err}"
                    );
                }
            }
        }

        Ok(bodies)
    }

    pub async fn upsert_many(
        &self,
        killmails: &[(i64, String, KillmailFull)],
        now_ms: i64,
    ) -> Result<(), DbErr> {
        if killmails.is_empty() {
            return Ok(());
        }

        let mut models = Vec::with_capacity(killmails.len());
        for (killmail_id, hash, body) in killmails {
            let payload = serde_json::to_string(body)
                .map_err(|err| DbErr::Custom(format!("failed to encode killmail: {err}")))?;
            models.push(entity::esi_killmail::ActiveModel {
                killmail_id: ActiveValue::Set(*killmail_id),
                hash: ActiveValue::Set(hash.clone()),
                killmail: ActiveValue::Set(payload),
                timestamp: ActiveValue::Set(now_ms),
            });
        }

        entity::prelude::EsiKillmail::insert_many(models)
            .on_conflict(
                OnConflict::column(entity::esi_killmail::Column::KillmailId)
                    .update_columns([
                        entity::esi_killmail::Column::Hash,
                        entity::esi_killmail::Column::Killmail,
                        entity::esi_killmail::Column::Timestamp,
                    ])
                    .to_owned(),
            )
            .exec(self.db)
            .await?;

        Ok(())
    }
}
