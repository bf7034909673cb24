use std::time::Duration;

use sea_orm::{sea_query::OnConflict, ActiveValue, ConnectionTrait, DbErr, EntityTrait};
use tracing::warn;

use crate::model::entity::EntityKind;
use crate::model::killmail::KillRef;
use crate::util::time::is_fresh;

/// Repository over the `zkill_kills` feed cache, keyed by `kind:id`.
pub struct KillFeedRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

/// Cache key for one entity's feed.
pub fn feed_key(kind: EntityKind, id: i64) -> String {
    format!("{}:{}", kind.as_str(), id)
}

impl<'a, C: ConnectionTrait> KillFeedRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Cached feed for an entity, or `None` on miss, expiry, or a corrupt
    /// row. Corruption is logged and treated as a miss; the feed will be
    /// re-fetched and the row overwritten.
    pub async fn get_fresh(
        &self,
        kind: EntityKind,
        id: i64,
        ttl: Duration,
        now_ms: i64,
    ) -> Result<Option<Vec<KillRef>>, DbErr> {
        let key = feed_key(kind, id);
        let Some(row) = entity::prelude::ZkillKill::find_by_id(key.as_str())
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        if !is_fresh(row.timestamp, ttl, now_ms) {
            return Ok(None);
        }

        match serde_json::from_str::<Vec<KillRef>>(&row.kills) {
            Ok(kills) => Ok(Some(kills)),
            Err(err) => {
                warn!(%key, "corrupt kill feed row, treating as miss: {err}");
                Ok(None)
            }
        }
    }

    pub async fn put(
        &self,
        kind: EntityKind,
        id: i64,
        kills: &[KillRef],
        now_ms: i64,
    ) -> Result<(), DbErr> {
        let payload = serde_json::to_string(kills)
            .map_err(|err| DbErr::Custom(format!("failed to encode kill feed: {err}")))?;

        let model = entity::zkill_kill::ActiveModel {
            feed_key: ActiveValue::Set(feed_key(kind, id)),
            kills: ActiveValue::Set(payload),
            timestamp: ActiveValue::Set(now_ms),
        };

        entity::prelude::ZkillKill::insert(model)
            .on_conflict(
                OnConflict::column(entity::zkill_kill::Column::FeedKey)
                    .update_columns([
                        entity::zkill_kill::Column::Kills,
                        entity::zkill_kill::Column::Timestamp,
                    ])
                    .to_owned(),
            )
            .exec(self.db)
            .await?;

        Ok(())
    }
}
