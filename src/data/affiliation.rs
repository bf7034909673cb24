use std::collections::HashMap;
use std::time::Duration;

use sea_orm::{
    sea_query::OnConflict, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter,
};

use crate::model::entity::Affiliation;
use crate::util::time::is_fresh;

/// Repository over the short-TTL `character_affiliations` cache.
pub struct AffiliationRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> AffiliationRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Batch read, positionally aligned with `character_ids`.
    pub async fn get_fresh_many(
        &self,
        character_ids: &[i64],
        ttl: Duration,
        now_ms: i64,
    ) -> Result<Vec<Option<entity::character_affiliation::Model>>, DbErr> {
        if character_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = entity::prelude::CharacterAffiliation::find()
            .filter(
                entity::character_affiliation::Column::CharacterId
                    .is_in(character_ids.iter().copied()),
            )
            .all(self.db)
            .await?;

        let mut by_id: HashMap<i64, entity::character_affiliation::Model> = rows
            .into_iter()
            .filter(|row| is_fresh(row.timestamp, ttl, now_ms))
            .map(|row| (row.character_id, row))
            .collect();

        Ok(character_ids.iter().map(|id| by_id.remove(id)).collect())
    }

    pub async fn upsert_many(
        &self,
        affiliations: &[Affiliation],
        now_ms: i64,
    ) -> Result<(), DbErr> {
        if affiliations.is_empty() {
            return Ok(());
        }

        let models = affiliations
            .iter()
            .map(|a| entity::character_affiliation::ActiveModel {
                character_id: ActiveValue::Set(a.character_id),
                corporation_id: ActiveValue::Set(a.corporation_id),
                alliance_id: ActiveValue::Set(a.alliance_id),
                timestamp: ActiveValue::Set(now_ms),
            });

        entity::prelude::CharacterAffiliation::insert_many(models)
            .on_conflict(
                OnConflict::column(entity::character_affiliation::Column::CharacterId)
                    .update_columns([
                        entity::character_affiliation::Column::CorporationId,
                        entity::character_affiliation::Column::AllianceId,
                        entity::character_affiliation::Column::Timestamp,
                    ])
                    .to_owned(),
            )
            .exec(self.db)
            .await?;

        Ok(())
    }
}
