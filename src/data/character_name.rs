use std::time::Duration;

use sea_orm::{
    sea_query::OnConflict, ActiveValue, ConnectionTrait, DbErr, EntityTrait,
};

use crate::util::time::is_fresh;

/// Repository over the `character_names` id-to-name cache.
pub struct CharacterNameRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CharacterNameRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn get_fresh(
        &self,
        character_id: i64,
        ttl: Duration,
        now_ms: i64,
    ) -> Result<Option<entity::character_name::Model>, DbErr> {
        let row = entity::prelude::CharacterName::find_by_id(character_id)
            .one(self.db)
            .await?;

        Ok(row.filter(|r| is_fresh(r.timestamp, ttl, now_ms)))
    }

    pub async fn upsert_many(
        &self,
        names: &[(i64, String)],
        now_ms: i64,
    ) -> Result<(), DbErr> {
        if names.is_empty() {
            return Ok(());
        }

        let models = names
            .iter()
            .map(|(character_id, name)| entity::character_name::ActiveModel {
                character_id: ActiveValue::Set(*character_id),
                name: ActiveValue::Set(name.clone()),
                timestamp: ActiveValue::Set(now_ms),
            });

        entity::prelude::CharacterName::insert_many(models)
            .on_conflict(
                OnConflict::column(entity::character_name::Column::CharacterId)
                    .update_columns([
                        entity::character_name::Column::Name,
                        entity::character_name::Column::Timestamp,
                    ])
                    .to_owned(),
            )
            .exec(self.db)
            .await?;

        Ok(())
    }
}
