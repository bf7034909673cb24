use sea_orm::{sea_query::OnConflict, ActiveValue, ConnectionTrait, DbErr, EntityTrait};

use crate::util::time::now_ms;

/// Repository over the persisted `user_settings` table.
///
/// Settings have no TTL; a stored value stays authoritative until the
/// user changes or resets it.
pub struct SettingsRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> SettingsRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn all(&self) -> Result<Vec<entity::user_setting::Model>, DbErr> {
        entity::prelude::UserSetting::find().all(self.db).await
    }

    pub async fn upsert(&self, key: &str, value: i64) -> Result<(), DbErr> {
        let model = entity::user_setting::ActiveModel {
            key: ActiveValue::Set(key.to_string()),
            value: ActiveValue::Set(value),
            timestamp: ActiveValue::Set(now_ms()),
        };

        entity::prelude::UserSetting::insert(model)
            .on_conflict(
                OnConflict::column(entity::user_setting::Column::Key)
                    .update_columns([
                        entity::user_setting::Column::Value,
                        entity::user_setting::Column::Timestamp,
                    ])
                    .to_owned(),
            )
            .exec(self.db)
            .await?;

        Ok(())
    }

    pub async fn clear(&self) -> Result<(), DbErr> {
        entity::prelude::UserSetting::delete_many()
            .exec(self.db)
            .await?;

        Ok(())
    }
}
