//! Startup cache maintenance.
//!
//! Runs once after the migrator: expired rows are deleted outright, and
//! corporations whose war-eligibility alone has lapsed keep their name
//! row with the war fields cleared. Maintenance failures are warnings; a
//! stale row that survives a failed sweep is still TTL-checked on read.

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::util::time::now_ms;

/// Sweeps expired cache rows. Never fails the startup path.
pub async fn run_startup_maintenance<C: ConnectionTrait>(db: &C, config: &PipelineConfig) {
    let now = now_ms();
    let short_cutoff = now - config.short_ttl.as_millis() as i64;
    let long_cutoff = now - config.long_ttl.as_millis() as i64;

    if let Err(err) = expire_rows(db, short_cutoff, long_cutoff).await {
        warn!("startup cache maintenance failed: {err}");
    }
}

async fn expire_rows<C: ConnectionTrait>(
    db: &C,
    short_cutoff: i64,
    long_cutoff: i64,
) -> Result<(), DbErr> {
    let affiliations = entity::prelude::CharacterAffiliation::delete_many()
        .filter(entity::character_affiliation::Column::Timestamp.lt(short_cutoff))
        .exec(db)
        .await?;

    let entity_names = entity::prelude::EntityName::delete_many()
        .filter(entity::entity_name::Column::Timestamp.lt(long_cutoff))
        .exec(db)
        .await?;

    let character_names = entity::prelude::CharacterName::delete_many()
        .filter(entity::character_name::Column::Timestamp.lt(long_cutoff))
        .exec(db)
        .await?;

    let alliances = entity::prelude::Alliance::delete_many()
        .filter(entity::alliance::Column::Timestamp.lt(long_cutoff))
        .exec(db)
        .await?;

    // War eligibility lapses independently: clear the flag but keep the
    // name row until its own TTL passes.
    let war_flags = entity::prelude::Corporation::update_many()
        .col_expr(
            entity::corporation::Column::WarEligible,
            Expr::value(Option::<bool>::None),
        )
        .col_expr(
            entity::corporation::Column::WarEligibleTimestamp,
            Expr::value(Option::<i64>::None),
        )
        .filter(entity::corporation::Column::WarEligibleTimestamp.lt(short_cutoff))
        .exec(db)
        .await?;

    let corporations = entity::prelude::Corporation::delete_many()
        .filter(entity::corporation::Column::Timestamp.lt(long_cutoff))
        .exec(db)
        .await?;

    debug!(
        affiliations = affiliations.rows_affected,
        entity_names = entity_names.rows_affected,
        character_names = character_names.rows_affected,
        alliances = alliances.rows_affected,
        war_flags = war_flags.rows_affected,
        corporations = corporations.rows_affected,
        "expired cache rows on startup"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use heimdall_test_utils::setup::TestSetup;
    use sea_orm::{ActiveValue, EntityTrait};

    use super::*;

    async fn insert_corporation(
        db: &sea_orm::DatabaseConnection,
        corporation_id: i64,
        timestamp: i64,
        war_eligible_timestamp: Option<i64>,
    ) {
        let model = entity::corporation::ActiveModel {
            corporation_id: ActiveValue::Set(corporation_id),
            name: ActiveValue::Set(format!("Corp {corporation_id}")),
            war_eligible: ActiveValue::Set(war_eligible_timestamp.map(|_| true)),
            war_eligible_timestamp: ActiveValue::Set(war_eligible_timestamp),
            timestamp: ActiveValue::Set(timestamp),
        };
        entity::prelude::Corporation::insert(model)
            .exec(db)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn expired_affiliations_are_deleted() {
        let test = TestSetup::new().await.unwrap();
        let config = PipelineConfig::default();
        let now = now_ms();
        let expired = now - config.short_ttl.as_millis() as i64 - 1_000;

        let rows = [
            (1001, expired),
            (1002, now),
        ]
        .map(|(character_id, timestamp)| entity::character_affiliation::ActiveModel {
            character_id: ActiveValue::Set(character_id),
            corporation_id: ActiveValue::Set(2001),
            alliance_id: ActiveValue::Set(None),
            timestamp: ActiveValue::Set(timestamp),
        });
        entity::prelude::CharacterAffiliation::insert_many(rows)
            .exec(&test.db)
            .await
            .unwrap();

        run_startup_maintenance(&test.db, &config).await;

        let remaining = entity::prelude::CharacterAffiliation::find()
            .all(&test.db)
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].character_id, 1002);
    }

    #[tokio::test]
    async fn lapsed_war_eligibility_clears_without_dropping_the_name() {
        let test = TestSetup::new().await.unwrap();
        let config = PipelineConfig::default();
        let now = now_ms();
        let war_expired = now - config.short_ttl.as_millis() as i64 - 1_000;

        // Fresh name, stale war-eligibility.
        insert_corporation(&test.db, 2001, now, Some(war_expired)).await;
        // Fresh on both clocks.
        insert_corporation(&test.db, 2002, now, Some(now)).await;

        run_startup_maintenance(&test.db, &config).await;

        let cleared = entity::prelude::Corporation::find_by_id(2001)
            .one(&test.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cleared.name, "Corp 2001");
        assert_eq!(cleared.war_eligible, None);
        assert_eq!(cleared.war_eligible_timestamp, None);

        let untouched = entity::prelude::Corporation::find_by_id(2002)
            .one(&test.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched.war_eligible, Some(true));
    }

    #[tokio::test]
    async fn expired_names_are_dropped_entirely() {
        let test = TestSetup::new().await.unwrap();
        let config = PipelineConfig::default();
        let now = now_ms();
        let name_expired = now - config.long_ttl.as_millis() as i64 - 1_000;

        insert_corporation(&test.db, 2001, name_expired, None).await;

        let name_row = entity::entity_name::ActiveModel {
            name_key: ActiveValue::Set("old corp".to_string()),
            entity_id: ActiveValue::Set(2001),
            name: ActiveValue::Set("Old Corp".to_string()),
            kind: ActiveValue::Set("corporation".to_string()),
            timestamp: ActiveValue::Set(name_expired),
        };
        entity::prelude::EntityName::insert(name_row)
            .exec(&test.db)
            .await
            .unwrap();

        run_startup_maintenance(&test.db, &config).await;

        assert!(entity::prelude::Corporation::find_by_id(2001)
            .one(&test.db)
            .await
            .unwrap()
            .is_none());
        assert!(entity::prelude::EntityName::find()
            .all(&test.db)
            .await
            .unwrap()
            .is_empty());
    }
}
