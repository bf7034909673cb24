pub use sea_orm_migration::prelude::*;

mod m20260805_000001_entity_names;
mod m20260805_000002_character_names;
mod m20260805_000003_character_affiliations;
mod m20260805_000004_corporations;
mod m20260805_000005_alliances;
mod m20260805_000006_zkill_kills;
mod m20260805_000007_esi_killmails;
mod m20260805_000008_user_settings;
mod m20260805_000009_universe_names;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260805_000001_entity_names::Migration),
            Box::new(m20260805_000002_character_names::Migration),
            Box::new(m20260805_000003_character_affiliations::Migration),
            Box::new(m20260805_000004_corporations::Migration),
            Box::new(m20260805_000005_alliances::Migration),
            Box::new(m20260805_000006_zkill_kills::Migration),
            Box::new(m20260805_000007_esi_killmails::Migration),
            Box::new(m20260805_000008_user_settings::Migration),
            Box::new(m20260805_000009_universe_names::Migration),
        ]
    }
}
