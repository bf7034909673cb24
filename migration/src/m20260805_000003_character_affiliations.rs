use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CharacterAffiliation::Table)
                    .if_not_exists()
                    .col(big_integer(CharacterAffiliation::CharacterId).primary_key())
                    .col(big_integer(CharacterAffiliation::CorporationId))
                    .col(big_integer_null(CharacterAffiliation::AllianceId))
                    .col(big_integer(CharacterAffiliation::Timestamp))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CharacterAffiliation::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum CharacterAffiliation {
    #[sea_orm(iden = "character_affiliations")]
    Table,
    CharacterId,
    CorporationId,
    AllianceId,
    Timestamp,
}
