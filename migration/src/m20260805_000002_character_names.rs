use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CharacterName::Table)
                    .if_not_exists()
                    .col(big_integer(CharacterName::CharacterId).primary_key())
                    .col(string(CharacterName::Name))
                    .col(big_integer(CharacterName::Timestamp))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CharacterName::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum CharacterName {
    #[sea_orm(iden = "character_names")]
    Table,
    CharacterId,
    Name,
    Timestamp,
}
