use sea_orm_migration::{prelude::*, schema::*};

static IDX_ENTITY_NAMES_KIND: &str = "idx-entity_names-kind";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EntityName::Table)
                    .if_not_exists()
                    .col(string(EntityName::NameKey).primary_key())
                    .col(big_integer(EntityName::EntityId))
                    .col(string(EntityName::Name))
                    .col(string(EntityName::Kind))
                    .col(big_integer(EntityName::Timestamp))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_ENTITY_NAMES_KIND)
                    .table(EntityName::Table)
                    .col(EntityName::Kind)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_ENTITY_NAMES_KIND)
                    .table(EntityName::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(EntityName::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum EntityName {
    #[sea_orm(iden = "entity_names")]
    Table,
    NameKey,
    EntityId,
    Name,
    Kind,
    Timestamp,
}
