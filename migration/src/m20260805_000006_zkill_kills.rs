use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ZkillKill::Table)
                    .if_not_exists()
                    .col(string(ZkillKill::FeedKey).primary_key())
                    .col(text(ZkillKill::Kills))
                    .col(big_integer(ZkillKill::Timestamp))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ZkillKill::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum ZkillKill {
    #[sea_orm(iden = "zkill_kills")]
    Table,
    FeedKey,
    Kills,
    Timestamp,
}
