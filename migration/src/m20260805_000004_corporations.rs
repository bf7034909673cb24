use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Corporation::Table)
                    .if_not_exists()
                    .col(big_integer(Corporation::CorporationId).primary_key())
                    .col(string(Corporation::Name))
                    .col(boolean_null(Corporation::WarEligible))
                    .col(big_integer_null(Corporation::WarEligibleTimestamp))
                    .col(big_integer(Corporation::Timestamp))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Corporation::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Corporation {
    #[sea_orm(iden = "corporations")]
    Table,
    CorporationId,
    Name,
    WarEligible,
    WarEligibleTimestamp,
    Timestamp,
}
