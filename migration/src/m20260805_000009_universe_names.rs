use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UniverseName::Table)
                    .if_not_exists()
                    .col(big_integer(UniverseName::SystemId).primary_key())
                    .col(string(UniverseName::Name))
                    .col(double(UniverseName::SecurityStatus))
                    .col(big_integer(UniverseName::Timestamp))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UniverseName::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum UniverseName {
    #[sea_orm(iden = "universe_names")]
    Table,
    SystemId,
    Name,
    SecurityStatus,
    Timestamp,
}
