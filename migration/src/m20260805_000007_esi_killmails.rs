use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EsiKillmail::Table)
                    .if_not_exists()
                    .col(big_integer(EsiKillmail::KillmailId).primary_key())
                    .col(string(EsiKillmail::Hash))
                    .col(text(EsiKillmail::Killmail))
                    .col(big_integer(EsiKillmail::Timestamp))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EsiKillmail::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum EsiKillmail {
    #[sea_orm(iden = "esi_killmails")]
    Table,
    KillmailId,
    Hash,
    Killmail,
    Timestamp,
}
