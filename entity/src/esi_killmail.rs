//! Full killmail bodies, immutable once observed.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "esi_killmails")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub killmail_id: i64,
    pub hash: String,
    #[sea_orm(column_type = "Text")]
    pub killmail: String,
    pub timestamp: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
