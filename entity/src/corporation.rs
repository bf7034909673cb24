//! Corporation info cache.
//!
//! War eligibility expires independently of the name: `war_eligible` and
//! `war_eligible_timestamp` are cleared while the name row is preserved.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "corporations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub corporation_id: i64,
    pub name: String,
    pub war_eligible: Option<bool>,
    pub war_eligible_timestamp: Option<i64>,
    pub timestamp: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
