//! Cached killboard feed per entity, keyed by `kind:id`.
//!
//! The kill list is stored as a JSON document; the data layer owns the
//! (de)serialization so a corrupt row degrades to a cache miss.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "zkill_kills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub feed_key: String,
    #[sea_orm(column_type = "Text")]
    pub kills: String,
    pub timestamp: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
