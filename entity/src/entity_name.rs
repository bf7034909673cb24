//! Polymorphic name-resolution cache, keyed by lowercased name.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "entity_names")]
pub struct Model {
    /// Lowercased name used for case-insensitive lookups.
    #[sea_orm(primary_key, auto_increment = false)]
    pub name_key: String,
    pub entity_id: i64,
    /// Server-authoritative casing.
    pub name: String,
    /// One of `character`, `corporation`, `alliance`.
    pub kind: String,
    pub timestamp: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
