//! Database entity models for the heimdall cache store.
//!
//! Each module maps one persisted cache table. Every row carries a
//! `timestamp` in milliseconds since epoch; TTL enforcement happens in the
//! data layer, not here.

pub mod alliance;
pub mod character_affiliation;
pub mod character_name;
pub mod corporation;
pub mod entity_name;
pub mod esi_killmail;
pub mod universe_name;
pub mod user_setting;
pub mod zkill_kill;

pub mod prelude {
    pub use super::alliance::Entity as Alliance;
    pub use super::character_affiliation::Entity as CharacterAffiliation;
    pub use super::character_name::Entity as CharacterName;
    pub use super::corporation::Entity as Corporation;
    pub use super::entity_name::Entity as EntityName;
    pub use super::esi_killmail::Entity as EsiKillmail;
    pub use super::universe_name::Entity as UniverseName;
    pub use super::user_setting::Entity as UserSetting;
    pub use super::zkill_kill::Entity as ZkillKill;
}
