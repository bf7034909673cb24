//! Data access layer for the cache store.
//!
//! Repositories wrap one table each and own TTL enforcement on reads: a
//! stale or corrupt row is reported as a miss so the caller re-fetches
//! from upstream. Writes are plain operations over whatever connection is
//! passed in; callers wrap multi-row writes in a transaction when they
//! need commit-or-rollback semantics.

pub mod affiliation;
pub mod alliance;
pub mod character_name;
pub mod corporation;
pub mod entity_name;
pub mod kill_feed;
pub mod killmail;
pub mod maintenance;
pub mod settings;
pub mod universe;
