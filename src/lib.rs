//! heimdall — killboard intelligence pipeline for EVE Online.
//!
//! Ingests character, corporation, and alliance names, enriches them into
//! unified intelligence records through ESI, and computes a per-entity
//! threat assessment from killboard activity: paginated kill feed
//! retrieval with timespan convergence, batched killmail fetching, a
//! deterministic activity analyzer, and a weighted threat scorer. All
//! upstream reads go through a two-tier cache (process memory plus a
//! sqlite-backed store) with per-table TTLs.
//!
//! The display surface is not this crate's concern: progress and
//! diagnostics flow out through injected callbacks only.

pub mod config;
pub mod data;
pub mod error;
pub mod esi;
pub mod model;
pub mod progress;
pub mod reference;
pub mod service;
pub mod startup;
pub mod util;
pub mod zkill;

pub use config::PipelineConfig;
pub use error::Error;
pub use model::entity::{EntityKind, UnifiedRecord};
pub use progress::ProgressReporter;
pub use service::pipeline::{Pipeline, ThreatProfile};
pub use startup::connect_to_database;
