//! Error types for the heimdall pipeline.
//!
//! Errors are split by domain (ESI transport, zKill proxy, user settings)
//! and aggregated into a single [`Error`] with `thiserror` `#[from]`
//! conversions so `?` works across layers. The pipeline's batch policy is
//! that a single-item failure never aborts the batch; the variants here
//! are what remains after that policy has substituted sentinels and
//! recorded warnings.

pub mod esi;
pub mod settings;
pub mod zkill;

use thiserror::Error;

use crate::error::{esi::EsiError, settings::SettingsError, zkill::ZkillError};

/// Unified error type for pipeline operations.
#[derive(Error, Debug)]
pub enum Error {
    /// ESI client error (transport, rate limiting, bad request).
    #[error(transparent)]
    Esi(#[from] EsiError),
    /// zKill proxy error (transport, proof-of-work, feed failures).
    #[error(transparent)]
    Zkill(#[from] ZkillError),
    /// User settings validation error.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Input rejected before any side effect occurred.
    #[error("Invalid input: {0}")]
    Validation(String),
    /// Database error (query failures, connection issues).
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),
    /// Internal error indicating a bug in heimdall's code.
    ///
    /// This error should never occur in normal operation and indicates a
    /// programming error that needs to be reported as a GitHub issue.
    #[error("Internal error with heimdall's code, please open a GitHub issue as this indicates a bug: {0:?}")]
    InternalError(String),
}
