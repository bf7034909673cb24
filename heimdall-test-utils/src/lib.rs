//! Shared test scaffolding for the heimdall workspace.
//!
//! Provides a mockito-backed test setup with an in-memory sqlite cache
//! store, plus fixture builders for kill references and killmail bodies.

pub mod error;
pub mod fixtures;
pub mod setup;

pub mod prelude {
    pub use crate::error::TestError;
    pub use crate::setup::TestSetup;
}
