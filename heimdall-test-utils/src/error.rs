use thiserror::Error;

/// Errors surfaced while preparing a test environment.
#[derive(Error, Debug)]
pub enum TestError {
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}
