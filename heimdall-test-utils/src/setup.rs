use migration::{Migrator, MigratorTrait};
use mockito::ServerGuard;
use sea_orm::{Database, DatabaseConnection};

use crate::error::TestError;

/// One test's environment: a mock HTTP server standing in for both ESI
/// and the zKill proxy, and a migrated in-memory cache store.
pub struct TestSetup {
    pub server: ServerGuard,
    /// Base URL of the mock server, cloned out so `server` can stay
    /// mutably borrowed while services are constructed.
    pub server_url: String,
    pub db: DatabaseConnection,
}

impl TestSetup {
    pub async fn new() -> Result<Self, TestError> {
        let server = mockito::Server::new_async().await;
        let server_url = server.url();

        let db = Database::connect("sqlite::memory:").await?;
        Migrator::up(&db, None).await?;

        Ok(Self {
            server,
            server_url,
            db,
        })
    }
}
