//! Startup wiring: database connection, migrations, cache maintenance.

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use migration::{Migrator, MigratorTrait};

use crate::config::PipelineConfig;
use crate::data::maintenance::run_startup_maintenance;
use crate::error::Error;

/// Connects to the cache database, applies pending migrations (creating
/// any missing tables), and sweeps expired rows.
pub async fn connect_to_database(
    database_url: &str,
    config: &PipelineConfig,
) -> Result<DatabaseConnection, Error> {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);

    let db = Database::connect(options).await?;

    Migrator::up(&db, None).await.map_err(|err| {
        Error::InternalError(format!("failed to run cache store migrations: {err}"))
    })?;

    run_startup_maintenance(&db, config).await;

    Ok(db)
}
