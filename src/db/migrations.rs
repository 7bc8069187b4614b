//! Embedded migration runner.

use std::{error::Error as StdError, time::Duration};

use diesel_migrations::MigrationHarness;
use thiserror::Error;
use tokio::time::timeout;
use tracing::info;

use super::connection::{DbConnection, MIGRATIONS};

const MIGRATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Failures while bringing the schema up to date.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The migration harness reported a failure.
    #[error("migration harness error: {0}")]
    Harness(Box<dyn StdError + Send + Sync>),
    /// Migrations did not finish within the allotted time.
    #[error("migration execution exceeded {0:?}")]
    Timeout(Duration),
    /// The blocking migration task failed to run.
    #[error("migration executor error: {0}")]
    Executor(String),
    /// A dedicated migration connection could not be opened.
    #[error("migration connection error: {0}")]
    Connection(#[from] diesel::ConnectionError),
}

fn apply_pending<C>(conn: &mut C) -> Result<(), MigrationError>
where
    C: MigrationHarness<super::connection::Backend>,
{
    match conn.has_pending_migration(MIGRATIONS) {
        Ok(false) => {
            info!("no pending migrations; skipping apply");
            return Ok(());
        }
        Ok(true) => info!("applying pending migrations"),
        Err(e) => return Err(MigrationError::Harness(e)),
    }
    conn.run_pending_migrations(MIGRATIONS)
        .map(|applied| info!(count = applied.len(), "migrations applied"))
        .map_err(MigrationError::Harness)
}

/// Apply embedded migrations over an existing connection.
///
/// # Errors
/// Returns [`MigrationError`] when a migration fails or the run times out.
#[cfg(feature = "sqlite")]
#[must_use = "handle the result"]
pub async fn apply_migrations(
    conn: &mut DbConnection,
    _database_url: &str,
) -> Result<(), MigrationError> {
    timeout(MIGRATION_TIMEOUT, conn.spawn_blocking(|c| Ok(apply_pending(c))))
        .await
        .map_err(|_| MigrationError::Timeout(MIGRATION_TIMEOUT))?
        .map_err(|e| MigrationError::Executor(e.to_string()))?
}

/// Apply embedded migrations on a dedicated synchronous connection.
///
/// `diesel_migrations` needs a blocking connection, so PostgreSQL migrations
/// open their own instead of reusing the async one.
///
/// # Errors
/// Returns [`MigrationError`] when a migration fails or the run times out.
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
#[must_use = "handle the result"]
pub async fn apply_migrations(
    _conn: &mut DbConnection,
    database_url: &str,
) -> Result<(), MigrationError> {
    use diesel::{Connection, pg::PgConnection};

    let url = database_url.to_owned();
    timeout(
        MIGRATION_TIMEOUT,
        tokio::task::spawn_blocking(move || {
            let mut conn = PgConnection::establish(&url)?;
            apply_pending(&mut conn)
        }),
    )
    .await
    .map_err(|_| MigrationError::Timeout(MIGRATION_TIMEOUT))?
    .map_err(|e| MigrationError::Executor(e.to_string()))?
}
