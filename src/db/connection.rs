//! Connection and pool helpers for database access.

use cfg_if::cfg_if;
use diesel_async::{
    pooled_connection::{
        AsyncDieselConnectionManager,
        ManagerConfig,
        PoolError,
        bb8::Pool,
    },
    scoped_futures::ScopedBoxFuture,
};
#[cfg(feature = "sqlite")]
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_migrations::{EmbeddedMigrations, embed_migrations};

cfg_if! {
    if #[cfg(all(feature = "sqlite", feature = "postgres", not(feature = "lint")))] {
        compile_error!("Either feature 'sqlite' or 'postgres' must be enabled, not both");
    } else if #[cfg(feature = "sqlite")] {
        use diesel::{ConnectionError, ConnectionResult, sqlite::{Sqlite, SqliteConnection}};
        use diesel_async::{AsyncConnection, SimpleAsyncConnection};
        use futures_util::future::BoxFuture;

        /// Database backend type for `SQLite`.
        pub type Backend = Sqlite;
        /// Embedded database migrations for `SQLite`.
        pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/sqlite");
        /// Connection type for `SQLite` database access.
        pub type DbConnection = SyncConnectionWrapper<SqliteConnection>;
        /// Connection pool type for `SQLite`.
        pub type DbPool = Pool<DbConnection>;

        const SQLITE_SETUP: &str =
            "PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;";

        /// Open a `SQLite` connection that waits on locks and enforces
        /// foreign keys.
        ///
        /// # Errors
        /// Returns an error when the file cannot be opened or the pragmas fail.
        pub fn establish_sqlite(url: &str) -> BoxFuture<'_, ConnectionResult<DbConnection>> {
            Box::pin(async move {
                let mut conn = DbConnection::establish(url).await?;
                conn.batch_execute(SQLITE_SETUP)
                    .await
                    .map_err(ConnectionError::CouldntSetupConfiguration)?;
                Ok(conn)
            })
        }

        fn manager_config() -> ManagerConfig<DbConnection> {
            let mut config = ManagerConfig::default();
            config.custom_setup = Box::new(establish_sqlite);
            config
        }

        /// Run `body` inside a transaction that takes the write lock up front.
        ///
        /// A deferred `BEGIN` that reads before writing cannot wait for a
        /// concurrent writer: `SQLite` fails the lock upgrade with `SQLITE_BUSY`
        /// without consulting the busy handler. `BEGIN IMMEDIATE` queues on
        /// `busy_timeout` instead.
        ///
        /// # Errors
        /// Returns the error produced by `body`, or a database error when the
        /// transaction cannot be opened or committed.
        pub async fn write_transaction<'a, R, E, F>(conn: &mut DbConnection, body: F) -> Result<R, E>
        where
            F: for<'r> FnOnce(&'r mut DbConnection) -> ScopedBoxFuture<'a, 'r, Result<R, E>> + Send + 'a,
            E: From<diesel::result::Error> + Send + 'a,
            R: Send + 'a,
        {
            use diesel::connection::{AnsiTransactionManager, TransactionManager};

            conn.spawn_blocking(|inner| AnsiTransactionManager::begin_transaction_sql(inner, "BEGIN IMMEDIATE"))
                .await?;
            match body(conn).await {
                Ok(value) => {
                    conn.spawn_blocking(|inner| AnsiTransactionManager::commit_transaction(inner))
                        .await?;
                    Ok(value)
                }
                Err(err) => {
                    conn.spawn_blocking(|inner| AnsiTransactionManager::rollback_transaction(inner))
                        .await?;
                    Err(err)
                }
            }
        }
    } else if #[cfg(all(feature = "postgres", not(feature = "sqlite")))] {
        use diesel::pg::Pg;
        use diesel_async::{AsyncConnection, AsyncPgConnection};
        /// Database backend type for PostgreSQL.
        pub type Backend = Pg;
        /// Embedded database migrations for PostgreSQL.
        pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/postgres");
        /// Connection type for PostgreSQL database access.
        pub type DbConnection = AsyncPgConnection;
        /// Connection pool type for PostgreSQL.
        pub type DbPool = Pool<DbConnection>;

        fn manager_config() -> ManagerConfig<DbConnection> { ManagerConfig::default() }

        /// Run `body` inside a transaction. Row locks taken by the updates
        /// serialize concurrent writers.
        ///
        /// # Errors
        /// Returns the error produced by `body`, or a database error when the
        /// transaction cannot be opened or committed.
        pub async fn write_transaction<'a, R, E, F>(conn: &mut DbConnection, body: F) -> Result<R, E>
        where
            F: for<'r> FnOnce(&'r mut DbConnection) -> ScopedBoxFuture<'a, 'r, Result<R, E>> + Send + 'a,
            E: From<diesel::result::Error> + Send + 'a,
            R: Send + 'a,
        {
            conn.transaction(body).await
        }
    } else {
        compile_error!("Either feature 'sqlite' or 'postgres' must be enabled");
    }
}

/// Create a pooled connection to the configured database.
///
/// # Examples
///
/// ```no_run
/// use forumd::db::establish_pool;
/// async fn example() {
///     let pool = establish_pool("forumd.db", 4)
///         .await
///         .expect("failed to build pool");
/// }
/// ```
///
/// # Errors
/// Returns any error reported by the underlying connection pool builder.
pub async fn establish_pool(database_url: &str, max_size: u32) -> Result<DbPool, PoolError> {
    let manager =
        AsyncDieselConnectionManager::<DbConnection>::new_with_config(database_url, manager_config());
    Pool::builder().max_size(max_size.max(1)).build(manager).await
}

/// Render a database URL for logs with any password removed.
#[cfg(feature = "postgres")]
#[must_use]
pub fn redact_url(database_url: &str) -> String {
    match url::Url::parse(database_url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some("****")).is_err() {
                return "<unprintable url>".to_owned();
            }
            parsed.to_string()
        }
        Ok(parsed) => parsed.to_string(),
        Err(_) => "<unparseable url>".to_owned(),
    }
}

/// Render a database URL for logs. `SQLite` paths carry no secrets.
#[cfg(not(feature = "postgres"))]
#[must_use]
pub fn redact_url(database_url: &str) -> String { database_url.to_owned() }
