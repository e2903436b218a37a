//! Database connection pool and migration management.
//!
//! This module provides utilities for:
//! - Creating a PostgreSQL connection pool, with a bounded startup retry
//! - Running database migrations automatically

use std::time::Duration;

use sqlx::{Pool, Postgres};

/// Type alias for PostgreSQL connection pool.
///
/// Instead of writing `Pool<Postgres>` everywhere, we can use `DbPool`.
pub type DbPool = Pool<Postgres>;

/// Connection attempts made before giving up at startup.
const CONNECT_ATTEMPTS: u32 = 3;

/// Fixed delay between startup connection attempts.
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Create a new PostgreSQL connection pool.
///
/// A connection pool maintains multiple database connections that can be
/// reused across HTTP requests which is much more efficient than opening
/// a new connection for each request.
///
/// # Startup Retry
///
/// The database may come up after this service does (container
/// orchestration ordering), so the initial connect is retried a fixed
/// number of times with a fixed delay. This is the only retry loop in
/// the service: steady-state downstream calls are never retried.
///
/// # Errors
///
/// Returns the last connection error once all attempts are exhausted.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let mut attempt = 1;
    loop {
        match sqlx::postgres::PgPoolOptions::new()
            // Limit concurrent connections
            .max_connections(5)
            .connect(database_url)
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(err) if attempt < CONNECT_ATTEMPTS => {
                tracing::warn!(
                    "database connect attempt {attempt}/{CONNECT_ATTEMPTS} failed: {err}, retrying"
                );
                attempt += 1;
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Run database migrations from the `migrations/` directory.
///
/// This function executes all SQL migration files in order. Migrations are
/// tracked in a special `_sqlx_migrations` table, so each migration runs
/// only once.
///
/// # Errors
///
/// Returns an error if:
/// - Migration files cannot be read
/// - SQL syntax errors in migration files
/// - Database errors during migration execution
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    // The macro reads migrations at compile time from ./migrations directory
    sqlx::migrate!("./migrations").run(pool).await
}
