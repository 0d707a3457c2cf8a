use std::future::Future;
use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::db::{db_url, DbProfile};
use crate::error::AppError;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_INTERVAL_MS: u64 = 500;
const PINNED_CONNECTION_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

fn engine(profile: DbProfile) -> &'static str {
    match profile {
        DbProfile::Postgres => "postgresql",
        DbProfile::SqliteMemory => "sqlite",
        DbProfile::InMemory => "memory",
    }
}

/// Retry a connection attempt with fixed interval delays.
async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(attempt, interval_ms, "connection_retry=success");
                }
                return Ok(result);
            }
            Err(e) => {
                last_error = Some(e);
                if attempt < max_attempts {
                    warn!(attempt, max_attempts, interval_ms, "connection_retry=failed");
                    tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| AppError::db_unavailable("no connection attempt was made")))
}

/// Connect without running migrations.
///
/// An in-memory SQLite database exists per connection, so its pool is pinned
/// to a single connection that is never recycled.
pub async fn connect_db(profile: DbProfile) -> Result<DatabaseConnection, AppError> {
    let url = db_url(profile)?;
    let mut options = ConnectOptions::new(url);
    options.sqlx_logging(false);
    match profile {
        DbProfile::SqliteMemory => {
            options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(PINNED_CONNECTION_LIFETIME)
                .max_lifetime(PINNED_CONNECTION_LIFETIME);
        }
        _ => {
            options
                .max_connections(10)
                .connect_timeout(Duration::from_secs(5))
                .acquire_timeout(Duration::from_secs(5));
        }
    }

    retry_connection(
        || {
            let options = options.clone();
            async move { Database::connect(options).await.map_err(AppError::from) }
        },
        CONNECT_ATTEMPTS,
        CONNECT_INTERVAL_MS,
    )
    .await
}

/// Single entrypoint used by the server and tests: connect, then migrate up.
pub async fn bootstrap_db(profile: DbProfile) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(profile).await?;
    migrate(&conn, MigrationCommand::Up).await?;
    info!(engine = engine(profile), "Database ready");
    Ok(conn)
}
