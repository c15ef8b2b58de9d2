use std::future::Future;
use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::db::{db_url, StoreKind};
use crate::error::AppError;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_INTERVAL_MS: u64 = 500;

/// Connect to the configured store and bring its schema up to date.
///
/// SQLite `:memory:` gives every connection its own database, so that pool is
/// pinned to a single connection and migrated on it.
pub async fn bootstrap_db(kind: StoreKind) -> Result<DatabaseConnection, AppError> {
    let url = db_url(kind)?;
    info!(store = ?kind, "Database bootstrap starting");

    let mut opts = ConnectOptions::new(url);
    opts.acquire_timeout(Duration::from_secs(2))
        .sqlx_logging(false);
    match kind {
        StoreKind::SqliteMemory => {
            opts.min_connections(1).max_connections(1);
        }
        _ => {
            opts.min_connections(1).max_connections(10);
        }
    }

    let conn = match kind {
        StoreKind::Postgres => {
            retry_connection(
                || {
                    let opts = opts.clone();
                    async move {
                        Database::connect(opts).await.map_err(|e| {
                            AppError::config(format!("Failed to connect to Postgres: {e}"))
                        })
                    }
                },
                CONNECT_ATTEMPTS,
                CONNECT_INTERVAL_MS,
            )
            .await?
        }
        _ => Database::connect(opts)
            .await
            .map_err(|e| AppError::config(format!("Failed to connect to database: {e}")))?,
    };

    migrate(&conn, MigrationCommand::Up).await?;
    info!(store = ?kind, "Database ready");
    Ok(conn)
}

async fn retry_connection<T, F, Fut>(
    mut connect: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;
    loop {
        match connect().await {
            Ok(conn) => {
                if attempt > 1 {
                    info!(attempts = attempt, "Connection succeeded after retry");
                }
                return Ok(conn);
            }
            Err(e) if attempt < max_attempts => {
                warn!(attempt, max_attempts, error = %e, "Connection attempt failed");
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
