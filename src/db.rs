use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::info;

use crate::{AppError, AppResult};

const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Opens an existing catalog. The repair pass is sequential, so the pool
/// holds a single connection for the whole run.
pub async fn open_pool(db_path: &Path) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(false)
        .synchronous(SqliteSynchronous::Full)
        .busy_timeout(BUSY_TIMEOUT)
        .log_statements(log::LevelFilter::Off);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|err| {
            AppError::from(err)
                .with_context("operation", "open_pool")
                .with_context("path", db_path.display().to_string())
        })?;

    let (sqlite_version,): (String,) = sqlx::query_as("select sqlite_version()")
        .fetch_one(&pool)
        .await
        .unwrap_or((String::from("unknown"),));
    info!(
        target: "assetfix",
        event = "db_open",
        path = %db_path.display(),
        sqlite_version = %sqlite_version
    );

    Ok(pool)
}
