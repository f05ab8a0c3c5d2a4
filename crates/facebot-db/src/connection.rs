//! Database connection management.
//!
//! Opens the `SQLite` pool backing the record store. File databases run in
//! WAL mode with a busy timeout so the crawler's inserts and the publisher's
//! updates never fail on lock contention; `:memory:` gives an isolated
//! shared-cache database for tests.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const IN_MEMORY: &str = ":memory:";

/// Open a connection pool for the store at `path`.
///
/// # Errors
/// Returns `DatabaseError::Open` if the path is not valid UTF-8 or the
/// database cannot be opened or created.
pub async fn connect(path: impl AsRef<Path>) -> Result<Pool<Sqlite>> {
    let path_str = path
        .as_ref()
        .to_str()
        .ok_or_else(|| DatabaseError::Open("invalid database path: not valid UTF-8".to_string()))?;

    let mut connect_options = SqliteConnectOptions::from_str(path_str)
        .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    if path_str != IN_MEMORY {
        connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .map_err(|e| DatabaseError::Open(format!("failed to open {path_str}: {e}")))?;

    tracing::info!("Record store opened at {}", path_str);

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_in_memory() {
        let pool = connect(IN_MEMORY).await.expect("open in-memory store");
        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .expect("query in-memory store");
        pool.close().await;
    }

    #[tokio::test]
    async fn test_connect_creates_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("store.db");

        let pool = connect(&path).await.expect("open file store");
        pool.close().await;

        assert!(path.exists());
    }
}
