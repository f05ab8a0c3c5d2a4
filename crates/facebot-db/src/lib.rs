//! Facebot Database Layer
//!
//! The durable record store. Each discovered media item becomes one row in
//! the `records` table, keyed by media ID, carrying its face count and
//! lifecycle state.
//!
//! # Example
//!
//! ```ignore
//! use facebot_db::Database;
//!
//! let db = Database::open("store.db").await?;
//! if !db.has(&item.id).await? {
//!     db.put(&Record::available(item, faces)).await?;
//! }
//! let candidate = db.search_random(1).await?;
//! db.set_state(candidate.id(), RecordState::Used).await?;
//! ```
//!
//! # Design Principles
//!
//! - Every store operation is one SQL statement and therefore atomic
//! - State transitions are validated in the `UPDATE` predicate, never
//!   read-then-write
//! - Records are never deleted; `reset_states` is the only way back to
//!   `Available`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod migrations;
pub mod records;

// Re-export commonly used types
pub use error::{DatabaseError, Result};
pub use records::{FaceCountBucket, StateCounts, StateStats};

use std::path::Path;

/// Handle to the record store.
///
/// Cheap to share behind an `Arc`; the underlying pool hands out
/// connections to concurrent callers.
#[derive(Debug, Clone)]
pub struct Database {
    pool: sqlx::Pool<sqlx::Sqlite>,
}

impl Database {
    /// Open (or create) the store at `path` and apply pending migrations.
    ///
    /// Use `:memory:` for an in-memory store.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    /// Callers treat this as fatal at startup.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let pool = connection::connect(path).await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run all pending database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Get the current schema version.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(&self.pool).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        &self.pool
    }

    /// Close the database connection gracefully.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Record store closed");
    }
}
