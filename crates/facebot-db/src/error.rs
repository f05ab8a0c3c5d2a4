//! Database error types.

use facebot_core::{MediaId, RecordState};
use thiserror::Error;

/// Store-specific errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to open or create database connection.
    #[error("failed to open database: {0}")]
    Open(String),

    /// Migration execution failed.
    #[error("migration failed: {0}")]
    Migration(String),

    /// A record with this ID is already stored.
    #[error("record {0} already exists")]
    AlreadyExists(MediaId),

    /// No record with this ID.
    #[error("record {0} not found")]
    NotFound(MediaId),

    /// No record matches the selection criteria.
    #[error("no eligible record with at least {min_faces} faces")]
    NoEligibleRecord {
        /// Face threshold that was requested
        min_faces: u32,
    },

    /// The requested state change is not allowed.
    #[error("record {id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Record ID
        id: MediaId,
        /// Current state
        from: RecordState,
        /// Requested state
        to: RecordState,
    },

    /// A record failed validation before being written.
    #[error("invalid record: {0}")]
    Invalid(String),

    /// Failed to decode database value.
    #[error("decode error: {0}")]
    Decode(String),

    /// Underlying `SQLx` error.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// True for the "nothing matched" errors (`NotFound`, `NoEligibleRecord`).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::NoEligibleRecord { .. })
    }
}

/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
