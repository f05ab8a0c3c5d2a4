//! Pipeline error types.

use facebot_core::CapabilityError;
use facebot_db::DatabaseError;
use thiserror::Error;

/// Errors from ingestion, publishing and the orchestrator.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No `Available` record meets the face threshold.
    #[error("no eligible record with at least {min_faces} faces")]
    NoEligibleRecord {
        /// Threshold that was applied
        min_faces: u32,
    },

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(DatabaseError),

    /// An external capability failed.
    #[error("{0}")]
    Capability(#[from] CapabilityError),

    /// The orchestrator control task is no longer running.
    #[error("orchestrator stopped")]
    OrchestratorStopped,
}

impl PipelineError {
    /// True when nothing was eligible for publishing.
    #[must_use]
    pub fn is_no_eligible_record(&self) -> bool {
        matches!(self, Self::NoEligibleRecord { .. })
    }
}

impl From<DatabaseError> for PipelineError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NoEligibleRecord { min_faces } => Self::NoEligibleRecord { min_faces },
            other => Self::Store(other),
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
