//! Error responses for the admin endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use facebot_db::DatabaseError;
use facebot_pipeline::PipelineError;
use serde::Serialize;

/// Serializable error body returned by the admin surface.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Machine-readable error code (e.g., "NO_ELIGIBLE_RECORD")
    pub code: String,
    /// Human-readable message
    pub message: String,
    #[serde(skip)]
    status: StatusCode,
}

impl ApiError {
    /// Create a new error.
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status,
        }
    }

    /// HTTP status this error is served with.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::NoEligibleRecord { .. } => {
                Self::new(StatusCode::NOT_FOUND, "NO_ELIGIBLE_RECORD", err.to_string())
            }
            PipelineError::Store(err) => err.into(),
            PipelineError::Capability(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "CAPABILITY_FAILED", err.to_string())
            }
            PipelineError::OrchestratorStopped => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "ORCHESTRATOR_STOPPED",
                err.to_string(),
            ),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        if err.is_not_found() {
            return Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string());
        }
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
            format!("Database error: {err}"),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
