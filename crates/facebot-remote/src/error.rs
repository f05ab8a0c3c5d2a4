//! Error types for the HTTP adapters.

use thiserror::Error;

/// Errors raised while talking to a remote service.
///
/// Adapters convert these into the matching
/// [`CapabilityError`](facebot_core::CapabilityError) variant at the trait
/// boundary.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The service answered with a non-success status
    #[error("{endpoint}: status {status}, {message}")]
    Api {
        /// Request path
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("failed to parse response from {endpoint}: {message}")]
    Parse {
        /// Request path
        endpoint: String,
        /// Error message
        message: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The HTTP client could not be built
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for adapter internals.
pub type Result<T> = std::result::Result<T, RemoteError>;
