//! Core error types for facebot.
//!
//! `FacebotError` covers validation of shared types, `ConfigError` covers
//! loading and checking the TOML configuration, and `CapabilityError` is the
//! single error type every external capability (remote API, face service,
//! image I/O) reports through.

use thiserror::Error;

/// Central error type for core operations.
#[derive(Error, Debug)]
pub enum FacebotError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors (invalid identifiers, unknown states)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Config file not found
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where config was expected
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Failures reported by external capabilities.
///
/// All of these are transient from the core's point of view: the current
/// iteration or attempt is abandoned and the next scheduled one starts fresh.
#[derive(Error, Debug)]
pub enum CapabilityError {
    /// Opening or closing a remote session failed
    #[error("session error: {0}")]
    Session(String),

    /// A remote request (accounts, media, followers) failed
    #[error("remote request failed: {0}")]
    Remote(String),

    /// Fetching an image failed
    #[error("image fetch failed for {url}: {reason}")]
    Fetch {
        /// Source URL
        url: String,
        /// Underlying failure
        reason: String,
    },

    /// Image bytes could not be decoded or encoded
    #[error("image codec error: {0}")]
    Codec(String),

    /// Uploading a photo failed
    #[error("upload failed: {0}")]
    Upload(String),

    /// Following an account failed
    #[error("follow failed: {0}")]
    Follow(String),

    /// Face detection or replacement failed
    #[error("face capability error: {0}")]
    Face(String),

    /// Local file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for CapabilityError {
    fn from(err: image::ImageError) -> Self {
        Self::Codec(err.to_string())
    }
}

/// Result type alias using `FacebotError`.
pub type Result<T> = std::result::Result<T, FacebotError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for capability calls.
pub type CapabilityResult<T> = std::result::Result<T, CapabilityError>;
