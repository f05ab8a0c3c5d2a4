//! Facebot Core - Foundation crate for facebot.
//!
//! This crate provides the shared domain types, the capability traits the
//! core consumes, configuration loading and error types that every other
//! facebot crate depends on.
//!
//! # Modules
//!
//! - [`error`] - Error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - `MediaItem`, `Account`, `Record` and `RecordState`
//! - [`capabilities`] - Traits for the remote API, face service and image I/O
//! - [`codec`] - JPEG encoding and image decoding

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod capabilities;
pub mod codec;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use capabilities::{ApiSession, FaceCapability, ImageSink, ImageSource, MediaApi};
pub use codec::{decode_image, encode_jpeg, spawn_decode_image, spawn_encode_jpeg};
pub use config::{
    AdminConfig, ApiConfig, AppConfig, CrawlerConfig, FaceServiceConfig, IngestConfig,
    PublisherConfig, ScheduleConfig, StoreConfig,
};
pub use error::{
    CapabilityError, CapabilityResult, ConfigError, ConfigResult, FacebotError, Result,
};
pub use types::{Account, AccountId, FaceRegion, MediaId, MediaItem, Record, RecordState};
