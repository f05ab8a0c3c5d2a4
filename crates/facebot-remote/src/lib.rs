//! Facebot Remote - HTTP implementations of the capability traits.
//!
//! - [`GatewayApi`] implements `MediaApi` against the media gateway
//! - [`FaceService`] implements `FaceCapability` against the face service
//! - [`HttpImageSource`] implements `ImageSource` with plain `GET`s
//!
//! Every client carries a request timeout taken from configuration; the
//! pipeline itself never cancels in-flight calls.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod common;
pub mod error;
pub mod faces;
pub mod gateway;
pub mod images;

pub use common::build_http_client;
pub use error::{RemoteError, Result};
pub use faces::FaceService;
pub use gateway::{GatewayApi, GatewaySession};
pub use images::HttpImageSource;
