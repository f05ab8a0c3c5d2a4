//! Facebot Pipeline - ingestion, publishing and orchestration.
//!
//! Discovered media flows crawler -> [`IngestionHandler`] -> store. Publish
//! attempts flow trigger -> [`OrchestratorHandle`] -> control task ->
//! [`Publisher`] -> store, output directory and (optionally) the remote
//! API.
//!
//! # Example
//!
//! ```rust,ignore
//! use facebot_pipeline::{Capabilities, CaptionRotation, Orchestrator, OrchestratorSettings};
//!
//! let running = Orchestrator::new(db, capabilities, OrchestratorSettings::from(&config))
//!     .start(CaptionRotation::load(&path)?.shuffled());
//! running.drive(&mode).await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod captions;
pub mod error;
pub mod ingest;
pub mod orchestrator;
pub mod publish;
pub mod sink;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use captions::{credit_line, CaptionRotation};
pub use error::{PipelineError, Result};
pub use ingest::{IngestOutcome, IngestionHandler};
pub use orchestrator::{
    spawn_control, Capabilities, Orchestrator, OrchestratorHandle, OrchestratorSettings, Running,
};
pub use publish::{
    follow_random, render_file, DemoRender, PublishOutcome, PublishSettings, Publisher,
};
pub use sink::JpegFileSink;
