//! Facebot Crawler - discovers media from followed accounts.
//!
//! A [`Crawler`] visits one account per iteration, round-robin over a
//! cached account snapshot, and hands every recent media item to a single
//! consumer through a [`rendezvous`] channel. The hand-off has no buffer:
//! the crawler waits for the consumer, which is what throttles discovery.
//!
//! # Example
//!
//! ```rust,ignore
//! use facebot_crawler::{rendezvous, Crawler};
//!
//! let (tx, mut rx) = rendezvous();
//! Crawler::new(api, tx).with_interval(interval).spawn();
//! while let Some(item) = rx.recv().await {
//!     ingest(item).await;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod crawler;
pub mod error;
pub mod handoff;

// Re-export commonly used types
pub use crawler::{Crawler, DEFAULT_INTERVAL};
pub use error::{CrawlError, Result};
pub use handoff::{rendezvous, HandoffClosed, HandoffReceiver, HandoffSender};
