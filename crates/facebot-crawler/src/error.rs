//! Crawler error types.

use facebot_core::CapabilityError;
use thiserror::Error;

/// Why a crawl iteration ended early.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The remote account list is empty
    #[error("no accounts to crawl")]
    NoAccounts,

    /// A remote call failed; the iteration is abandoned
    #[error("remote API error: {0}")]
    Remote(#[from] CapabilityError),

    /// The ingestion side dropped its receiver; the crawler stops
    #[error("discovery consumer is gone")]
    ConsumerGone,
}

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, CrawlError>;
