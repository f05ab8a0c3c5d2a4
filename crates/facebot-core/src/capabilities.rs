//! External capabilities consumed by the crawler, ingestion and publisher.
//!
//! Each collaborator the core does not own is modeled as a trait so the
//! orchestration logic can be driven by real adapters in production and by
//! fakes in tests. Implementations must be `Send + Sync`; they are shared
//! across tasks behind `Arc`.

use crate::error::CapabilityResult;
use crate::types::{Account, AccountId, FaceRegion, MediaItem};
use async_trait::async_trait;
use image::DynamicImage;
use std::path::Path;

/// Entry point to the remote account/media API.
#[async_trait]
pub trait MediaApi: Send + Sync {
    /// Open a session.
    ///
    /// The caller owns the returned session and must call
    /// [`ApiSession::close`] on every exit path.
    async fn open_session(&self) -> CapabilityResult<Box<dyn ApiSession>>;
}

/// A scoped, authenticated handle to the remote API.
#[async_trait]
pub trait ApiSession: Send + Sync {
    /// Accounts whose media should be crawled.
    async fn list_accounts(&self) -> CapabilityResult<Vec<Account>>;

    /// Recent media of one account, in the order the API returns it.
    async fn list_recent_media(&self, account: &Account) -> CapabilityResult<Vec<MediaItem>>;

    /// Followers of an account.
    async fn list_followers(&self, account_id: &AccountId) -> CapabilityResult<Vec<Account>>;

    /// Follow an account.
    async fn follow(&self, account_id: &AccountId) -> CapabilityResult<()>;

    /// Publish a local image file with a caption.
    async fn upload_photo(&self, path: &Path, caption: &str) -> CapabilityResult<()>;

    /// Release the session. No other method is called afterwards.
    async fn close(&self) -> CapabilityResult<()>;
}

/// Face detection and replacement.
#[async_trait]
pub trait FaceCapability: Send + Sync {
    /// Locate faces in an image. An empty result is valid.
    async fn detect_faces(&self, image: &DynamicImage) -> CapabilityResult<Vec<FaceRegion>>;

    /// Produce a copy of the image with every face replaced.
    async fn replace_faces(&self, image: &DynamicImage) -> CapabilityResult<DynamicImage>;
}

/// Fetches and decodes remote images.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Download the image at `url` and decode it.
    async fn fetch(&self, url: &str) -> CapabilityResult<DynamicImage>;
}

/// Encodes images to local files.
#[async_trait]
pub trait ImageSink: Send + Sync {
    /// Write `image` to `path`, creating parent directories as needed.
    async fn write(&self, path: &Path, image: &DynamicImage) -> CapabilityResult<()>;
}
