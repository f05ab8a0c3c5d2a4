//! Ingestion: the single consumer of discovered media.
//!
//! Every item is handled to completion before the next one is taken off the
//! hand-off, so ingestion order equals emission order and the crawler is
//! throttled by the consumer's pace, including the random delay between
//! items.

use crate::error::Result;
use facebot_core::{FaceCapability, ImageSource, MediaItem, Record};
use facebot_crawler::HandoffReceiver;
use facebot_db::{Database, DatabaseError};
use rand::Rng;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default random delay between items, in seconds.
pub const DEFAULT_DELAY_SECS: RangeInclusive<u64> = 0..=59;

/// What happened to one discovered item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The id is already in the store; nothing was done.
    AlreadyKnown,
    /// A new `Available` record was stored.
    Stored {
        /// Number of detected faces
        face_count: u32,
    },
}

/// Deduplicates discovered items and records them with their face count.
#[derive(Clone)]
pub struct IngestionHandler {
    db: Database,
    images: Arc<dyn ImageSource>,
    faces: Arc<dyn FaceCapability>,
    delay_secs: RangeInclusive<u64>,
}

impl IngestionHandler {
    /// Create a handler with the default inter-item delay.
    #[must_use]
    pub fn new(db: Database, images: Arc<dyn ImageSource>, faces: Arc<dyn FaceCapability>) -> Self {
        Self {
            db,
            images,
            faces,
            delay_secs: DEFAULT_DELAY_SECS,
        }
    }

    /// Set the inclusive range the inter-item delay is drawn from.
    #[must_use]
    pub fn with_delay_secs(mut self, delay_secs: RangeInclusive<u64>) -> Self {
        self.delay_secs = delay_secs;
        self
    }

    /// Ingest one item.
    ///
    /// Items already in the store are a no-op. A fetch or detection failure
    /// drops the item without persisting anything; the error is returned
    /// for logging only. Records are stored whatever their face count.
    pub async fn handle(&self, item: MediaItem) -> Result<IngestOutcome> {
        if self.db.has(&item.id).await? {
            debug!("Skipping known media {}", item.id);
            return Ok(IngestOutcome::AlreadyKnown);
        }

        let image = self.images.fetch(&item.url).await?;
        let regions = self.faces.detect_faces(&image).await?;
        let face_count = u32::try_from(regions.len()).unwrap_or(u32::MAX);

        let record = Record::available(item, face_count);
        match self.db.put(&record).await {
            Ok(()) => {
                info!("Stored {}", record);
                Ok(IngestOutcome::Stored { face_count })
            }
            // Only reachable if something else wrote the id since `has`.
            Err(DatabaseError::AlreadyExists(_)) => Ok(IngestOutcome::AlreadyKnown),
            Err(e) => Err(e.into()),
        }
    }

    fn next_delay(&self) -> Duration {
        let (min, max) = (*self.delay_secs.start(), *self.delay_secs.end());
        if min >= max {
            return Duration::from_secs(min);
        }
        let secs = rand::thread_rng().gen_range(min..=max);
        Duration::from_secs(secs)
    }

    /// Consume the hand-off until the producer side is dropped.
    pub async fn run(self, mut rx: HandoffReceiver<MediaItem>) {
        info!("Ingestion consumer started");
        while let Some(item) = rx.recv().await {
            let id = item.id.clone();
            match self.handle(item).await {
                Ok(IngestOutcome::AlreadyKnown) => {}
                Ok(IngestOutcome::Stored { face_count }) => {
                    debug!("Ingested {} with {} faces", id, face_count);
                }
                Err(e) => warn!("Dropped media {}: {}", id, e),
            }
            tokio::time::sleep(self.next_delay()).await;
        }
        info!("Discovery stream closed; ingestion consumer stopping");
    }
}
