//! Publishing: pick an eligible record, render it, optionally upload it.
//!
//! Every attempt that gets a candidate ends with exactly one terminal
//! transition: `Used` once the render (and upload, when enabled) succeeded,
//! `Rejected` on any failure after selection. Following a random follower
//! of the source account happens after the record is `Used` and cannot
//! change its state.

use crate::captions::CaptionRotation;
use crate::error::Result;
use facebot_core::{
    spawn_decode_image, Account, AccountId, ApiSession, CapabilityError, CapabilityResult,
    FaceCapability, ImageSink, ImageSource, MediaApi, PublisherConfig, Record, RecordState,
};
use facebot_db::Database;
use image::DynamicImage;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Publisher behavior switches.
#[derive(Debug, Clone)]
pub struct PublishSettings {
    /// Minimum detected faces for a record to be eligible
    pub min_faces: u32,
    /// Upload rendered images to the remote API
    pub upload: bool,
    /// After an upload, follow one random follower of the source account
    pub auto_follow: bool,
    /// Directory rendered images are written to
    pub output_dir: PathBuf,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self::from(&PublisherConfig::default())
    }
}

impl From<&PublisherConfig> for PublishSettings {
    fn from(config: &PublisherConfig) -> Self {
        Self {
            min_faces: config.min_faces,
            upload: config.upload,
            auto_follow: config.auto_follow,
            output_dir: config.output_dir.clone(),
        }
    }
}

/// Result of a successful publish attempt.
#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    /// The record that was published (now `Used`)
    pub record: Record,
    /// Where the rendered image was written
    pub output: PathBuf,
    /// Caption used for the upload, if one happened
    pub caption: Option<String>,
    /// Account followed after the upload
    pub followed: Option<Account>,
    /// Why the follow step failed, if it did
    pub follow_error: Option<String>,
}

impl PublishOutcome {
    /// Whether the image was uploaded.
    #[must_use]
    pub fn uploaded(&self) -> bool {
        self.caption.is_some()
    }
}

/// A transformed candidate that was not persisted anywhere.
#[derive(Debug, Clone)]
pub struct DemoRender {
    /// The candidate; its state is untouched
    pub record: Record,
    /// The face-replaced image
    pub image: DynamicImage,
}

/// Drives a publish attempt against the store and the capabilities.
pub struct Publisher {
    db: Database,
    api: Arc<dyn MediaApi>,
    images: Arc<dyn ImageSource>,
    faces: Arc<dyn FaceCapability>,
    sink: Arc<dyn ImageSink>,
    settings: PublishSettings,
}

impl Publisher {
    /// Create a publisher.
    #[must_use]
    pub fn new(
        db: Database,
        api: Arc<dyn MediaApi>,
        images: Arc<dyn ImageSource>,
        faces: Arc<dyn FaceCapability>,
        sink: Arc<dyn ImageSink>,
        settings: PublishSettings,
    ) -> Self {
        Self {
            db,
            api,
            images,
            faces,
            sink,
            settings,
        }
    }

    fn min_faces(&self) -> u32 {
        self.settings.min_faces.max(1)
    }

    /// Output path for a record.
    #[must_use]
    pub fn output_path(&self, record: &Record) -> PathBuf {
        self.settings
            .output_dir
            .join(format!("{}.jpeg", record.id()))
    }

    /// Run one publish attempt.
    ///
    /// # Errors
    /// `NoEligibleRecord` when nothing qualifies (no state changes). Any
    /// other error means the candidate has been moved to `Rejected`.
    pub async fn publish(&self, captions: &mut CaptionRotation) -> Result<PublishOutcome> {
        let record = self.db.search_random(self.min_faces()).await?;
        info!("Publishing {}", record);

        match self.attempt(&record, captions).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Publishing {} failed: {}", record.id(), e);
                if let Err(state_err) = self.db.set_state(record.id(), RecordState::Rejected).await
                {
                    error!("Failed to reject {}: {}", record.id(), state_err);
                }
                Err(e)
            }
        }
    }

    async fn attempt(
        &self,
        record: &Record,
        captions: &mut CaptionRotation,
    ) -> Result<PublishOutcome> {
        let rendered = self.render(record).await?;
        let output = self.output_path(record);
        self.sink.write(&output, &rendered).await?;

        if !self.settings.upload {
            self.db.set_state(record.id(), RecordState::Used).await?;
            info!("Rendered {} to {}", record.id(), output.display());
            return Ok(PublishOutcome {
                record: used(record),
                output,
                caption: None,
                followed: None,
                follow_error: None,
            });
        }

        let session = self.api.open_session().await?;
        let result = self
            .deliver(session.as_ref(), record, output, captions)
            .await;
        if let Err(e) = session.close().await {
            warn!("Failed to close publish session: {}", e);
        }
        result
    }

    async fn deliver(
        &self,
        session: &dyn ApiSession,
        record: &Record,
        output: PathBuf,
        captions: &mut CaptionRotation,
    ) -> Result<PublishOutcome> {
        let caption = captions.next_caption(&record.media.username);
        session.upload_photo(&output, &caption).await?;
        self.db.set_state(record.id(), RecordState::Used).await?;
        info!("Uploaded {}", record.id());

        let mut outcome = PublishOutcome {
            record: used(record),
            output,
            caption: Some(caption),
            followed: None,
            follow_error: None,
        };

        if self.settings.auto_follow {
            match follow_random(session, &record.media.account_id).await {
                Ok(followed) => outcome.followed = followed,
                Err(e) => {
                    warn!("Auto-follow after {} failed: {}", record.id(), e);
                    outcome.follow_error = Some(e.to_string());
                }
            }
        }

        Ok(outcome)
    }

    async fn render(&self, record: &Record) -> Result<DynamicImage> {
        let image = self.images.fetch(&record.media.url).await?;
        Ok(self.faces.replace_faces(&image).await?)
    }

    /// Select and transform a candidate without writing or changing state.
    pub async fn demo(&self) -> Result<DemoRender> {
        let record = self.db.search_random(self.min_faces()).await?;
        let image = self.render(&record).await?;
        Ok(DemoRender { record, image })
    }
}

/// Replace faces in a local image file and write the result to `out`.
///
/// Touches neither the store nor the remote API.
pub async fn render_file(
    faces: &dyn FaceCapability,
    sink: &dyn ImageSink,
    input: &Path,
    out: &Path,
) -> Result<()> {
    let bytes = tokio::fs::read(input).await.map_err(CapabilityError::from)?;
    let image = spawn_decode_image(bytes).await?;
    let rendered = faces.replace_faces(&image).await?;
    sink.write(out, &rendered).await?;
    Ok(())
}

fn used(record: &Record) -> Record {
    Record {
        state: RecordState::Used,
        ..record.clone()
    }
}

/// Follow one follower of `account_id`, chosen uniformly at random.
///
/// Returns `None` without following anyone when there are no followers.
pub async fn follow_random(
    session: &dyn ApiSession,
    account_id: &AccountId,
) -> CapabilityResult<Option<Account>> {
    let followers = session.list_followers(account_id).await?;
    let pick = {
        let mut rng = rand::thread_rng();
        followers.choose(&mut rng).cloned()
    };
    let Some(pick) = pick else {
        return Ok(None);
    };

    session.follow(&pick.id).await?;
    info!("Followed @{}", pick.username);
    Ok(Some(pick))
}
