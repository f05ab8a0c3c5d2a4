//! Local JPEG output.

use async_trait::async_trait;
use facebot_core::{spawn_encode_jpeg, CapabilityResult, ImageSink};
use image::DynamicImage;
use std::path::Path;

/// Writes images as JPEG files.
#[derive(Debug, Default, Clone, Copy)]
pub struct JpegFileSink;

#[async_trait]
impl ImageSink for JpegFileSink {
    async fn write(&self, path: &Path, image: &DynamicImage) -> CapabilityResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = spawn_encode_jpeg(image.clone()).await?;
        tokio::fs::write(path, bytes).await?;
        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }
}
