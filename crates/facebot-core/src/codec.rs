//! JPEG encoding and image decoding shared by the adapters and the sink.

use crate::error::{CapabilityError, CapabilityResult};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Encode an image as JPEG.
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn encode_jpeg(image: &DynamicImage) -> CapabilityResult<Vec<u8>> {
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut buf = Cursor::new(Vec::new());
    rgb.write_to(&mut buf, ImageFormat::Jpeg)?;
    Ok(buf.into_inner())
}

/// Decode image bytes, guessing the format from the content.
pub fn decode_image(bytes: &[u8]) -> CapabilityResult<DynamicImage> {
    if bytes.is_empty() {
        return Err(CapabilityError::Codec("empty image body".into()));
    }
    Ok(image::load_from_memory(bytes)?)
}

/// [`encode_jpeg`] on the blocking thread pool.
pub async fn spawn_encode_jpeg(image: DynamicImage) -> CapabilityResult<Vec<u8>> {
    tokio::task::spawn_blocking(move || encode_jpeg(&image))
        .await
        .map_err(|e| CapabilityError::Codec(format!("encoder task failed: {e}")))?
}

/// [`decode_image`] on the blocking thread pool.
pub async fn spawn_decode_image(bytes: Vec<u8>) -> CapabilityResult<DynamicImage> {
    tokio::task::spawn_blocking(move || decode_image(&bytes))
        .await
        .map_err(|e| CapabilityError::Codec(format!("decoder task failed: {e}")))?
}
