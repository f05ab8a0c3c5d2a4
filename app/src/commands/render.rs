//! Local rendering commands: exercise the face service without the store.

use anyhow::Context;
use facebot_core::{AppConfig, FaceCapability, ImageSink};
use facebot_pipeline::{render_file, JpegFileSink};
use facebot_remote::FaceService;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

fn default_output(config: &AppConfig, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "image".to_string(), |s| s.to_string_lossy().into_owned());
    config.publisher.output_dir.join(format!("{stem}.jpeg"))
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Render one local image.
pub async fn test_image(config: &AppConfig, input: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let faces = FaceService::new(&config.faces)?;
    let out = out.map_or_else(|| default_output(config, input), Path::to_path_buf);

    render_file(&faces, &JpegFileSink, input, &out)
        .await
        .with_context(|| format!("failed to render {}", input.display()))?;
    println!("{}", out.display());
    Ok(())
}

/// Render every image in `dir`; failures are reported and skipped.
pub async fn test_dir(config: &AppConfig, dir: &Path) -> anyhow::Result<()> {
    let faces = FaceService::new(&config.faces)?;
    let (rendered, failed) = render_dir(&faces, &JpegFileSink, config, dir).await?;
    println!("Rendered {rendered} images, {failed} failed");
    Ok(())
}

/// Render the images of `dir` into the output directory.
///
/// Returns `(rendered, failed)`.
pub async fn render_dir(
    faces: &dyn FaceCapability,
    sink: &dyn ImageSink,
    config: &AppConfig,
    dir: &Path,
) -> anyhow::Result<(usize, usize)> {
    let mut inputs: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_image(path))
        .collect();
    inputs.sort();

    let (mut rendered, mut failed) = (0, 0);
    for input in inputs {
        let out = default_output(config, &input);
        match render_file(faces, sink, &input, &out).await {
            Ok(()) => {
                info!("Rendered {} -> {}", input.display(), out.display());
                rendered += 1;
            }
            Err(e) => {
                warn!("Failed to render {}: {}", input.display(), e);
                failed += 1;
            }
        }
    }
    Ok((rendered, failed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use facebot_core::{CapabilityResult, FaceRegion};
    use image::{DynamicImage, Rgb, RgbImage};

    struct Mirror;

    #[async_trait]
    impl FaceCapability for Mirror {
        async fn detect_faces(&self, _image: &DynamicImage) -> CapabilityResult<Vec<FaceRegion>> {
            Ok(Vec::new())
        }

        async fn replace_faces(&self, image: &DynamicImage) -> CapabilityResult<DynamicImage> {
            Ok(image.fliph())
        }
    }

    #[test]
    fn test_default_output_uses_stem() {
        let config = AppConfig::default();
        assert_eq!(
            default_output(&config, Path::new("/tmp/in/photo.PNG")),
            config.publisher.output_dir.join("photo.jpeg")
        );
    }

    #[tokio::test]
    async fn test_render_dir_skips_non_images_and_counts_failures() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let input = dir.path().join("in");
        std::fs::create_dir(&input).expect("mkdir");

        DynamicImage::ImageRgb8(RgbImage::from_pixel(6, 6, Rgb([1, 2, 3])))
            .save(input.join("a.png"))
            .expect("save");
        std::fs::write(input.join("broken.jpg"), b"not a jpeg").expect("write");
        std::fs::write(input.join("notes.txt"), b"ignore me").expect("write");

        let mut config = AppConfig::default();
        config.publisher.output_dir = dir.path().join("out");

        let (rendered, failed) = render_dir(&Mirror, &JpegFileSink, &config, &input)
            .await
            .expect("render dir");

        assert_eq!((rendered, failed), (1, 1));
        assert!(dir.path().join("out").join("a.jpeg").exists());
    }
}
