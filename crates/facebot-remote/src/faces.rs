//! Face service adapter.
//!
//! Images travel as JPEG request bodies. `/detect` answers with face
//! regions, `/replace` with the transformed JPEG.

use crate::common::{build_http_client, check_status, endpoint};
use crate::error::{RemoteError, Result};
use async_trait::async_trait;
use facebot_core::{
    spawn_decode_image, spawn_encode_jpeg, CapabilityError, CapabilityResult, FaceCapability,
    FaceRegion, FaceServiceConfig,
};
use image::DynamicImage;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;

/// HTTP client for the face detection/replacement service.
pub struct FaceService {
    client: Client,
    base_url: String,
}

impl FaceService {
    /// Create a face service client.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &FaceServiceConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config.timeout_secs)?,
            base_url: config.service_url.clone(),
        })
    }

    /// Fail unless the service answers `GET /health` with a success status.
    ///
    /// # Errors
    /// `Network` if the service cannot be reached; `Api` on an error status.
    pub async fn check_available(&self) -> Result<()> {
        let response = self
            .client
            .get(endpoint(&self.base_url, "/health"))
            .send()
            .await?;
        check_status(response, "/health").await?;
        Ok(())
    }

    async fn post_image(&self, path: &str, jpeg: Vec<u8>) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(endpoint(&self.base_url, path))
            .header(CONTENT_TYPE, "image/jpeg")
            .body(jpeg)
            .send()
            .await?;
        check_status(response, path).await
    }

    async fn detect(&self, jpeg: Vec<u8>) -> Result<Vec<FaceRegion>> {
        let response = self.post_image("/detect", jpeg).await?;
        let detected: DetectResponse = response.json().await.map_err(|e| RemoteError::Parse {
            endpoint: "/detect".to_string(),
            message: e.to_string(),
        })?;
        Ok(detected.faces)
    }

    async fn replace(&self, jpeg: Vec<u8>) -> Result<Vec<u8>> {
        let response = self.post_image("/replace", jpeg).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(RemoteError::Parse {
                endpoint: "/replace".to_string(),
                message: "empty image body".to_string(),
            });
        }
        Ok(bytes.to_vec())
    }
}

fn face(e: RemoteError) -> CapabilityError {
    CapabilityError::Face(e.to_string())
}

#[async_trait]
impl FaceCapability for FaceService {
    async fn detect_faces(&self, image: &DynamicImage) -> CapabilityResult<Vec<FaceRegion>> {
        let jpeg = spawn_encode_jpeg(image.clone()).await?;
        self.detect(jpeg).await.map_err(face)
    }

    async fn replace_faces(&self, image: &DynamicImage) -> CapabilityResult<DynamicImage> {
        let jpeg = spawn_encode_jpeg(image.clone()).await?;
        let replaced = self.replace(jpeg).await.map_err(face)?;
        spawn_decode_image(replaced).await
    }
}

#[derive(Deserialize)]
struct DetectResponse {
    #[serde(default)]
    faces: Vec<FaceRegion>,
}
