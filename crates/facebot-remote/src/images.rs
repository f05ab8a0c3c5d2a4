//! Plain HTTP image downloads.

use crate::common::build_http_client;
use crate::error::Result;
use async_trait::async_trait;
use facebot_core::{spawn_decode_image, CapabilityError, CapabilityResult, ImageSource};
use image::DynamicImage;
use reqwest::Client;

/// Downloads images with `GET` and decodes them.
pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    /// Create an image source with the given request timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout_secs)?,
        })
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> CapabilityResult<DynamicImage> {
        let fetch_error = |reason: String| CapabilityError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status.as_u16())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        spawn_decode_image(bytes.to_vec()).await
    }
}
