//! Remote media gateway adapter.
//!
//! The gateway fronts the photo-sharing account. A session is a bearer
//! token obtained with the configured credentials and revoked on close.

use crate::common::{build_http_client, check_status, read_json, segment_url};
use crate::error::{RemoteError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use facebot_core::{
    Account, AccountId, ApiConfig, ApiSession, CapabilityError, CapabilityResult, MediaApi,
    MediaId, MediaItem,
};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Gateway client; opens [`GatewaySession`]s.
pub struct GatewayApi {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl GatewayApi {
    /// Create a gateway client from the API configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config.timeout_secs)?,
            base_url: config.base_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    async fn login(&self) -> Result<String> {
        let url = segment_url(&self.base_url, &["sessions"])?;
        let response = self
            .client
            .post(url)
            .json(&SessionRequest {
                username: &self.username,
                password: &self.password,
            })
            .send()
            .await?;
        let session: SessionResponse = read_json(response, "/sessions").await?;
        Ok(session.token)
    }
}

#[async_trait]
impl MediaApi for GatewayApi {
    async fn open_session(&self) -> CapabilityResult<Box<dyn ApiSession>> {
        let token = self
            .login()
            .await
            .map_err(|e| CapabilityError::Session(e.to_string()))?;
        debug!("Opened gateway session as {}", self.username);
        Ok(Box::new(GatewaySession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token,
        }))
    }
}

/// An authenticated gateway session.
pub struct GatewaySession {
    client: Client,
    base_url: String,
    token: String,
}

impl GatewaySession {
    fn url(&self, segments: &[&str]) -> Result<Url> {
        segment_url(&self.base_url, segments)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.url(segments)?;
        let label = url.path().to_string();
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        read_json(response, &label).await
    }

    async fn post_json<B: Serialize + Sync>(&self, segments: &[&str], body: &B) -> Result<()> {
        let url = self.url(segments)?;
        let label = url.path().to_string();
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        check_status(response, &label).await?;
        Ok(())
    }

    async fn upload(&self, path: &Path, caption: &str) -> Result<()> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RemoteError::Internal(format!("cannot read {}: {e}", path.display())))?;
        self.post_json(
            &["uploads"],
            &UploadRequest {
                image: STANDARD.encode(bytes),
                caption,
            },
        )
        .await
    }
}

fn remote(e: RemoteError) -> CapabilityError {
    CapabilityError::Remote(e.to_string())
}

#[async_trait]
impl ApiSession for GatewaySession {
    async fn list_accounts(&self) -> CapabilityResult<Vec<Account>> {
        let accounts: Vec<AccountDto> = self.get_json(&["accounts"]).await.map_err(remote)?;
        Ok(accounts.into_iter().map(Account::from).collect())
    }

    async fn list_recent_media(&self, account: &Account) -> CapabilityResult<Vec<MediaItem>> {
        let media: Vec<MediaDto> = self
            .get_json(&["accounts", account.id.as_str(), "media"])
            .await
            .map_err(remote)?;

        let mut items = Vec::with_capacity(media.len());
        for dto in media {
            match MediaId::new(dto.id) {
                Ok(id) => items.push(MediaItem {
                    id,
                    url: dto.url,
                    account_id: account.id.clone(),
                    username: account.username.clone(),
                }),
                Err(e) => warn!("Skipping media of @{}: {}", account.username, e),
            }
        }
        Ok(items)
    }

    async fn list_followers(&self, account_id: &AccountId) -> CapabilityResult<Vec<Account>> {
        let followers: Vec<AccountDto> = self
            .get_json(&["accounts", account_id.as_str(), "followers"])
            .await
            .map_err(remote)?;
        Ok(followers.into_iter().map(Account::from).collect())
    }

    async fn follow(&self, account_id: &AccountId) -> CapabilityResult<()> {
        self.post_json(
            &["follows"],
            &FollowRequest {
                account_id: account_id.as_str(),
            },
        )
        .await
        .map_err(|e| CapabilityError::Follow(e.to_string()))
    }

    async fn upload_photo(&self, path: &Path, caption: &str) -> CapabilityResult<()> {
        self.upload(path, caption)
            .await
            .map_err(|e| CapabilityError::Upload(e.to_string()))
    }

    async fn close(&self) -> CapabilityResult<()> {
        let url = self
            .url(&["sessions", self.token.as_str()])
            .map_err(|e| CapabilityError::Session(e.to_string()))?;
        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| CapabilityError::Session(e.to_string()))?;
        check_status(response, "/sessions")
            .await
            .map_err(|e| CapabilityError::Session(e.to_string()))?;
        Ok(())
    }
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct SessionResponse {
    token: String,
}

#[derive(Deserialize)]
struct AccountDto {
    id: String,
    username: String,
}

impl From<AccountDto> for Account {
    fn from(dto: AccountDto) -> Self {
        Account::new(dto.id, dto.username)
    }
}

#[derive(Deserialize)]
struct MediaDto {
    id: String,
    url: String,
}

#[derive(Serialize)]
struct FollowRequest<'a> {
    account_id: &'a str,
}

#[derive(Serialize)]
struct UploadRequest<'a> {
    image: String,
    caption: &'a str,
}
