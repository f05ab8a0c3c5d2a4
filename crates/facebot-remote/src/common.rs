//! Shared HTTP helpers.

use crate::error::{RemoteError, Result};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Build an HTTP client with the given request timeout.
///
/// # Errors
/// Returns error if the HTTP client cannot be created.
pub fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| RemoteError::Internal(format!("failed to create HTTP client: {e}")))
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Append percent-encoded path segments to a base URL.
pub(crate) fn segment_url(base_url: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| RemoteError::Internal(format!("invalid base URL '{base_url}': {e}")))?;
    url.path_segments_mut()
        .map_err(|()| RemoteError::Internal(format!("base URL '{base_url}' cannot have a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Turn a non-success response into `RemoteError::Api`.
pub(crate) async fn check_status(response: Response, endpoint: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(RemoteError::Api {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        message,
    })
}

/// Check the status and parse a JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T> {
    let response = check_status(response, endpoint).await?;
    response.json().await.map_err(|e| RemoteError::Parse {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}
