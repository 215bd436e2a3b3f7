// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use url::Url;

use crate::error::{FetchError, Result};
use crate::models::FetchConfig;

/// Create a configured asynchronous HTTP client.
///
/// One client is shared across a run so connections are pooled.
pub fn create_async_client(config: &FetchConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Parse a normalized URL, mapping failures into the fetch taxonomy.
pub fn parse_url(url: &str) -> std::result::Result<Url, FetchError> {
    Url::parse(url).map_err(|e| FetchError::invalid_url(url, e))
}

/// Send a GET and reject non-2xx responses.
async fn get_checked(
    client: &reqwest::Client,
    url: &Url,
) -> std::result::Result<reqwest::Response, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| FetchError::network(url.as_str(), e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

/// GET a URL and return the body bytes. Non-2xx responses are errors.
pub async fn fetch_bytes(
    client: &reqwest::Client,
    url: &Url,
) -> std::result::Result<Vec<u8>, FetchError> {
    let body = get_checked(client, url)
        .await?
        .bytes()
        .await
        .map_err(|e| FetchError::network(url.as_str(), e))?;
    Ok(body.to_vec())
}

/// GET a URL and return the body as text. Non-2xx responses are errors.
///
/// The body is decoded with the `charset` of the `Content-Type` header,
/// falling back to UTF-8 with lossy replacement.
pub async fn fetch_text(
    client: &reqwest::Client,
    url: &Url,
) -> std::result::Result<String, FetchError> {
    get_checked(client, url)
        .await?
        .text()
        .await
        .map_err(|e| FetchError::network(url.as_str(), e))
}
