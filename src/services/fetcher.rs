// src/services/fetcher.rs

//! Content fetcher: one outbound request per call, then offline parsing.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{FetchError, Result};
use crate::models::{FetchConfig, FetchedItem};
use crate::services::feed::parse_feed;
use crate::services::selector::{extract_by_selector, parse_selector};
use crate::utils::http::{create_async_client, fetch_bytes, fetch_text, parse_url};
use crate::utils::normalize;

/// Retrieves the most recent item of a source.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Feed strategy: first entry of an RSS/Atom feed.
    async fn fetch_feed(&self, url: &str) -> std::result::Result<Option<FetchedItem>, FetchError>;

    /// Selector strategy: first element matching `selector` on a page.
    async fn fetch_by_selector(
        &self,
        url: &str,
        selector: &str,
    ) -> std::result::Result<Option<FetchedItem>, FetchError>;
}

/// [`ContentFetcher`] backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with its own configured client.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self::with_client(create_async_client(config)?))
    }

    /// Reuse an existing client (and its connection pool).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch_feed(&self, url: &str) -> std::result::Result<Option<FetchedItem>, FetchError> {
        let url = parse_url(&normalize(url))?;
        let body = fetch_bytes(&self.client, &url).await?;
        parse_feed(&body, &url)
    }

    async fn fetch_by_selector(
        &self,
        url: &str,
        selector: &str,
    ) -> std::result::Result<Option<FetchedItem>, FetchError> {
        // Reject a bad selector before spending a request on it.
        parse_selector(selector)?;

        let url = parse_url(&normalize(url))?;
        let html = fetch_text(&self.client, &url).await?;
        extract_by_selector(&html, selector, &url)
    }
}
