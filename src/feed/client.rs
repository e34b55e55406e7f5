//! HTTP client for the PhishTank JSON feed

use super::types::FeedEntry;
use reqwest::Client;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while downloading the feed
#[derive(Debug, Error)]
pub enum FeedError {
    /// Request could not be sent or the connection failed
    #[error("Error fetching data from {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Feed endpoint answered with a non-success status
    #[error("Feed request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// Body was not a JSON array of feed entries
    #[error("Failed to decode feed from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Downloads the PhishTank feed
pub struct FeedClient {
    url: String,
    http_client: Client,
}

impl FeedClient {
    /// Creates a feed client with the given request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let url = url.into();
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("phishharvest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| FeedError::Request {
                url: url.clone(),
                source,
            })?;

        Ok(Self { url, http_client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches and decodes the whole feed
    pub async fn fetch(&self) -> Result<Vec<FeedEntry>, FeedError> {
        let start = Instant::now();
        debug!(url = %self.url, "Downloading feed");

        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| FeedError::Request {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| FeedError::Request {
            url: self.url.clone(),
            source,
        })?;

        let entries: Vec<FeedEntry> =
            serde_json::from_slice(&body).map_err(|e| FeedError::Decode {
                url: self.url.clone(),
                message: e.to_string(),
            })?;

        info!(
            entries = entries.len(),
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Feed downloaded"
        );

        Ok(entries)
    }
}
