//! Lightweight capture with a single browser-like HTTP GET
//!
//! Phishing hosts are often slow, huge or actively hostile, so every stage is
//! capped: connect and read timeouts, a redirect limit, a `Content-Length`
//! pre-check, and a byte and wall-clock budget while streaming the body.

use super::PageFetcher;
use crate::util::text::decode_utf8_dropping_invalid;
use async_trait::async_trait;
use bytes::BytesMut;
use rand::seq::IndexedRandom;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CONNECTION, UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use reqwest::{redirect, Client};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Desktop browser identities rotated per request
pub const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
];

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const READ_TIMEOUT: Duration = Duration::from_secs(3);
const STREAM_BUDGET: Duration = Duration::from_secs(3);
const MAX_REDIRECTS: usize = 3;

fn pick_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Capture backend using reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_bytes: usize,
    stream_budget: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher that keeps at most roughly `max_bytes` of each page
    pub fn new(max_bytes: usize) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .pool_max_idle_per_host(10)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self {
            client,
            max_bytes,
            stream_budget: STREAM_BUDGET,
        })
    }

    /// Overrides how long the body may stream before capture stops
    pub fn with_stream_budget(mut self, budget: Duration) -> Self {
        self.stream_budget = budget;
        self
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    async fn try_fetch(&self, url: &str) -> Result<Option<String>, reqwest::Error> {
        let mut response = self
            .client
            .get(url)
            .header(USER_AGENT, pick_user_agent())
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(CONNECTION, "keep-alive")
            .header(UPGRADE_INSECURE_REQUESTS, "1")
            .send()
            .await?;

        if Url::parse(url).ok().as_ref() != Some(response.url()) {
            info!(url, final_url = %response.url(), "Redirected");
        }

        response = response.error_for_status()?;

        if let Some(size) = response.content_length() {
            if size > self.max_bytes as u64 {
                info!(url, size, "Content-Length too large, skipping");
                return Ok(None);
            }
        }

        let mut content = BytesMut::new();
        let start = Instant::now();
        while let Some(chunk) = response.chunk().await? {
            content.extend_from_slice(&chunk);
            if content.len() > self.max_bytes {
                debug!(url, bytes = content.len(), "Size limit reached while streaming");
                break;
            }
            if start.elapsed() > self.stream_budget {
                warn!(url, bytes = content.len(), "Fetch timed out during streaming");
                break;
            }
        }

        Ok(Some(decode_utf8_dropping_invalid(&content)))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        match self.try_fetch(url).await {
            Ok(html) => html,
            Err(e) if e.is_redirect() => {
                warn!(url, "Too many redirects");
                None
            }
            Err(e) => {
                warn!(url, error = %e, "Error fetching URL");
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
