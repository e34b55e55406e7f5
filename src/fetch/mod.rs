//! Page capture backends
//!
//! A capture turns a phishing URL into the HTML a victim would have seen.
//! Captures never fail the run: any error is logged and the page is
//! recorded as failed.
//!
//! - [`BrowserFetcher`]: headless Chrome over WebDriver, sees JS-rendered kits
//! - [`HttpFetcher`]: a single browser-like GET with strict size and time caps

pub mod batch;
pub mod browser;
pub mod http;

pub use batch::fetch_all;
pub use browser::BrowserFetcher;
pub use http::HttpFetcher;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DOM a browser reports after navigating to a page that served nothing
pub const EMPTY_DOCUMENT: &str = "<html><head></head><body></body></html>";

/// Captures the HTML of a single URL
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the page HTML, or `None` if the capture failed
    async fn fetch(&self, url: &str) -> Option<String>;

    /// Short backend name for logs and reports
    fn name(&self) -> &'static str;
}

/// Selectable capture backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherKind {
    #[default]
    Browser,
    Http,
}

impl fmt::Display for FetcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetcherKind::Browser => write!(f, "browser"),
            FetcherKind::Http => write!(f, "http"),
        }
    }
}

impl FromStr for FetcherKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "browser" => Ok(FetcherKind::Browser),
            "http" => Ok(FetcherKind::Http),
            other => Err(format!(
                "Invalid fetcher: {}. Valid options: browser, http",
                other
            )),
        }
    }
}

/// Outcome of one capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Success,
    Failed,
}

impl FetchStatus {
    /// A capture succeeds only when it produced non-empty content
    pub fn of(content: Option<&str>) -> Self {
        match content {
            Some(html) if !html.is_empty() => FetchStatus::Success,
            _ => FetchStatus::Failed,
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStatus::Success => write!(f, "success"),
            FetchStatus::Failed => write!(f, "failed"),
        }
    }
}

/// True for captures that only contain the blank document shell
pub fn is_empty_document(html: &str) -> bool {
    html == EMPTY_DOCUMENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_kind_round_trip() {
        assert_eq!("browser".parse::<FetcherKind>(), Ok(FetcherKind::Browser));
        assert_eq!(" Http ".parse::<FetcherKind>(), Ok(FetcherKind::Http));
        assert!("curl".parse::<FetcherKind>().is_err());
        assert_eq!(FetcherKind::Http.to_string(), "http");
        assert_eq!(FetcherKind::default(), FetcherKind::Browser);
    }

    #[test]
    fn test_fetch_status() {
        assert_eq!(FetchStatus::of(Some("<html>x</html>")), FetchStatus::Success);
        assert_eq!(FetchStatus::of(Some("")), FetchStatus::Failed);
        assert_eq!(FetchStatus::of(None), FetchStatus::Failed);
        assert_eq!(FetchStatus::Success.to_string(), "success");
    }

    #[test]
    fn test_empty_document() {
        assert!(is_empty_document(EMPTY_DOCUMENT));
        assert!(!is_empty_document("<html><head></head><body>hi</body></html>"));
    }
}
