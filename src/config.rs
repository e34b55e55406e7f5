//! Configuration management for phishharvest
//!
//! All runtime configuration is read from environment variables so the
//! container entrypoint needs no flags. CLI arguments override individual
//! fields after loading.
//!
//! # Environment Variables
//!
//! - `PHISHHARVEST_FEED_URL`: PhishTank feed - default: online-valid JSON feed
//! - `PHISHHARVEST_MAX_PAGES`: pages captured per run - default: "100"
//! - `PHISHHARVEST_FETCHER`: capture backend (browser|http) - default: "browser"
//! - `PHISHHARVEST_CONCURRENCY`: parallel captures - default: "8"
//! - `PHISHHARVEST_WEBDRIVER_URL`: WebDriver endpoint - default: "http://localhost:4444"
//! - `PHISHHARVEST_PAGE_TIMEOUT`: browser page load timeout in seconds - default: "15"
//! - `PHISHHARVEST_SETTLE_MS`: wait after load before reading the DOM - default: "2000"
//! - `PHISHHARVEST_MAX_PAGE_KB`: HTTP capture size cap - default: "220"
//! - `PHISHHARVEST_REQUEST_TIMEOUT`: feed/upload timeout in seconds - default: "60"
//! - `PHISHHARVEST_TABLE`: destination table - default: "daily_phish"
//! - `PHISHHARVEST_UPLOAD_BATCH`: rows per insert request - default: "50"
//! - `PHISHHARVEST_LOG_LEVEL`: logging level - default: "info"
//! - `SUPABASE_URL`, `SUPABASE_KEY`: Supabase project URL and API key
//!
//! # Example
//!
//! ```no_run
//! use phishharvest::HarvestConfig;
//!
//! let config = HarvestConfig::default();
//! config.validate().expect("Invalid configuration");
//! let (url, _key) = config.supabase_credentials().expect("Supabase not configured");
//! println!("Uploading to {}", url);
//! ```

use crate::fetch::FetcherKind;
use crate::util::text::mask_secret;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;
use url::Url;

pub const DEFAULT_FEED_URL: &str = "http://data.phishtank.com/data/online-valid.json";
const DEFAULT_MAX_PAGES: usize = 100;
const DEFAULT_CONCURRENCY: usize = 8;
const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 15;
const DEFAULT_SETTLE_MS: u64 = 2000;
const DEFAULT_MAX_PAGE_KB: usize = 220;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_TABLE: &str = "daily_phish";
const DEFAULT_UPLOAD_BATCH: usize = 50;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Supabase credentials are required but not set
    #[error("Supabase is not configured. Set SUPABASE_URL and SUPABASE_KEY environment variables")]
    MissingSupabase,

    /// A URL-valued setting did not parse
    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: String, value: String },
}

/// Main configuration structure for phishharvest
///
/// `Default::default()` loads from the environment with fallback defaults.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// PhishTank feed URL
    pub feed_url: String,

    /// Maximum number of feed entries to capture per run
    pub max_pages: usize,

    /// Capture backend
    pub fetcher: FetcherKind,

    /// Number of pages captured in parallel
    pub concurrency: usize,

    /// WebDriver server URL for the browser backend
    pub webdriver_url: String,

    /// Browser page load timeout in seconds
    pub page_timeout_secs: u64,

    /// Delay after navigation before the DOM is read, in milliseconds
    pub settle_ms: u64,

    /// Size cap for HTTP captures, in KiB
    pub max_page_kb: usize,

    /// Timeout for feed download and uploads, in seconds
    pub request_timeout_secs: u64,

    /// Destination table
    pub table: String,

    /// Rows per insert request
    pub upload_batch_size: usize,

    /// Supabase project URL
    pub supabase_url: Option<String>,

    /// Supabase API key
    pub supabase_key: Option<String>,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Default for HarvestConfig {
    fn default() -> Self {
        let fetcher = env::var("PHISHHARVEST_FETCHER")
            .ok()
            .and_then(|s| s.parse::<FetcherKind>().ok())
            .unwrap_or_default();

        Self {
            feed_url: env_non_empty("PHISHHARVEST_FEED_URL")
                .unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            max_pages: env_parse("PHISHHARVEST_MAX_PAGES", DEFAULT_MAX_PAGES),
            fetcher,
            concurrency: env_parse("PHISHHARVEST_CONCURRENCY", DEFAULT_CONCURRENCY),
            webdriver_url: env_non_empty("PHISHHARVEST_WEBDRIVER_URL")
                .unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string()),
            page_timeout_secs: env_parse("PHISHHARVEST_PAGE_TIMEOUT", DEFAULT_PAGE_TIMEOUT_SECS),
            settle_ms: env_parse("PHISHHARVEST_SETTLE_MS", DEFAULT_SETTLE_MS),
            max_page_kb: env_parse("PHISHHARVEST_MAX_PAGE_KB", DEFAULT_MAX_PAGE_KB),
            request_timeout_secs: env_parse(
                "PHISHHARVEST_REQUEST_TIMEOUT",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
            table: env_non_empty("PHISHHARVEST_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            upload_batch_size: env_parse("PHISHHARVEST_UPLOAD_BATCH", DEFAULT_UPLOAD_BATCH),
            supabase_url: env_non_empty("SUPABASE_URL"),
            supabase_key: env_non_empty("SUPABASE_KEY"),
            log_level: env::var("PHISHHARVEST_LOG_LEVEL")
                .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
                .to_lowercase(),
        }
    }
}

fn check_range<T>(name: &str, value: T, min: T, max: T) -> Result<(), ConfigError>
where
    T: PartialOrd + fmt::Display,
{
    if value < min || value > max {
        return Err(ConfigError::ValidationFailed(format!(
            "{} must be between {} and {} (got {})",
            name, min, max, value
        )));
    }
    Ok(())
}

fn parse_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        field: field.to_string(),
        value: value.to_string(),
    })
}

impl HarvestConfig {
    /// Validates the configuration
    ///
    /// Supabase credentials are not checked here; dry runs do not need them.
    /// Use [`HarvestConfig::supabase_credentials`] before uploading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("Max pages", self.max_pages, 1, 100_000)?;
        check_range("Concurrency", self.concurrency, 1, 256)?;
        check_range("Page timeout", self.page_timeout_secs, 1, 600)?;
        check_range("Request timeout", self.request_timeout_secs, 1, 600)?;
        check_range("Settle delay", self.settle_ms, 0, 60_000)?;
        check_range("Max page size", self.max_page_kb, 1, 100 * 1024)?;
        check_range("Upload batch size", self.upload_batch_size, 1, 10_000)?;

        parse_url("PHISHHARVEST_FEED_URL", &self.feed_url)?;
        parse_url("PHISHHARVEST_WEBDRIVER_URL", &self.webdriver_url)?;

        if self.table.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Table name cannot be empty".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Returns the Supabase project URL and API key
    pub fn supabase_credentials(&self) -> Result<(Url, String), ConfigError> {
        match (&self.supabase_url, &self.supabase_key) {
            (Some(url), Some(key)) => Ok((parse_url("SUPABASE_URL", url)?, key.clone())),
            _ => Err(ConfigError::MissingSupabase),
        }
    }

    /// Size cap for HTTP captures in bytes
    pub fn max_page_bytes(&self) -> usize {
        self.max_page_kb * 1024
    }

    /// Converts configuration to a display map for output formatting
    ///
    /// The Supabase key is masked.
    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("feed_url".to_string(), self.feed_url.clone());
        map.insert("max_pages".to_string(), self.max_pages.to_string());
        map.insert("fetcher".to_string(), self.fetcher.to_string());
        map.insert("concurrency".to_string(), self.concurrency.to_string());
        map.insert("webdriver_url".to_string(), self.webdriver_url.clone());
        map.insert(
            "page_timeout_secs".to_string(),
            self.page_timeout_secs.to_string(),
        );
        map.insert("settle_ms".to_string(), self.settle_ms.to_string());
        map.insert("max_page_kb".to_string(), self.max_page_kb.to_string());
        map.insert(
            "request_timeout_secs".to_string(),
            self.request_timeout_secs.to_string(),
        );
        map.insert("table".to_string(), self.table.clone());
        map.insert(
            "upload_batch_size".to_string(),
            self.upload_batch_size.to_string(),
        );
        if let Some(ref url) = self.supabase_url {
            map.insert("supabase_url".to_string(), url.clone());
        }
        if let Some(ref key) = self.supabase_key {
            map.insert("supabase_key".to_string(), mask_secret(key));
        }
        map.insert("log_level".to_string(), self.log_level.clone());

        map
    }
}

impl fmt::Display for HarvestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Phishharvest Configuration:")?;
        writeln!(f, "  Feed URL: {}", self.feed_url)?;
        writeln!(f, "  Max Pages: {}", self.max_pages)?;
        writeln!(f, "  Fetcher: {}", self.fetcher)?;
        writeln!(f, "  Concurrency: {}", self.concurrency)?;
        writeln!(f, "  WebDriver URL: {}", self.webdriver_url)?;
        writeln!(f, "  Page Timeout: {}s", self.page_timeout_secs)?;
        writeln!(f, "  Settle Delay: {}ms", self.settle_ms)?;
        writeln!(f, "  Max Page Size: {} KiB", self.max_page_kb)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Table: {}", self.table)?;
        writeln!(f, "  Upload Batch Size: {}", self.upload_batch_size)?;
        match self.supabase_url {
            Some(ref url) => writeln!(f, "  Supabase URL: {}", url)?,
            None => writeln!(f, "  Supabase URL: (not set)")?,
        }
        match self.supabase_key {
            Some(ref key) => writeln!(f, "  Supabase Key: {}", mask_secret(key))?,
            None => writeln!(f, "  Supabase Key: (not set)")?,
        }
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
