//! Headless-browser capture over WebDriver
//!
//! Every page gets its own browser session; nothing from one capture is
//! visible to the next.

use super::PageFetcher;
use async_trait::async_trait;
use std::time::Duration;
use thirtyfour::prelude::*;
use tracing::{debug, warn};

/// Extra time allowed on top of page load and settle before a capture is abandoned
const SESSION_GRACE: Duration = Duration::from_secs(20);

/// Browser capture settings
#[derive(Debug, Clone)]
pub struct BrowserFetchConfig {
    /// WebDriver server URL (chromedriver, selenium)
    pub webdriver_url: String,

    /// Page load timeout
    pub page_timeout: Duration,

    /// Wait after navigation for scripts to finish rendering
    pub settle: Duration,

    /// User agent override
    pub user_agent: Option<String>,

    /// Additional Chrome arguments
    pub browser_args: Vec<String>,
}

impl Default for BrowserFetchConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            page_timeout: Duration::from_secs(15),
            settle: Duration::from_secs(2),
            user_agent: None,
            browser_args: Vec::new(),
        }
    }
}

/// Capture backend driving headless Chrome
#[derive(Debug, Clone)]
pub struct BrowserFetcher {
    config: BrowserFetchConfig,
}

impl BrowserFetcher {
    pub fn new(config: BrowserFetchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BrowserFetchConfig {
        &self.config
    }

    /// Chrome arguments passed to every session
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = vec![
            "--headless=new".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
        ];
        if let Some(ref ua) = self.config.user_agent {
            args.push(format!("--user-agent={}", ua));
        }
        args.extend(self.config.browser_args.iter().cloned());
        args
    }

    fn build_capabilities(&self) -> WebDriverResult<Capabilities> {
        let mut caps = DesiredCapabilities::chrome();
        for arg in self.chrome_args() {
            caps.add_arg(&arg)?;
        }
        Ok(caps.into())
    }

    async fn read_page(&self, driver: &WebDriver, url: &str) -> WebDriverResult<String> {
        driver.set_page_load_timeout(self.config.page_timeout).await?;
        driver.goto(url).await?;
        tokio::time::sleep(self.config.settle).await;
        driver.source().await
    }

    async fn capture(&self, url: &str) -> WebDriverResult<String> {
        let caps = self.build_capabilities()?;
        let driver = WebDriver::new(&self.config.webdriver_url, caps).await?;

        let result = self.read_page(&driver, url).await;

        if let Err(e) = driver.quit().await {
            debug!(url, error = %e, "Failed to quit browser session");
        }

        result
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        let deadline = self.config.page_timeout + self.config.settle + SESSION_GRACE;

        match tokio::time::timeout(deadline, self.capture(url)).await {
            Ok(Ok(html)) => Some(html),
            Ok(Err(e)) => {
                warn!(url, error = %e, "Browser capture failed");
                None
            }
            Err(_) => {
                warn!(url, timeout_secs = deadline.as_secs(), "Browser capture timed out");
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}
