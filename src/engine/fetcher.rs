//! Page Fetcher
//!
//! Retrieves candidate pages over HTTPS with a hard timeout, bounded
//! redirects and a response body cap, and classifies failures so the scan
//! pipeline can record them. Screenshot capture rides along when headless
//! Chrome is available; its failures never fail the fetch.

use std::error::Error as StdError;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result as AnyResult};
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};

use crate::config::Config;
use crate::error::{AppError, FetchFailure};

/// Response body cap; phishing pages past this are cut off, not rejected.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// How many redirects to follow before giving up.
const MAX_REDIRECTS: usize = 5;

/// Realistic browser User-Agent; phishing kits serve decoys to obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Extra settle time after navigation before the screenshot, for JS renders.
const RENDER_SETTLE: Duration = Duration::from_secs(2);

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub html: String,
    pub status: u16,
    /// Path of the captured screenshot, when one was taken.
    pub screenshot: Option<PathBuf>,
}

pub struct Fetcher {
    client: reqwest::Client,
    screenshots_dir: PathBuf,
    screenshots_enabled: bool,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::InternalError(format!("HTTP client build failed: {}", e)))?;

        let screenshots_dir = config.screenshots_dir();
        fs::create_dir_all(&screenshots_dir)?;

        Ok(Self {
            client,
            screenshots_dir,
            screenshots_enabled: config.screenshots_enabled,
            timeout: config.fetch_timeout(),
        })
    }

    /// Fetch `https://{domain}`. Non-success statuses and transport errors
    /// come back classified; the caller decides whether that is an error or
    /// a zero-score signal.
    pub async fn fetch(&self, domain: &str) -> Result<FetchedPage, FetchFailure> {
        let url = format!("https://{}", domain);

        let response = self.client.get(&url).send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::HttpStatus(status.as_u16()));
        }

        let html = read_capped(response).await?;

        let screenshot = if self.screenshots_enabled {
            self.capture_screenshot(&url, domain).await
        } else {
            None
        };

        Ok(FetchedPage {
            html,
            status: status.as_u16(),
            screenshot,
        })
    }

    /// Render the page in headless Chrome and write a PNG next to the other
    /// screenshots. Any failure here degrades to `None`.
    async fn capture_screenshot(&self, url: &str, domain: &str) -> Option<PathBuf> {
        let url = url.to_string();
        let timeout = self.timeout;
        let path = self.screenshots_dir.join(format!("{}.png", domain));

        let captured = tokio::task::spawn_blocking(move || capture_png(&url, timeout)).await;

        match captured {
            Ok(Ok(png)) => match fs::write(&path, png) {
                Ok(()) => Some(path),
                Err(err) => {
                    tracing::warn!(domain = %domain, "Could not write screenshot: {}", err);
                    None
                }
            },
            Ok(Err(err)) => {
                tracing::debug!(domain = %domain, "Screenshot capture failed: {:#}", err);
                None
            }
            Err(err) => {
                tracing::warn!(domain = %domain, "Screenshot task panicked: {}", err);
                None
            }
        }
    }
}

/// Read the response body up to `MAX_BODY_BYTES`.
async fn read_capped(mut response: reqwest::Response) -> Result<String, FetchFailure> {
    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(classify)? {
        body.extend_from_slice(&chunk);
        if body.len() >= MAX_BODY_BYTES {
            body.truncate(MAX_BODY_BYTES);
            break;
        }
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Map a transport error onto the failure taxonomy. reqwest has no
/// structured TLS error kind, so TLS is detected from the source chain.
fn classify(err: reqwest::Error) -> FetchFailure {
    if err.is_timeout() {
        return FetchFailure::Timeout;
    }

    let mut source: Option<&(dyn StdError + 'static)> = err.source();
    while let Some(inner) = source {
        let message = inner.to_string().to_lowercase();
        if message.contains("certificate")
            || message.contains("tls")
            || message.contains("ssl")
            || message.contains("handshake")
        {
            return FetchFailure::Tls;
        }
        source = inner.source();
    }

    FetchFailure::Unreachable
}

/// Blocking headless capture; runs on the blocking pool because
/// headless_chrome is synchronous.
fn capture_png(url: &str, timeout: Duration) -> AnyResult<Vec<u8>> {
    let options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(false)
        .window_size(Some((1280, 800)))
        .idle_browser_timeout(timeout + RENDER_SETTLE)
        .build()
        .map_err(|e| anyhow::anyhow!("Browser launch options error: {}", e))?;

    let browser = Browser::new(options).context("Failed to launch Chrome/Chromium")?;
    let tab = browser.new_tab().context("Failed to create new tab")?;
    tab.set_default_timeout(timeout);

    tab.navigate_to(url).context("Failed to navigate to URL")?;
    tab.wait_until_navigated().context("Navigation timeout")?;

    // Let client-side rendering settle before the capture
    std::thread::sleep(RENDER_SETTLE);

    tab.capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, None, true)
        .context("Screenshot capture failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil;
    use tempfile::TempDir;

    #[test]
    fn test_fetcher_creates_screenshot_dir() {
        let dir = TempDir::new().unwrap();
        let config = testutil::test_config(dir.path());
        let _fetcher = Fetcher::new(&config).unwrap();
        assert!(config.screenshots_dir().is_dir());
    }

    #[test]
    fn test_http_status_failure_preserves_code() {
        assert_eq!(FetchFailure::HttpStatus(404).reason_code(), "http_404");
        assert_eq!(FetchFailure::HttpStatus(500).reason_code(), "http_500");
    }
}
