//! Rate-limited page fetcher shared by both scrapers.
//!
//! Every request is preceded by a fixed sleep (politeness toward the
//! scraped site, not an adaptive limiter). Failures are never
//! distinguished by cause: timeouts, 404s and 5xx responses all collapse
//! to "no page".

use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use std::time::Duration;

const REQUEST_TIMEOUT_SECONDS: u64 = 30;
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0.0.0 Safari/537.36";

pub struct PageFetcher {
    client: Client,
    delay: Duration,
    max_attempts: u32,
}

impl PageFetcher {
    /// Build a fetcher with browser-like default headers.
    ///
    /// `max_attempts` of 1 means no retry (archive scraper); the
    /// discoverer uses a small fixed retry count.
    pub fn new(delay_ms: u64, max_attempts: u32, referer: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        if let Some(referer) = referer {
            headers.insert(
                REFERER,
                HeaderValue::from_str(referer).context("Invalid referer header")?,
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            delay: Duration::from_millis(delay_ms),
            max_attempts: max_attempts.max(1),
        })
    }

    /// Rate-limited GET. Returns the response body, or `None` when every
    /// attempt failed or returned a non-2xx status.
    pub async fn get_page(&self, url: &str, query: &[(&str, &str)]) -> Option<String> {
        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                // One fixed extra delay between retries, no backoff
                tokio::time::sleep(self.delay * 2).await;
            }
            tokio::time::sleep(self.delay).await;

            match self.attempt(url, query).await {
                Ok(body) => return Some(body),
                Err(e) => {
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {} - {}",
                        attempt,
                        self.max_attempts,
                        url,
                        e
                    );
                }
            }
        }
        None
    }

    async fn attempt(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .context("Failed to send request")?
            .error_for_status()
            .context("Non-success status")?;

        response.text().await.context("Failed to read response body")
    }
}
