//! Page fetching over HTTP

use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use scraper::Html;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::scrape::error::FetchError;

/// A fetched HTML page.
///
/// Holds the raw body; `scraper::Html` is not `Send`, so the tree is built
/// on demand by whoever parses the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    url: String,
    body: String,
}

impl Document {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn html(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Trait for fetching a single page
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Issues a GET for `url`.
    ///
    /// # Returns
    /// * `Ok(Document)` - The response body of a 200 response
    /// * `Err(FetchError)` - Transport failure or any other status
    async fn fetch(&self, url: &str) -> Result<Document, FetchError>;
}

/// reqwest-backed fetcher with a per-request timeout and bounded retries
pub struct HttpFetcher {
    client: reqwest::Client,
    retries: u32,
    retry_backoff: Duration,
}

impl HttpFetcher {
    /// A `timeout` of 0 disables the per-request timeout.
    pub fn new(config: &FetchConfig) -> Self {
        let mut builder = reqwest::Client::builder().user_agent(&config.user_agent);
        if config.timeout > 0 {
            builder = builder.timeout(Duration::from_millis(config.timeout));
        }

        Self {
            client: builder.build().expect("Failed to create HTTP client"),
            retries: config.retries,
            retry_backoff: Duration::from_millis(config.retry_backoff),
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Document, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status != reqwest::StatusCode::OK {
            warn!("status code error: {} for {}", status, url);
            return Err(FetchError::UnexpectedStatus {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await?;
        debug!("Fetched {} ({} bytes)", url, body.len());

        Ok(Document::new(url, body))
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(document) => return Ok(document),
                Err(e) if attempt < self.retries && e.is_retryable() => {
                    let delay = self
                        .retry_backoff
                        .saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    warn!(
                        "Fetch of {} failed ({}), retry {}/{} in {:?}",
                        url, e, attempt, self.retries, delay
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
