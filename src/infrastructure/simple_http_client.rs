//! HTTP client for fetching listing pages
//!
//! Plain GET with a browser-like user agent, a per-request timeout and a small
//! retry loop with exponential backoff. Pages are returned as strings so callers
//! can parse them without holding a document across an await point.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::infrastructure::config::HttpConfig;

/// Source of page markup
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the markup at `url`; non-success statuses are errors
    async fn fetch_html(&self, url: &str) -> Result<String>;
}

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Attempts per URL
    pub max_retries: u32,
    /// User agent string
    pub user_agent: String,
    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl From<&HttpConfig> for HttpClientConfig {
    fn from(config: &HttpConfig) -> Self {
        Self {
            timeout_seconds: config.timeout_seconds,
            max_retries: config.max_retries,
            user_agent: config.user_agent.clone(),
            follow_redirects: config.follow_redirects,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from(&HttpConfig::default())
    }
}

/// reqwest-backed page fetcher
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Statuses worth another attempt
    fn is_retryable(status: StatusCode) -> bool {
        matches!(
            status,
            StatusCode::REQUEST_TIMEOUT
                | StatusCode::TOO_MANY_REQUESTS
                | StatusCode::INTERNAL_SERVER_ERROR
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT
        )
    }

    /// Single attempt; the flag tells whether a retry may help
    async fn fetch_html_once(&self, url: &str) -> std::result::Result<String, (anyhow::Error, bool)> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| (anyhow!("HTTP request failed: {}", e), true))?;

        let status = response.status();
        if !status.is_success() {
            error!("HTTP error {}: {}", status, url);
            return Err((anyhow!("HTTP error {}: {}", status, url), Self::is_retryable(status)));
        }

        let html_content = response
            .text()
            .await
            .map_err(|e| (anyhow!("Failed to read response body: {}", e), true))?;

        if html_content.is_empty() {
            return Err((anyhow!("Empty response from {}", url), false));
        }

        Ok(html_content)
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        info!("HTTP GET: {}", url);

        let attempts = self.config.max_retries.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.fetch_html_once(url).await {
                Ok(html) => {
                    debug!("Fetched {} bytes from {} on attempt {}", html.len(), url, attempt);
                    return Ok(html);
                }
                Err((e, retryable)) => {
                    warn!("Attempt {}/{} failed for {}: {}", attempt, attempts, url, e);
                    if !retryable {
                        return Err(e);
                    }
                    last_error = Some(e);

                    if attempt < attempts {
                        // Exponential backoff
                        sleep(Duration::from_secs(2_u64.pow(attempt - 1))).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("Unknown error while fetching {}", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(HttpClient::new().is_ok());
    }

    #[test]
    fn test_config_from_app_settings() {
        let http = HttpConfig {
            user_agent: "Test Agent".to_string(),
            timeout_seconds: 3,
            max_retries: 1,
            follow_redirects: false,
        };
        let client = HttpClient::with_config(HttpClientConfig::from(&http)).unwrap();
        assert_eq!(client.config().user_agent, "Test Agent");
        assert_eq!(client.config().timeout_seconds, 3);
        assert!(!client.config().follow_redirects);
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(HttpClient::is_retryable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(HttpClient::is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(!HttpClient::is_retryable(StatusCode::NOT_FOUND));
        assert!(!HttpClient::is_retryable(StatusCode::FORBIDDEN));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let config = HttpClientConfig { timeout_seconds: 2, max_retries: 1, ..HttpClientConfig::default() };
        let client = HttpClient::with_config(config).unwrap();
        assert!(client.fetch_html("http://127.0.0.1:9/annonce-1").await.is_err());
    }
}
