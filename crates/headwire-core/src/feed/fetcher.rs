use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Proxy, Response, StatusCode};
use url::Url;

use super::models::{FeedSource, RawEntry};
use super::parser::parse_feed;
use crate::config::SyncConfig;
use crate::{Error, Result};

const MAX_FEED_BYTES: u64 = 5 * 1024 * 1024;
const FEED_USER_AGENT: &str = concat!("headwire/", env!("CARGO_PKG_VERSION"), " (+feed reader)");

/// Anything that can turn a configured feed into raw entries
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch_entries(&self, source: &FeedSource) -> Result<Vec<RawEntry>>;
}

/// Bounded attempt count and exponential backoff between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay after the `failures`-th failed attempt: `base * 2^failures`
    pub fn backoff_delay(&self, failures: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(failures)
    }
}

/// HTTP feed client with bounded timeout and retry
pub struct FeedFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl FeedFetcher {
    /// Create a new feed fetcher with configuration
    pub fn new(sync: &SyncConfig) -> Result<Self> {
        let client = Self::build_client(sync.request_timeout(), &sync.proxy_url)?;
        let retry = RetryPolicy {
            max_attempts: sync.effective_attempts(),
            base_delay: Duration::from_millis(sync.retry_base_delay_ms),
        };

        Ok(Self { client, retry })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Build HTTP client with optional proxy
    fn build_client(timeout: Duration, proxy_url: &Option<String>) -> Result<Client> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .default_headers(Self::build_headers())
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10));

        if let Some(ref proxy) = proxy_url {
            let proxy = Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
            tracing::info!("Using HTTP proxy for feed fetching");
        }

        builder.build().map_err(Error::Http)
    }

    fn build_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "application/rss+xml,application/atom+xml,application/xml;q=0.9,text/xml;q=0.8,*/*;q=0.5",
            ),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(FEED_USER_AGENT));
        headers
    }

    /// 429 and 5xx are worth another attempt; other statuses are final
    fn is_retryable_status(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    /// Fetch with retry and exponential backoff
    async fn fetch_with_retry(&self, url: &str) -> Result<Bytes> {
        let mut last_error = None;

        for attempt in 1..=self.retry.max_attempts {
            tracing::debug!("Fetch attempt {}/{} for {}", attempt, self.retry.max_attempts, url);

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if Self::is_retryable_status(status) {
                        tracing::warn!("Received {} for {} (attempt {})", status, url, attempt);
                        last_error = Some(Error::FeedParse(format!("HTTP {} for URL: {}", status, url)));
                    } else if !status.is_success() {
                        return Err(Error::FeedParse(format!("HTTP {} for URL: {}", status, url)));
                    } else {
                        match self.read_body(response, url).await {
                            Ok(bytes) => return Ok(bytes),
                            Err(Error::Http(e)) => {
                                tracing::warn!("Failed to read response body from {}: {}", url, e);
                                last_error = Some(Error::Http(e));
                            }
                            Err(e) => return Err(e),
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Request failed for {} (attempt {}): {}", url, attempt, e);
                    last_error = Some(Error::Http(e));
                }
            }

            if attempt < self.retry.max_attempts {
                let delay = self.retry.backoff_delay(attempt);
                tracing::debug!("Retrying {} in {}ms", url, delay.as_millis());
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::FeedParse(format!(
                "Failed to fetch URL after {} attempts: {}",
                self.retry.max_attempts, url
            ))
        }))
    }

    /// Read the body chunk by chunk, refusing anything over the size cap
    /// before it is buffered
    async fn read_body(&self, mut response: Response, url: &str) -> Result<Bytes> {
        if let Some(declared) = response.content_length() {
            self.ensure_content_size(declared, url)?;
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            self.ensure_content_size((body.len() + chunk.len()) as u64, url)?;
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }

    fn ensure_content_size(&self, size: u64, url: &str) -> Result<()> {
        if size > MAX_FEED_BYTES {
            return Err(Error::FeedParse(format!(
                "Feed too large ({} bytes) for URL: {}",
                size, url
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl FeedClient for FeedFetcher {
    async fn fetch_entries(&self, source: &FeedSource) -> Result<Vec<RawEntry>> {
        Url::parse(&source.url)?;

        tracing::info!("Fetching {} at {}", source.name, source.url);

        let content = self
            .fetch_with_retry(&source.url)
            .await
            .map_err(|e| Error::Fetch {
                feed: source.name.clone(),
                reason: e.to_string(),
            })?;

        let entries = parse_feed(&content)?;
        tracing::info!("Feed {} returned {} entries", source.name, entries.len());
        Ok(entries)
    }
}
