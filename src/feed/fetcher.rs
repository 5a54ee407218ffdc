use crate::feed::parser::parse_entries;
use crate::feed::Entry;
use async_trait::async_trait;
use futures::stream::StreamExt;
use std::time::Duration;
use thiserror::Error;

/// Feed the bot relays when no `feed_url` is configured.
pub const DEFAULT_FEED_URL: &str = "https://rss.app/feeds/06baSi0bagPEqNTP.xml";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while fetching the feed.
///
/// None of these are retried. They propagate to the command handler that
/// triggered the fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Feed XML could not be parsed as RSS or Atom
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Source of raw feed entries.
///
/// Handlers depend on this trait rather than on [`FeedReader`] directly so
/// they can run against an in-memory feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Returns the feed's entries in published order. Every call is a fresh fetch.
    async fn fetch_entries(&self) -> Result<Vec<Entry>, FetchError>;
}

/// Fetches one fixed feed URL over HTTP.
#[derive(Debug, Clone)]
pub struct FeedReader {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl FeedReader {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the per-request timeout (30 seconds by default).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_bytes(&self) -> Result<Vec<u8>, FetchError> {
        let response = tokio::time::timeout(self.timeout, self.client.get(&self.url).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Network)?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        tokio::time::timeout(self.timeout, read_limited_bytes(response, MAX_FEED_SIZE))
            .await
            .map_err(|_| FetchError::Timeout)?
    }
}

#[async_trait]
impl FeedSource for FeedReader {
    async fn fetch_entries(&self) -> Result<Vec<Entry>, FetchError> {
        let bytes = self.fetch_bytes().await?;
        let entries = parse_entries(&bytes)?;
        tracing::debug!(
            feed = %self.url,
            bytes = bytes.len(),
            entries = entries.len(),
            "Fetched feed"
        );
        Ok(entries)
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
