//! Types for talking to the search API.

use async_trait::async_trait;
use thiserror::Error;

/// Raw answer to a search request.
#[derive(Debug, Clone)]
pub struct FeedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
}

impl FeedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Content fetched from a result link.
#[derive(Debug, Clone)]
pub struct Download {
    /// HTTP status code.
    pub status: u16,
    /// URL the content was finally served from (after redirects).
    pub final_url: String,
    /// Response body.
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network-level failures. Only these count as failed requests; any HTTP
/// status with a readable body is a response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::ConnectionFailed(e.to_string())
        } else if e.is_body() || e.is_decode() {
            TransportError::Body(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// Trait for the remote search API.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Issue one search request and return the raw feed.
    async fn fetch_feed(&self, url: &str) -> Result<FeedResponse, TransportError>;

    /// Fetch the content behind a result link.
    async fn download(&self, url: &str) -> Result<Download, TransportError>;
}
