//! Mock search API client for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::client::{Download, FeedClient, FeedResponse, TransportError};

use super::fixtures;

/// Kind of request the client received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Feed,
    Download,
}

/// A recorded request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub kind: RequestKind,
    /// Full request URL.
    pub url: String,
    /// Decoded `q` parameter for feed requests.
    pub term: Option<String>,
    /// When the request was made, on tokio's clock (pausable in tests).
    pub timestamp: Instant,
}

/// Produces a feed body for a search term, or `None` for the default feed.
type FeedHandler = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Decoded `q` parameter of a search URL.
pub fn query_term(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value.into_owned())
}

/// Mock implementation of the FeedClient trait.
///
/// Provides controllable behavior for testing:
/// - Per-term feed bodies through a handler (default: an empty feed)
/// - Per-URL downloads (unknown URLs answer 404)
/// - Injected transport failures for terms or download URLs
/// - Recorded requests for assertions
///
/// # Example
///
/// ```rust,ignore
/// use nzbsched_core::testing::{MockFeedClient, fixtures};
///
/// let client = MockFeedClient::new();
/// client.set_feed_handler(|term| {
///     (term == "Show 1080p").then(|| fixtures::feed_with_titles(&["Show.S01E01.1080p"]))
/// }).await;
/// client.add_download("http://hydra.test/getnzb/0", b"<nzb/>".to_vec()).await;
///
/// // ... run the engine ...
///
/// assert_eq!(client.feed_terms().await, vec!["Show 1080p"]);
/// ```
pub struct MockFeedClient {
    /// Feed returned when the handler has nothing for a term.
    default_feed: Arc<RwLock<String>>,
    /// Status code of feed responses.
    feed_status: Arc<RwLock<u16>>,
    /// Query handler for per-term feeds.
    feed_handler: Arc<RwLock<Option<FeedHandler>>>,
    /// Configured downloads by URL.
    downloads: Arc<RwLock<HashMap<String, Download>>>,
    /// Terms whose search fails at the transport level.
    failing_terms: Arc<RwLock<HashSet<String>>>,
    /// Download URLs that fail at the transport level.
    failing_downloads: Arc<RwLock<HashSet<String>>>,
    /// Recorded requests.
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

impl std::fmt::Debug for MockFeedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockFeedClient")
            .field("default_feed", &"<feed>")
            .field("feed_handler", &"<handler>")
            .field("downloads", &"<downloads>")
            .field("requests", &"<requests>")
            .finish()
    }
}

impl Default for MockFeedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFeedClient {
    /// Create a mock that answers every search with an empty feed.
    pub fn new() -> Self {
        Self {
            default_feed: Arc::new(RwLock::new(fixtures::feed(&[]))),
            feed_status: Arc::new(RwLock::new(200)),
            feed_handler: Arc::new(RwLock::new(None)),
            downloads: Arc::new(RwLock::new(HashMap::new())),
            failing_terms: Arc::new(RwLock::new(HashSet::new())),
            failing_downloads: Arc::new(RwLock::new(HashSet::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the feed returned for terms the handler does not cover.
    pub async fn set_default_feed(&self, body: impl Into<String>) {
        *self.default_feed.write().await = body.into();
    }

    /// Set the HTTP status of feed responses.
    pub async fn set_feed_status(&self, status: u16) {
        *self.feed_status.write().await = status;
    }

    /// Set a handler that produces the feed body for a search term.
    pub async fn set_feed_handler<F>(&self, handler: F)
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        *self.feed_handler.write().await = Some(Box::new(handler));
    }

    /// Serve `bytes` with status 200 for a download URL.
    pub async fn add_download(&self, url: &str, bytes: Vec<u8>) {
        self.set_download(
            url,
            Download {
                status: 200,
                final_url: url.to_string(),
                bytes,
            },
        )
        .await;
    }

    /// Serve an arbitrary download (status, redirect target) for a URL.
    pub async fn set_download(&self, url: &str, download: Download) {
        self.downloads
            .write()
            .await
            .insert(url.to_string(), download);
    }

    /// Make searches for `term` fail with a connection error.
    pub async fn fail_term(&self, term: &str) {
        self.failing_terms.write().await.insert(term.to_string());
    }

    /// Make downloads of `url` fail with a connection error.
    pub async fn fail_download(&self, url: &str) {
        self.failing_downloads.write().await.insert(url.to_string());
    }

    /// Get recorded requests.
    pub async fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    /// Total number of requests of any kind.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Search terms queried, in order.
    pub async fn feed_terms(&self) -> Vec<String> {
        self.requests
            .read()
            .await
            .iter()
            .filter(|r| r.kind == RequestKind::Feed)
            .filter_map(|r| r.term.clone())
            .collect()
    }

    /// Full search URLs requested, in order.
    pub async fn feed_urls(&self) -> Vec<String> {
        self.urls_of(RequestKind::Feed).await
    }

    /// Download URLs requested, in order.
    pub async fn download_urls(&self) -> Vec<String> {
        self.urls_of(RequestKind::Download).await
    }

    async fn urls_of(&self, kind: RequestKind) -> Vec<String> {
        self.requests
            .read()
            .await
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.url.clone())
            .collect()
    }

    async fn record(&self, kind: RequestKind, url: &str, term: Option<String>) {
        self.requests.write().await.push(RecordedRequest {
            kind,
            url: url.to_string(),
            term,
            timestamp: Instant::now(),
        });
    }
}

#[async_trait]
impl FeedClient for MockFeedClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_feed(&self, url: &str) -> Result<FeedResponse, TransportError> {
        let term = query_term(url);
        self.record(RequestKind::Feed, url, term.clone()).await;

        let term = term.unwrap_or_default();
        if self.failing_terms.read().await.contains(&term) {
            return Err(TransportError::ConnectionFailed(format!(
                "mock failure for '{}'",
                term
            )));
        }

        let handled = match *self.feed_handler.read().await {
            Some(ref handler) => handler(&term),
            None => None,
        };
        let body = match handled {
            Some(body) => body,
            None => self.default_feed.read().await.clone(),
        };

        Ok(FeedResponse {
            status: *self.feed_status.read().await,
            body,
        })
    }

    async fn download(&self, url: &str) -> Result<Download, TransportError> {
        self.record(RequestKind::Download, url, None).await;

        if self.failing_downloads.read().await.contains(url) {
            return Err(TransportError::ConnectionFailed(format!(
                "mock failure for {}",
                url
            )));
        }

        Ok(self
            .downloads
            .read()
            .await
            .get(url)
            .cloned()
            .unwrap_or_else(|| Download {
                status: 404,
                final_url: url.to_string(),
                bytes: b"Not Found".to_vec(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_term_decodes() {
        assert_eq!(
            query_term("http://h/api?apikey=k&q=Show%20Name%20%26%20Co").as_deref(),
            Some("Show Name & Co")
        );
        assert_eq!(query_term("http://h/api?apikey=k"), None);
    }

    #[tokio::test]
    async fn test_default_feed_and_recording() {
        let client = MockFeedClient::new();
        let response = client.fetch_feed("http://h/api?q=abc").await.unwrap();
        assert_eq!(response.status, 200);
        assert!(response.body.contains("<channel>"));
        assert_eq!(client.feed_terms().await, vec!["abc"]);
        assert_eq!(client.request_count().await, 1);
    }

    #[tokio::test]
    async fn test_handler_and_failures() {
        let client = MockFeedClient::new();
        client
            .set_feed_handler(|term| (term == "hit").then(|| "<rss/>".to_string()))
            .await;
        client.fail_term("down").await;

        assert_eq!(client.fetch_feed("http://h/api?q=hit").await.unwrap().body, "<rss/>");
        assert!(client.fetch_feed("http://h/api?q=down").await.is_err());
        assert_eq!(client.feed_terms().await, vec!["hit", "down"]);
    }

    #[tokio::test]
    async fn test_downloads() {
        let client = MockFeedClient::new();
        client.add_download("http://h/getnzb/1", b"nzb".to_vec()).await;
        client.fail_download("http://h/getnzb/2").await;

        let ok = client.download("http://h/getnzb/1").await.unwrap();
        assert_eq!(ok.bytes, b"nzb");
        assert!(client.download("http://h/getnzb/2").await.is_err());
        assert_eq!(client.download("http://h/getnzb/3").await.unwrap().status, 404);
        assert_eq!(client.download_urls().await.len(), 3);
    }
}
