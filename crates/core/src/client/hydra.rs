//! NZBHydra HTTP backend.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::HydraConfig;

use super::{Download, FeedClient, FeedResponse, TransportError};

/// reqwest-backed client for an NZBHydra instance.
pub struct HydraClient {
    client: Client,
}

impl HydraClient {
    /// Create a new client with the configured request timeout.
    pub fn new(config: &HydraConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(concat!("nzbsched/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedClient for HydraClient {
    fn name(&self) -> &str {
        "nzbhydra"
    }

    async fn fetch_feed(&self, url: &str) -> Result<FeedResponse, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(status, bytes = body.len(), "Received search feed");
        Ok(FeedResponse { status, body })
    }

    async fn download(&self, url: &str) -> Result<Download, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let bytes = response.bytes().await?.to_vec();

        debug!(status, final_url = %final_url, bytes = bytes.len(), "Downloaded link");
        Ok(Download {
            status,
            final_url,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client() {
        let config = HydraConfig {
            url: "http://localhost:5076".to_string(),
            api_key: "key".to_string(),
            timeout_secs: 5,
        };
        let client = HydraClient::new(&config).unwrap();
        assert_eq!(client.name(), "nzbhydra");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let config = HydraConfig {
            url: "http://127.0.0.1:9".to_string(),
            api_key: "key".to_string(),
            timeout_secs: 2,
        };
        let client = HydraClient::new(&config).unwrap();
        let result = client.fetch_feed("http://127.0.0.1:9/api?t=search").await;
        assert!(result.is_err());
    }
}
