//! Search URL construction.

use serde::Serialize;

use crate::config::Config;

/// Results requested per query (single page).
pub const PAGE_SIZE: u32 = 100;

/// Everything except the term that goes into a search URL.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub endpoint: String,
    #[serde(skip)]
    pub api_key: String,
    pub category: String,
    pub indexers: Vec<String>,
    pub min_size: u64,
    pub max_size: u64,
    pub max_age_days: u32,
}

impl SearchRequest {
    /// Build a request from the configuration with the configured max age.
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.hydra.url.clone(),
            api_key: config.hydra.api_key.clone(),
            category: config.search.category.clone(),
            indexers: config.search.indexers.clone(),
            min_size: config.search.min_size,
            max_size: config.search.max_size,
            max_age_days: config.search.max_age_days,
        }
    }

    /// Replace the max age (e.g., with the effective one for this run).
    pub fn with_max_age(mut self, max_age_days: u32) -> Self {
        self.max_age_days = max_age_days;
        self
    }

    /// Build the NZBHydra API URL for a search term.
    pub fn build_url(&self, term: &str) -> String {
        let mut url = format!(
            "{}/api?apikey={}&t=search&extended=1&password=1&limit={}&offset=0",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(&self.api_key),
            PAGE_SIZE
        );

        if !self.category.is_empty() {
            url.push_str(&format!("&cat={}", urlencoding::encode(&self.category)));
        }

        if !self.indexers.is_empty() {
            url.push_str(&format!(
                "&indexers={}",
                urlencoding::encode(&self.indexers.join(","))
            ));
        }

        url.push_str(&format!(
            "&minsize={}&maxsize={}&maxage={}&q={}",
            self.min_size,
            self.max_size,
            self.max_age_days,
            urlencoding::encode(term)
        ));

        url
    }
}
