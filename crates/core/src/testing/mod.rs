//! Testing utilities: a mock search API client and feed fixtures.
//!
//! # Example
//!
//! ```rust,ignore
//! use nzbsched_core::testing::{fixtures, MockFeedClient};
//!
//! let client = MockFeedClient::new();
//! client.set_default_feed(fixtures::feed_with_titles(&["Show.S01E01.1080p"])).await;
//! ```

mod mock_client;

pub use mock_client::{query_term, MockFeedClient, RecordedRequest, RequestKind};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use crate::config::{Config, HydraConfig, LoggingConfig, SearchConfig};

    /// Base URL used by fixture links.
    pub const LINK_BASE: &str = "http://hydra.test/getnzb";

    /// Download link of the `index`-th fixture item.
    pub fn link(index: usize) -> String {
        format!("{}/{}", LINK_BASE, index)
    }

    /// One feed `<item>` with a title and link.
    pub fn item(title: &str, link: &str) -> String {
        format!(
            "<item>\
               <title>{}</title>\
               <link>{}</link>\
               <size>1048576</size>\
               <pubDate>Sat, 01 Jun 2024 12:00:00 +0000</pubDate>\
               <enclosure url=\"{}\" length=\"1048576\" type=\"application/x-nzb\"/>\
               <category>TV HD</category>\
             </item>",
            escape(title),
            escape(link),
            escape(link)
        )
    }

    /// RSS document wrapping pre-rendered items.
    pub fn feed(items: &[String]) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <rss version=\"2.0\" xmlns:newznab=\"http://www.newznab.com/DTD/2010/feeds/attributes/\">\
             <channel><title>NZBHydra</title>{}</channel></rss>",
            items.concat()
        )
    }

    /// Feed with one item per title; item `i` links to [`link`]`(i)`.
    pub fn feed_with_titles(titles: &[&str]) -> String {
        let items: Vec<String> = titles
            .iter()
            .enumerate()
            .map(|(i, title)| item(title, &link(i)))
            .collect();
        feed(&items)
    }

    /// Configuration rooted in `dir` with no cooldown and no gate.
    ///
    /// Expects `terms.txt` and `out/` under `dir`; neither is created here.
    pub fn config(dir: &Path) -> Config {
        Config {
            hydra: HydraConfig {
                url: "http://hydra.test".to_string(),
                api_key: "test-key".to_string(),
                timeout_secs: 5,
            },
            search: SearchConfig {
                terms_file: dir.join("terms.txt"),
                output_dir: dir.join("out"),
                timestamp_file: None,
                category: "TV".to_string(),
                indexers: vec!["indexer-a".to_string()],
                min_size: 1,
                max_size: 900_000,
                max_age_days: 30,
                frequency_hours: 0,
                request_cooldown_secs: 0,
                resolution: Some("1080p".to_string()),
                append_resolution: false,
            },
            logging: LoggingConfig::default(),
        }
    }

    fn escape(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }
}
