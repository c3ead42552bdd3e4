//! Types for parsed search feeds.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// One `<item>` of a search feed.
///
/// Every field has a documented default, so a sparse item never fails the
/// parse: empty strings for text, `0` for the size and
/// [`DateTime::<Utc>::MIN_UTC`] for the publish date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    /// Release title.
    pub title: String,
    /// Size in bytes.
    pub size: u64,
    /// When the release was posted.
    pub pub_date: DateTime<Utc>,
    /// NZB download link.
    pub link: String,
    /// `url` attribute of the enclosure.
    pub enclosure: String,
    /// Category as reported by the indexer.
    pub category: String,
}

impl Default for ResultRecord {
    fn default() -> Self {
        Self {
            title: String::new(),
            size: 0,
            pub_date: DateTime::<Utc>::MIN_UTC,
            link: String::new(),
            enclosure: String::new(),
            category: String::new(),
        }
    }
}

impl ResultRecord {
    /// Whether the record can be downloaded at all.
    pub fn has_link(&self) -> bool {
        !self.link.trim().is_empty()
    }

    /// Whether a publish date was present and parseable.
    pub fn has_pub_date(&self) -> bool {
        self.pub_date != DateTime::<Utc>::MIN_UTC
    }
}

/// Errors raised while reading a feed document.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The document is not well-formed markup.
    #[error("Malformed feed document: {0}")]
    Malformed(String),
}
