//! One search term's query and the download of its results.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use crate::client::FeedClient;
use crate::feed::{parse_feed, FeedError, ResultRecord};

use super::naming::{file_name_from_title, file_name_from_url};
use super::{QueryError, SaveOutcome, SaveSummary, SearchRequest, SkipReason};

/// Query state for a single search term.
#[derive(Debug, Clone)]
pub struct QuerySession {
    term: String,
    status_code: Option<u16>,
    results: Vec<ResultRecord>,
}

impl QuerySession {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            status_code: None,
            results: Vec::new(),
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// HTTP status of the last query, if it got a response.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Parsed results in feed order.
    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    /// Run the query and parse the response. Returns the number of results.
    ///
    /// The body is parsed whatever the HTTP status; on a transport or parse
    /// failure the results are left empty.
    pub async fn execute(
        &mut self,
        client: &dyn FeedClient,
        request: &SearchRequest,
    ) -> Result<usize, QueryError> {
        self.results.clear();
        self.status_code = None;

        let url = request.build_url(&self.term);
        debug!(term = %self.term, client = client.name(), max_age = request.max_age_days, "Searching");

        let response = match client.fetch_feed(&url).await {
            Ok(response) => response,
            Err(e) => {
                warn!(term = %self.term, error = %e, "Search request failed");
                return Err(e.into());
            }
        };

        self.status_code = Some(response.status);
        if !response.is_success() {
            warn!(term = %self.term, status = response.status, "Search returned non-success status");
        }

        if let Err(e) = self.parse_results(&response.body) {
            error!(term = %self.term, error = %e, "Failed to parse search response");
            return Err(e.into());
        }

        if self.results.is_empty() {
            info!(term = %self.term, "No results");
        } else {
            info!(term = %self.term, count = self.results.len(), "Found results");
        }
        Ok(self.results.len())
    }

    /// Replace the results with the records of a feed document.
    pub fn parse_results(&mut self, body: &str) -> Result<(), FeedError> {
        match parse_feed(body) {
            Ok(records) => {
                self.results = records;
                Ok(())
            }
            Err(e) => {
                self.results.clear();
                Err(e)
            }
        }
    }

    /// Download every result into `dir`, never overwriting existing files.
    pub async fn save_results(&self, client: &dyn FeedClient, dir: &Path) -> SaveSummary {
        let mut summary = SaveSummary::default();
        for record in &self.results {
            summary.push(save_record(client, record, dir).await);
        }

        if !summary.outcomes.is_empty() {
            info!(
                term = %self.term,
                saved = summary.saved(),
                skipped = summary.skipped(),
                failed = summary.failed(),
                "Saved results"
            );
        }
        summary
    }
}

async fn save_record(client: &dyn FeedClient, record: &ResultRecord, dir: &Path) -> SaveOutcome {
    if !record.has_link() {
        debug!(title = %record.title, "Result has no link, skipping");
        return SaveOutcome::Skipped {
            title: record.title.clone(),
            skip: SkipReason::NoLink,
        };
    }

    let titled = file_name_from_title(&record.title).map(|name| dir.join(name));
    if let Some(path) = &titled {
        if exists(path).await {
            warn!(path = %path.display(), "File already exists, skipping");
            return already_exists(record, path);
        }
    }

    let download = match client.download(&record.link).await {
        Ok(download) => download,
        Err(e) => {
            error!(title = %record.title, error = %e, "Download failed");
            return failed(record, e.to_string());
        }
    };

    if !download.is_success() {
        error!(title = %record.title, status = download.status, "Download returned non-success status");
        return failed(record, format!("HTTP {}", download.status));
    }

    let path = match titled {
        Some(path) => path,
        None => match file_name_from_url(&download.final_url) {
            Some(name) => {
                let path = dir.join(name);
                if exists(&path).await {
                    warn!(path = %path.display(), "File already exists, skipping");
                    return already_exists(record, &path);
                }
                path
            }
            None => {
                error!(url = %download.final_url, "Cannot derive a file name for untitled result");
                return failed(record, "no usable file name".to_string());
            }
        },
    };

    match write_new(&path, &download.bytes).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            warn!(path = %path.display(), "File appeared before it could be created, skipping");
            return already_exists(record, &path);
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to write file");
            return failed(record, e.to_string());
        }
    }

    if !exists(&path).await {
        error!(path = %path.display(), "File missing after write");
        return failed(record, "file missing after write".to_string());
    }

    info!(path = %path.display(), bytes = download.bytes.len(), "Saved NZB");
    SaveOutcome::Saved {
        path,
        bytes: download.bytes.len(),
    }
}

async fn write_new(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

fn already_exists(record: &ResultRecord, path: &Path) -> SaveOutcome {
    SaveOutcome::Skipped {
        title: record.title.clone(),
        skip: SkipReason::AlreadyExists {
            path: PathBuf::from(path),
        },
    }
}

fn failed(record: &ResultRecord, reason: String) -> SaveOutcome {
    SaveOutcome::Failed {
        title: record.title.clone(),
        reason,
    }
}
