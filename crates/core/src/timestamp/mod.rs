//! Last-run timestamp persistence and the search window derived from it.
//!
//! The timestamp file holds a single UTC time in `yyyy-MM-dd_HH:mm:ss`
//! format. A missing or unreadable file means "never run", which widens the
//! next search to the configured maximum age.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

/// On-disk format of the timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// File name used when no timestamp file is configured.
pub const DEFAULT_TIMESTAMP_FILE: &str = "lastsearch.txt";

const SECONDS_PER_DAY: i64 = 86_400;

/// Errors that can occur while persisting the timestamp.
#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("Failed to write last-run timestamp to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Timestamp file next to the given terms file.
pub fn default_timestamp_path(terms_file: &Path) -> PathBuf {
    match terms_file.parent() {
        Some(dir) => dir.join(DEFAULT_TIMESTAMP_FILE),
        None => PathBuf::from(DEFAULT_TIMESTAMP_FILE),
    }
}

/// Reads and writes the last successful run time.
#[derive(Debug, Clone)]
pub struct LastRunStore {
    path: PathBuf,
}

impl LastRunStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the last run time.
    ///
    /// Never fails: a missing file yields [`DateTime::<Utc>::MIN_UTC`], and so
    /// does corrupt content (logged as an error).
    pub async fn read(&self) -> DateTime<Utc> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No last-run timestamp, searching full age window");
                return DateTime::<Utc>::MIN_UTC;
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to read last-run timestamp");
                return DateTime::<Utc>::MIN_UTC;
            }
        };

        match parse_timestamp(&content) {
            Some(ts) => {
                debug!(path = %self.path.display(), last_run = %ts, "Read last-run timestamp");
                ts
            }
            None => {
                error!(
                    path = %self.path.display(),
                    content = %content.trim(),
                    "Last-run timestamp is empty or unparseable, treating as never run"
                );
                DateTime::<Utc>::MIN_UTC
            }
        }
    }

    /// Overwrite the timestamp file.
    ///
    /// The new content is written to a sibling file and renamed into place so
    /// a failed write never leaves a truncated timestamp behind.
    pub async fn write(&self, timestamp: DateTime<Utc>) -> Result<(), TimestampError> {
        let content = format_timestamp(timestamp);
        let tmp_path = self.tmp_path();

        let result = async {
            tokio::fs::write(&tmp_path, content.as_bytes()).await?;
            tokio::fs::rename(&tmp_path, &self.path).await
        }
        .await;

        if let Err(source) = result {
            error!(path = %self.path.display(), error = %source, "Failed to write last-run timestamp");
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(TimestampError::Write {
                path: self.path.clone(),
                source,
            });
        }

        debug!(path = %self.path.display(), timestamp = %content, "Wrote last-run timestamp");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Format a timestamp the way it is stored on disk.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse stored timestamp content (UTC, surrounding whitespace ignored).
pub fn parse_timestamp(content: &str) -> Option<DateTime<Utc>> {
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(content, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Age window in days for a run starting now.
pub fn effective_max_age(last_run: DateTime<Utc>, max_age_days: u32) -> u32 {
    effective_max_age_at(last_run, max_age_days, Utc::now())
}

/// Age window in days: elapsed days since `last_run` rounded up, never more
/// than `max_age_days` and never negative.
pub fn effective_max_age_at(last_run: DateTime<Utc>, max_age_days: u32, now: DateTime<Utc>) -> u32 {
    if last_run == DateTime::<Utc>::MIN_UTC {
        return max_age_days;
    }

    let elapsed_secs = now.signed_duration_since(last_run).num_seconds();
    if elapsed_secs <= 0 {
        return 0;
    }

    let days = (elapsed_secs + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
    days.min(max_age_days as i64) as u32
}

/// Hours elapsed since `last_run` (0 when it lies in the future).
pub fn elapsed_hours(last_run: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    if last_run == DateTime::<Utc>::MIN_UTC {
        return f64::INFINITY;
    }
    let secs = now.signed_duration_since(last_run).num_seconds().max(0);
    secs as f64 / 3600.0
}
