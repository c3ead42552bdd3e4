use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::timestamp::default_timestamp_path;

/// Resolution used when none is configured.
pub const DEFAULT_RESOLUTION: &str = "1080p";

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub hydra: HydraConfig,
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// NZBHydra endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HydraConfig {
    /// Base URL under which NZBHydra is reachable (e.g., "http://localhost:5076")
    pub url: String,
    /// NZBHydra API key
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Search run configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// File with one search term per line.
    pub terms_file: PathBuf,
    /// Directory found NZB files are saved to.
    pub output_dir: PathBuf,
    /// Last-run timestamp file. Defaults to `lastsearch.txt` next to the terms file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_file: Option<PathBuf>,
    /// NZBHydra category to search.
    pub category: String,
    /// Indexers to search.
    #[serde(default)]
    pub indexers: Vec<String>,
    /// Minimum result size.
    #[serde(default = "default_min_size")]
    pub min_size: u64,
    /// Maximum result size.
    #[serde(default = "default_max_size")]
    pub max_size: u64,
    /// Upper bound for the age of results, in days.
    pub max_age_days: u32,
    /// Minimum hours between two runs (0 = always run).
    #[serde(default)]
    pub frequency_hours: u32,
    /// Delay after every query, in seconds.
    #[serde(default = "default_cooldown")]
    pub request_cooldown_secs: u64,
    /// Resolution token used for discovery and, optionally, appended to terms.
    #[serde(default = "default_resolution")]
    pub resolution: Option<String>,
    /// Append `resolution` to every search term.
    #[serde(default)]
    pub append_resolution: bool,
}

fn default_min_size() -> u64 {
    1
}

fn default_max_size() -> u64 {
    900_000
}

fn default_cooldown() -> u64 {
    10
}

fn default_resolution() -> Option<String> {
    Some(DEFAULT_RESOLUTION.to_string())
}

impl SearchConfig {
    /// Timestamp file actually used for this configuration.
    pub fn timestamp_path(&self) -> PathBuf {
        self.timestamp_file
            .clone()
            .unwrap_or_else(|| default_timestamp_path(&self.terms_file))
    }

    /// Resolution token, falling back to the default one.
    pub fn resolution_or_default(&self) -> &str {
        self.resolution
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(DEFAULT_RESOLUTION)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
}

/// Minimum severity that gets logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    #[serde(alias = "err")]
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Filter directive for `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "err" | "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub hydra: SanitizedHydraConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

/// Sanitized NZBHydra config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedHydraConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            hydra: SanitizedHydraConfig {
                url: config.hydra.url.clone(),
                api_key_configured: !config.hydra.api_key.is_empty(),
                timeout_secs: config.hydra.timeout_secs,
            },
            search: config.search.clone(),
            logging: config.logging.clone(),
        }
    }
}
