//! Types for term discovery.

use serde::Serialize;
use thiserror::Error;

use crate::terms::TermsError;

/// Errors that abort a discovery run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A group or show list is missing, or the terms file cannot be appended to.
    #[error("term list error: {0}")]
    Terms(#[from] TermsError),
}

/// Result of discovering a term for one show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "term", rename_all = "snake_case")]
pub enum DiscoveryOutcome {
    /// The show alone found nothing; no candidate was tried.
    NoResults,
    /// A `"<group> <show> <resolution>"` query returned results.
    Validated(String),
    /// No candidate group produced results.
    Exhausted,
}

impl DiscoveryOutcome {
    /// Line appended to the terms file, if any. Exhaustion writes an empty line.
    pub fn output_line(&self) -> Option<&str> {
        match self {
            DiscoveryOutcome::NoResults => None,
            DiscoveryOutcome::Validated(term) => Some(term),
            DiscoveryOutcome::Exhausted => Some(""),
        }
    }
}

/// Discovery details for one show.
#[derive(Debug, Clone, Serialize)]
pub struct ShowReport {
    /// Show as listed in the shows file.
    pub show: String,
    /// Show name as queried.
    pub cleaned: String,
    /// Candidate groups in the order they were (or would have been) tried.
    pub candidates: Vec<String>,
    pub outcome: DiscoveryOutcome,
}

/// Summary of a discovery run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryReport {
    pub shows: Vec<ShowReport>,
}

impl DiscoveryReport {
    /// Terms appended to the terms file.
    pub fn validated(&self) -> Vec<&str> {
        self.shows
            .iter()
            .filter_map(|s| match &s.outcome {
                DiscoveryOutcome::Validated(term) => Some(term.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn exhausted(&self) -> usize {
        self.count(DiscoveryOutcome::Exhausted)
    }

    pub fn no_results(&self) -> usize {
        self.count(DiscoveryOutcome::NoResults)
    }

    fn count(&self, outcome: DiscoveryOutcome) -> usize {
        self.shows.iter().filter(|s| s.outcome == outcome).count()
    }
}
