//! Query and save result types.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::client::TransportError;
use crate::feed::FeedError;

/// Errors from running one search query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Search request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Search response could not be parsed: {0}")]
    Parse(#[from] FeedError),
}

/// Why a record was not downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The record has no download link.
    NoLink,
    /// A file with the target name is already in the output directory.
    AlreadyExists { path: PathBuf },
}

/// What happened to a single result record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved { path: PathBuf, bytes: usize },
    Skipped { title: String, skip: SkipReason },
    Failed { title: String, reason: String },
}

/// Outcomes of saving every record of a query, in result order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
    pub outcomes: Vec<SaveOutcome>,
}

impl SaveSummary {
    pub fn push(&mut self, outcome: SaveOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn saved(&self) -> usize {
        self.count(|o| matches!(o, SaveOutcome::Saved { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, SaveOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SaveOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&SaveOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}
