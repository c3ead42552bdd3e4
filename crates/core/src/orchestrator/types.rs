//! Types for the search orchestrator.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::query::SaveSummary;
use crate::terms::TermsError;
use crate::timestamp::TimestampError;

/// Errors that abort a search run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Invalid or incomplete configuration, detected before any request.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The search terms could not be loaded.
    #[error("search terms error: {0}")]
    Terms(#[from] TermsError),

    /// The last-run timestamp could not be saved.
    #[error("failed to persist run state: {0}")]
    Persistence(#[from] TimestampError),
}

/// What happened to one search term.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TermOutcome {
    /// The query succeeded (possibly with zero results).
    Completed { results: usize, saves: SaveSummary },
    /// The query failed; the run moved on to the next term.
    Failed { error: String },
}

/// Per-term entry of a run report.
#[derive(Debug, Clone, Serialize)]
pub struct TermReport {
    /// Term as listed in the terms file.
    pub term: String,
    /// Term as sent to the API (with the resolution appended, if configured).
    pub query: String,
    pub outcome: TermOutcome,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Start of the run; persisted as the new last-run timestamp.
    pub started_at: DateTime<Utc>,
    /// Previous run, `None` if there was none.
    pub last_run: Option<DateTime<Utc>>,
    /// Age window sent with every query, in days.
    pub max_age_days: u32,
    pub terms: Vec<TermReport>,
    /// False when every query failed and the previous timestamp was kept.
    pub timestamp_written: bool,
}

impl RunReport {
    /// Files written during the run.
    pub fn saved(&self) -> usize {
        self.summaries().map(SaveSummary::saved).sum()
    }

    /// Results found across all terms.
    pub fn results(&self) -> usize {
        self.terms
            .iter()
            .map(|t| match &t.outcome {
                TermOutcome::Completed { results, .. } => *results,
                TermOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    /// Terms whose query failed.
    pub fn failed_terms(&self) -> usize {
        self.terms
            .iter()
            .filter(|t| matches!(t.outcome, TermOutcome::Failed { .. }))
            .count()
    }

    fn summaries(&self) -> impl Iterator<Item = &SaveSummary> {
        self.terms.iter().filter_map(|t| match &t.outcome {
            TermOutcome::Completed { saves, .. } => Some(saves),
            TermOutcome::Failed { .. } => None,
        })
    }
}

/// Result of [`SearchOrchestrator::run`](super::SearchOrchestrator::run).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The last run is more recent than the configured frequency allows.
    TooSoon {
        last_run: DateTime<Utc>,
        elapsed_hours: f64,
        frequency_hours: u32,
    },
    Completed(RunReport),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SaveOutcome;
    use std::path::PathBuf;

    #[test]
    fn test_report_totals() {
        let mut saves = SaveSummary::default();
        saves.push(SaveOutcome::Saved {
            path: PathBuf::from("/out/a.nzb"),
            bytes: 1,
        });
        let report = RunReport {
            started_at: Utc::now(),
            last_run: None,
            max_age_days: 30,
            terms: vec![
                TermReport {
                    term: "a".into(),
                    query: "a".into(),
                    outcome: TermOutcome::Completed { results: 3, saves },
                },
                TermReport {
                    term: "b".into(),
                    query: "b".into(),
                    outcome: TermOutcome::Failed {
                        error: "timeout".into(),
                    },
                },
            ],
            timestamp_written: true,
        };

        assert_eq!(report.saved(), 1);
        assert_eq!(report.results(), 3);
        assert_eq!(report.failed_terms(), 1);

        let json = serde_json::to_value(RunOutcome::Completed(report)).unwrap();
        assert_eq!(json["outcome"], "completed");
        assert_eq!(json["terms"][1]["outcome"]["status"], "failed");
    }
}
