//! The search run.

use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::FeedClient;
use crate::config::{Config, ConfigError, SanitizedConfig};
use crate::query::{cooldown, QuerySession, SaveSummary, SearchRequest};
use crate::terms::load_terms;
use crate::timestamp::{effective_max_age_at, elapsed_hours, LastRunStore};

use super::{RunError, RunOutcome, RunReport, TermOutcome, TermReport};

/// Runs every configured search term once and saves what it finds.
pub struct SearchOrchestrator {
    config: Config,
    client: Arc<dyn FeedClient>,
    last_run: Option<DateTime<Utc>>,
    ignore_gate: bool,
}

impl SearchOrchestrator {
    /// Create a new orchestrator.
    pub fn new(config: Config, client: Arc<dyn FeedClient>) -> Self {
        Self {
            config,
            client,
            last_run: None,
            ignore_gate: false,
        }
    }

    /// Use this last-run time instead of reading the timestamp file.
    pub fn with_last_run(mut self, last_run: DateTime<Utc>) -> Self {
        self.last_run = Some(last_run);
        self
    }

    /// Run even if the last run is more recent than `frequency_hours`.
    pub fn ignore_frequency_gate(mut self, ignore: bool) -> Self {
        self.ignore_gate = ignore;
        self
    }

    pub async fn run(&self) -> Result<RunOutcome, RunError> {
        self.run_at(Utc::now()).await
    }

    /// Run as if started at `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunOutcome, RunError> {
        let search = &self.config.search;
        debug!(config = ?SanitizedConfig::from(&self.config), "Starting search run");

        verify_file(&search.terms_file, "Search terms file").await?;
        verify_dir(&search.output_dir, "Output directory").await?;

        let store = LastRunStore::new(search.timestamp_path());
        let last_run = match self.last_run {
            Some(last_run) => last_run,
            None => store.read().await,
        };
        let never_run = last_run == DateTime::<Utc>::MIN_UTC;

        if !self.ignore_gate && search.frequency_hours > 0 {
            let elapsed = elapsed_hours(last_run, now);
            if elapsed < search.frequency_hours as f64 {
                info!(
                    last_run = %last_run,
                    elapsed_hours = elapsed,
                    frequency_hours = search.frequency_hours,
                    "Last run too recent, not searching"
                );
                return Ok(RunOutcome::TooSoon {
                    last_run,
                    elapsed_hours: elapsed,
                    frequency_hours: search.frequency_hours,
                });
            }
        }

        let max_age_days = effective_max_age_at(last_run, search.max_age_days, now);
        let request = SearchRequest::from_config(&self.config).with_max_age(max_age_days);

        let terms = load_terms(&search.terms_file).await?;
        info!(
            terms = terms.len(),
            max_age_days,
            client = self.client.name(),
            "Searching"
        );

        let mut reports = Vec::with_capacity(terms.len());
        for term in terms {
            let query = self.query_for(&term);
            let outcome = self.search_term(&query, &request).await;
            reports.push(TermReport {
                term,
                query,
                outcome,
            });
            cooldown(search.request_cooldown_secs).await;
        }

        let failed = reports
            .iter()
            .filter(|r| matches!(r.outcome, TermOutcome::Failed { .. }))
            .count();
        // a run where every query failed searched nothing; keep the old window
        let timestamp_written = reports.is_empty() || failed < reports.len();
        if timestamp_written {
            store.write(now).await?;
            debug!(path = %store.path().display(), "Last-run timestamp saved");
        } else {
            warn!(
                path = %store.path().display(),
                failed_terms = failed,
                "Every search failed, keeping previous last-run timestamp"
            );
        }

        let report = RunReport {
            started_at: now,
            last_run: (!never_run).then_some(last_run),
            max_age_days,
            terms: reports,
            timestamp_written,
        };
        info!(
            terms = report.terms.len(),
            results = report.results(),
            saved = report.saved(),
            failed_terms = report.failed_terms(),
            "Search run complete"
        );
        Ok(RunOutcome::Completed(report))
    }

    async fn search_term(&self, query: &str, request: &SearchRequest) -> TermOutcome {
        let mut session = QuerySession::new(query);
        match session.execute(self.client.as_ref(), request).await {
            Ok(0) => TermOutcome::Completed {
                results: 0,
                saves: SaveSummary::default(),
            },
            Ok(results) => {
                let saves = session
                    .save_results(self.client.as_ref(), &self.config.search.output_dir)
                    .await;
                TermOutcome::Completed { results, saves }
            }
            Err(e) => {
                warn!(term = %query, error = %e, "Search failed, continuing with next term");
                TermOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Term as sent to the API.
    fn query_for(&self, term: &str) -> String {
        let search = &self.config.search;
        if !search.append_resolution {
            return term.to_string();
        }

        let resolution = search.resolution_or_default();
        if term.to_lowercase().contains(&resolution.to_lowercase()) {
            term.to_string()
        } else {
            format!("{} {}", term, resolution)
        }
    }
}

async fn verify_file(path: &Path, what: &'static str) -> Result<(), ConfigError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(missing(path, what)),
    }
}

async fn verify_dir(path: &Path, what: &'static str) -> Result<(), ConfigError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        _ => Err(missing(path, what)),
    }
}

fn missing(path: &Path, what: &'static str) -> ConfigError {
    ConfigError::MissingPath {
        what,
        path: path.display().to_string(),
    }
}
