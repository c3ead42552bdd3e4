//! Search-term discovery: pairs each show with a release group whose query
//! returns results.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::FeedClient;
use crate::config::Config;
use crate::feed::ResultRecord;
use crate::query::{cooldown, QuerySession, SearchRequest};
use crate::terms::{append_term, load_terms};

use super::{DiscoveryError, DiscoveryOutcome, DiscoveryReport, ShowReport};

/// Strip `:` `,` `(` `)` from a show name and collapse whitespace.
pub fn clean_show_name(show: &str) -> String {
    show.chars()
        .filter(|c| !matches!(c, ':' | ',' | '(' | ')'))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Groups (in the given order) that appear in some result title together
/// with the resolution. Matching is case-insensitive.
pub fn candidate_groups(groups: &[String], results: &[ResultRecord], resolution: &str) -> Vec<String> {
    let resolution = resolution.to_lowercase();
    let titles: Vec<String> = results
        .iter()
        .map(|r| r.title.to_lowercase())
        .filter(|t| t.contains(&resolution))
        .collect();

    groups
        .iter()
        .filter(|group| {
            let group = group.to_lowercase();
            titles.iter().any(|t| t.contains(&group))
        })
        .cloned()
        .collect()
}

/// Finds a release group that publishes a show at the configured resolution.
pub struct TermDiscovery {
    config: Config,
    client: Arc<dyn FeedClient>,
}

impl TermDiscovery {
    pub fn new(config: Config, client: Arc<dyn FeedClient>) -> Self {
        Self { config, client }
    }

    /// Discover a term for every show and append the outcome lines to the
    /// configured terms file.
    pub async fn run(&self, groups_file: &Path, shows_file: &Path) -> Result<DiscoveryReport, DiscoveryError> {
        let groups = load_terms(groups_file).await?;
        let shows = load_terms(shows_file).await?;
        let terms_file = &self.config.search.terms_file;

        info!(
            groups = groups.len(),
            shows = shows.len(),
            terms_file = %terms_file.display(),
            "Discovering search terms"
        );

        let mut report = DiscoveryReport::default();
        for show in &shows {
            let show_report = self.discover(show, &groups).await;
            if let Some(line) = show_report.outcome.output_line() {
                append_term(terms_file, line).await?;
            }
            report.shows.push(show_report);
        }

        info!(
            validated = report.validated().len(),
            exhausted = report.exhausted(),
            no_results = report.no_results(),
            "Discovery complete"
        );
        Ok(report)
    }

    /// Discover a term for one show with a freshly seeded shuffle.
    pub async fn discover(&self, show: &str, groups: &[String]) -> ShowReport {
        let mut rng = StdRng::from_entropy();
        self.discover_with_rng(show, groups, &mut rng).await
    }

    /// Discover a term for one show, shuffling the groups with `rng`.
    pub async fn discover_with_rng<R: Rng + Send>(
        &self,
        show: &str,
        groups: &[String],
        rng: &mut R,
    ) -> ShowReport {
        let cleaned = clean_show_name(show);
        let mut report = ShowReport {
            show: show.to_string(),
            cleaned: cleaned.clone(),
            candidates: Vec::new(),
            outcome: DiscoveryOutcome::NoResults,
        };

        if cleaned.is_empty() {
            warn!(show, "Show name is empty after cleaning, skipping");
            return report;
        }

        let resolution = self.config.search.resolution_or_default();
        let request = SearchRequest::from_config(&self.config);

        let mut initial = QuerySession::new(cleaned.as_str());
        if !self.query(&mut initial, &request).await {
            info!(show = %cleaned, "No results for show, not trying groups");
            return report;
        }

        let mut shuffled = groups.to_vec();
        shuffled.shuffle(rng);
        report.candidates = candidate_groups(&shuffled, initial.results(), resolution);
        debug!(show = %cleaned, candidates = ?report.candidates, "Candidate groups");

        for group in &report.candidates {
            let term = format!("{} {} {}", group, cleaned, resolution);
            let mut session = QuerySession::new(term.as_str());
            if self.query(&mut session, &request).await {
                info!(show = %cleaned, term = %term, "Validated search term");
                report.outcome = DiscoveryOutcome::Validated(term);
                return report;
            }
        }

        warn!(
            show = %cleaned,
            candidates = report.candidates.len(),
            "No candidate group validated"
        );
        report.outcome = DiscoveryOutcome::Exhausted;
        report
    }

    /// Run a query followed by the cooldown. True if it found anything.
    async fn query(&self, session: &mut QuerySession, request: &SearchRequest) -> bool {
        let found = match session.execute(self.client.as_ref(), request).await {
            Ok(count) => count > 0,
            Err(e) => {
                warn!(term = %session.term(), error = %e, "Discovery query failed");
                false
            }
        };
        cooldown(self.config.search.request_cooldown_secs).await;
        found
    }
}
