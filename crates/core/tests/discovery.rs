//! Term discovery integration tests.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;
use tokio::time::Instant;

use nzbsched_core::{
    testing::{fixtures, MockFeedClient},
    load_terms, Config, DiscoveryError, DiscoveryOutcome, TermDiscovery, TermsError,
};

/// Test helper with group/show lists in a temporary directory.
struct TestHarness {
    config: Config,
    client: Arc<MockFeedClient>,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new(groups: &str, shows: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(temp_dir.path().join("groups.txt"), groups).unwrap();
        std::fs::write(temp_dir.path().join("shows.txt"), shows).unwrap();

        Self {
            config: fixtures::config(temp_dir.path()),
            client: Arc::new(MockFeedClient::new()),
            temp_dir,
        }
    }

    fn discovery(&self) -> TermDiscovery {
        TermDiscovery::new(self.config.clone(), self.client.clone())
    }

    fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    fn terms(&self) -> String {
        std::fs::read_to_string(self.path("terms.txt")).unwrap_or_default()
    }
}

#[tokio::test]
async fn test_run_appends_validated_and_sentinel_lines() {
    let harness = TestHarness::new("GRP\n", "Show: One\nShow Two (2020)\nNobody\n");
    harness
        .client
        .set_feed_handler(|term| match term {
            "Show One" => Some(fixtures::feed_with_titles(&["Show.One.S01E01.1080p-GRP"])),
            "GRP Show One 1080p" => Some(fixtures::feed_with_titles(&["Show.One.S01E02.1080p-GRP"])),
            "Show Two 2020" => Some(fixtures::feed_with_titles(&["Show.Two.2020.1080p-GRP"])),
            _ => None,
        })
        .await;

    let report = harness
        .discovery()
        .run(&harness.path("groups.txt"), &harness.path("shows.txt"))
        .await
        .unwrap();

    assert_eq!(report.validated(), vec!["GRP Show One 1080p"]);
    assert_eq!(report.exhausted(), 1);
    assert_eq!(report.no_results(), 1);
    assert_eq!(harness.terms(), "GRP Show One 1080p\n\n");
    assert_eq!(
        harness.client.feed_terms().await,
        vec![
            "Show One",
            "GRP Show One 1080p",
            "Show Two 2020",
            "GRP Show Two 2020 1080p",
            "Nobody",
        ]
    );
}

#[tokio::test]
async fn test_run_appends_to_existing_terms() {
    let harness = TestHarness::new("GRP\n", "Show\n");
    std::fs::write(harness.path("terms.txt"), "Existing\n").unwrap();
    harness
        .client
        .set_feed_handler(|_| Some(fixtures::feed_with_titles(&["Show.1080p-GRP"])))
        .await;

    harness
        .discovery()
        .run(&harness.path("groups.txt"), &harness.path("shows.txt"))
        .await
        .unwrap();
    harness
        .discovery()
        .run(&harness.path("groups.txt"), &harness.path("shows.txt"))
        .await
        .unwrap();

    assert_eq!(harness.terms(), "Existing\nGRP Show 1080p\nGRP Show 1080p\n");
}

#[tokio::test]
async fn test_run_starts_new_line_after_unterminated_terms_file() {
    let harness = TestHarness::new("GRP\n", "Show\n");
    std::fs::write(harness.path("terms.txt"), "Existing").unwrap();
    harness
        .client
        .set_feed_handler(|_| Some(fixtures::feed_with_titles(&["Show.1080p-GRP"])))
        .await;

    harness
        .discovery()
        .run(&harness.path("groups.txt"), &harness.path("shows.txt"))
        .await
        .unwrap();

    assert_eq!(harness.terms(), "Existing\nGRP Show 1080p\n");
    assert_eq!(
        load_terms(&harness.path("terms.txt")).await.unwrap(),
        vec!["Existing", "GRP Show 1080p"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_follows_every_query() {
    let mut harness = TestHarness::new("A\nB\n", "Show\n");
    harness.config.search.request_cooldown_secs = 5;
    harness
        .client
        .set_feed_handler(|term| {
            (term == "Show").then(|| fixtures::feed_with_titles(&["Show.1080p-A", "Show.1080p-B"]))
        })
        .await;

    let started = Instant::now();
    let report = harness
        .discovery()
        .run(&harness.path("groups.txt"), &harness.path("shows.txt"))
        .await
        .unwrap();

    // one show query, two failed validations
    assert_eq!(report.exhausted(), 1);
    assert!(started.elapsed() >= Duration::from_secs(15));

    let requests = harness.client.recorded_requests().await;
    assert_eq!(requests.len(), 3);
    for pair in requests.windows(2) {
        assert!(pair[1].timestamp - pair[0].timestamp >= Duration::from_secs(5));
    }
}

#[tokio::test]
async fn test_zero_initial_results_issue_no_candidate_queries() {
    let harness = TestHarness::new("A\nB\nC\n", "Unknown Show\n");

    let report = harness
        .discovery()
        .run(&harness.path("groups.txt"), &harness.path("shows.txt"))
        .await
        .unwrap();

    assert_eq!(report.shows[0].outcome, DiscoveryOutcome::NoResults);
    assert!(report.shows[0].candidates.is_empty());
    assert_eq!(harness.client.request_count().await, 1);
    assert!(!harness.path("terms.txt").exists());
}

#[tokio::test]
async fn test_validation_stops_at_first_hit() {
    let harness = TestHarness::new("", "");
    harness
        .client
        .set_feed_handler(|term| {
            if term == "Show" {
                Some(fixtures::feed_with_titles(&[
                    "Show.1080p-A",
                    "Show.1080p-B",
                    "Show.1080p-C",
                    "Show.1080p-D",
                ]))
            } else {
                Some(fixtures::feed_with_titles(&["Show.S02.1080p"]))
            }
        })
        .await;
    let groups: Vec<String> = ["A", "B", "C", "D"].iter().map(|g| g.to_string()).collect();

    let mut rng = StdRng::seed_from_u64(42);
    let report = harness
        .discovery()
        .discover_with_rng("Show", &groups, &mut rng)
        .await;

    assert_eq!(report.candidates.len(), 4);
    assert_eq!(harness.client.request_count().await, 2);
    assert_eq!(
        report.outcome,
        DiscoveryOutcome::Validated(format!("{} Show 1080p", report.candidates[0]))
    );
}

#[tokio::test]
async fn test_same_seed_same_candidate_order() {
    let harness = TestHarness::new("", "");
    harness
        .client
        .set_default_feed(fixtures::feed_with_titles(&["Show.1080p-A-B-C-D-E"]))
        .await;
    let groups: Vec<String> = ["A", "B", "C", "D", "E"].iter().map(|g| g.to_string()).collect();

    let first = harness
        .discovery()
        .discover_with_rng("Show", &groups, &mut StdRng::seed_from_u64(9))
        .await;
    let second = harness
        .discovery()
        .discover_with_rng("Show", &groups, &mut StdRng::seed_from_u64(9))
        .await;

    assert_eq!(first.candidates, second.candidates);
    let mut sorted = first.candidates.clone();
    sorted.sort();
    assert_eq!(sorted, groups);
}

#[tokio::test]
async fn test_missing_lists_fail_before_network() {
    let harness = TestHarness::new("A\n", "Show\n");

    let err = harness
        .discovery()
        .run(&harness.path("nope.txt"), &harness.path("shows.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::Terms(TermsError::NotFound(_))));

    let err = harness
        .discovery()
        .run(&harness.path("groups.txt"), &harness.path("nope.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::Terms(TermsError::NotFound(_))));

    assert_eq!(harness.client.request_count().await, 0);
}
