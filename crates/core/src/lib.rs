pub mod client;
pub mod config;
pub mod discovery;
pub mod feed;
pub mod orchestrator;
pub mod query;
pub mod terms;
pub mod testing;
pub mod timestamp;

pub use client::{Download, FeedClient, FeedResponse, HydraClient, TransportError};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, HydraConfig,
    LogLevel, SanitizedConfig, SearchConfig,
};
pub use discovery::{
    clean_show_name, DiscoveryError, DiscoveryOutcome, DiscoveryReport, TermDiscovery,
};
pub use feed::{parse_feed, FeedError, ResultRecord};
pub use orchestrator::{RunError, RunOutcome, RunReport, SearchOrchestrator, TermOutcome};
pub use query::{QueryError, QuerySession, SaveOutcome, SaveSummary, SearchRequest};
pub use terms::{append_term, load_terms, TermsError};
pub use timestamp::{effective_max_age, LastRunStore, TimestampError};
