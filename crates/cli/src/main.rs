use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nzbsched_core::{
    load_config, validate_config, Config, FeedClient, HydraClient, LogLevel, RunOutcome,
    SanitizedConfig, SearchOrchestrator, TermDiscovery,
};

/// Config file used when neither `--config` nor `NZBSCHED_CONFIG` is set.
const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Parser)]
#[command(name = "nzbsched", version, about = "Scheduled NZBHydra searches")]
struct Cli {
    /// Configuration file [default: $NZBSCHED_CONFIG or config.toml]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Minimum log level (error, warn, info, debug); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search every term and download new results
    Search {
        /// Run even if the last run is more recent than `frequency_hours`
        #[arg(long)]
        force: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Discover group-specific search terms and append them to the terms file
    BuildTerms {
        /// File with one release group per line
        #[arg(long)]
        groups: PathBuf,

        /// File with one show name per line
        #[arg(long)]
        shows: PathBuf,

        /// Print the discovery report as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(|| {
            std::env::var("NZBSCHED_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
        })
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    let loaded = load_config(&config_path);

    let level = cli
        .log_level
        .or_else(|| loaded.as_ref().ok().map(|c| c.logging.level))
        .unwrap_or_default();
    init_logging(level);

    let config =
        loaded.with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded from {:?}", config_path);
    info!(
        "Effective configuration: {}",
        serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default()
    );

    let client: Arc<dyn FeedClient> =
        Arc::new(HydraClient::new(&config.hydra).context("Failed to create HTTP client")?);

    match cli.command {
        Command::Search { force, json } => search(config, client, force, json).await,
        Command::BuildTerms {
            groups,
            shows,
            json,
        } => build_terms(config, client, groups, shows, json).await,
    }
}

fn init_logging(level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn search(config: Config, client: Arc<dyn FeedClient>, force: bool, json: bool) -> Result<()> {
    let outcome = SearchOrchestrator::new(config, client)
        .ignore_frequency_gate(force)
        .run()
        .await
        .context("Search run failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        RunOutcome::TooSoon {
            last_run,
            elapsed_hours,
            frequency_hours,
        } => info!(
            "Skipped: last run at {} ({:.1}h ago, frequency {}h)",
            last_run, elapsed_hours, frequency_hours
        ),
        RunOutcome::Completed(report) => info!(
            "Searched {} terms: {} results, {} saved, {} failed terms",
            report.terms.len(),
            report.results(),
            report.saved(),
            report.failed_terms()
        ),
    }
    Ok(())
}

async fn build_terms(
    config: Config,
    client: Arc<dyn FeedClient>,
    groups: PathBuf,
    shows: PathBuf,
    json: bool,
) -> Result<()> {
    let terms_file = config.search.terms_file.clone();
    let report = TermDiscovery::new(config, client)
        .run(&groups, &shows)
        .await
        .context("Term discovery failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for term in report.validated() {
        info!("Added term: {}", term);
    }
    info!(
        "Discovered {} terms for {} shows ({} without results, {} exhausted), appended to {:?}",
        report.validated().len(),
        report.shows.len(),
        report.no_results(),
        report.exhausted(),
        terms_file
    );
    Ok(())
}
