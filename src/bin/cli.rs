//! artindex CLI
//!
//! Local execution entry point: runs the rebuild and poll loops together,
//! or one-shot index operations for inspection.

use std::path::PathBuf;
use std::sync::Arc;

use artindex::{
    error::Result,
    index::ProjectIndexer,
    models::Config,
    poller::EventPoller,
    services::{
        GraphClient, GraphProjectSource, HttpEventFeed, HttpNameLookup, LogSink,
        MetadataBirthdaySource, NameCache,
    },
    utils::http,
};
use chrono::Utc;
use clap::{Parser, Subcommand};

/// artindex - generative-art project indexer and activity relay
#[derive(Parser, Debug)]
#[command(
    name = "artindex",
    version,
    about = "Indexes generative-art projects and relays marketplace activity"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the index rebuild and event poll loops until interrupted
    Run,

    /// Rebuild the index once and print a summary
    Rebuild,

    /// Rebuild once, then look up a project by name
    Lookup {
        /// Project name (normalized internally)
        name: String,
    },

    /// Rebuild once, then pick a random open-edition project
    Sample,

    /// Rebuild once, then list projects born on a date
    Birthdays {
        /// Date as MM-DD (default: today, UTC)
        #[arg(long)]
        date: Option<String>,
    },

    /// Validate the configuration file
    Validate,
}

type Indexer = ProjectIndexer<GraphProjectSource, MetadataBirthdaySource>;

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn build_indexer(config: &Config, client: &reqwest::Client) -> Indexer {
    let graph = GraphClient::new(client.clone(), config.indexer.graph_url.clone());
    let metadata = GraphClient::new(client.clone(), config.indexer.metadata_url.clone());
    let source = GraphProjectSource::new(graph, config.indexer.page_size);
    let birthdays = MetadataBirthdaySource::new(metadata, config.indexer.page_size);
    ProjectIndexer::new(
        source,
        birthdays,
        &config.indexer,
        config.sampler.max_attempts,
    )
}

fn build_poller(config: &Config, client: &reqwest::Client) -> EventPoller<HttpEventFeed, LogSink> {
    let feed = HttpEventFeed::new(client.clone(), &config.poller);
    let names = NameCache::new(HttpNameLookup::new(client.clone(), &config.names));
    EventPoller::new(feed, LogSink::new(names), &config.poller)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("artindex starting...");

    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    let client = http::create_client(&config.http)?;

    match cli.command {
        Command::Run => {
            let indexer = Arc::new(build_indexer(&config, &client));
            let poller = Arc::new(build_poller(&config, &client));

            log::info!(
                "Rebuilding every {} min, polling every {} ms",
                config.indexer.refresh_interval_minutes,
                config.poller.poll_interval_ms
            );

            let index_task = tokio::spawn(Arc::clone(&indexer).run());
            let poll_task = tokio::spawn(Arc::clone(&poller).run());
            let _ = tokio::join!(index_task, poll_task);
        }

        Command::Rebuild => {
            let indexer = build_indexer(&config, &client);
            indexer.rebuild().await?;
            let snapshot = indexer.snapshot();
            log::info!(
                "Indexed {} projects, {} distinct birthday dates",
                snapshot.len(),
                snapshot.birthday_count()
            );
        }

        Command::Lookup { name } => {
            let indexer = build_indexer(&config, &client);
            indexer.rebuild().await?;
            match indexer.lookup(&name) {
                Some(project) => log::info!(
                    "#{} '{}' on {} - {}/{} minted, active: {}",
                    project.project_id,
                    project.name,
                    project.contract,
                    project.invocations,
                    project.max_invocations,
                    project.active
                ),
                None => log::warn!("No project found for '{}'", name),
            }
        }

        Command::Sample => {
            let indexer = build_indexer(&config, &client);
            indexer.rebuild().await?;
            match indexer.sample_qualifying(|p| p.is_open_edition()) {
                Some(project) => log::info!(
                    "Sampled #{} '{}' ({} editions)",
                    project.project_id,
                    project.name,
                    project.invocations
                ),
                None => log::warn!("No qualifying project found"),
            }
        }

        Command::Birthdays { date } => {
            let indexer = build_indexer(&config, &client);
            indexer.rebuild().await?;
            let date = date.unwrap_or_else(|| Utc::now().format("%m-%d").to_string());
            let born = indexer.birthdays_on(&date);
            if born.is_empty() {
                log::info!("No project birthdays on {}", date);
            }
            for project in born {
                log::info!(
                    "{}: #{} '{}' (created {})",
                    date,
                    project.project_id,
                    project.name,
                    project
                        .start_time
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_default()
                );
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            // validate() already ran above; getting here means it passed.
            log::info!("Config OK ({} contracts)", config.indexer.contracts.len());
        }
    }

    log::info!("Done!");

    Ok(())
}
