//! Shinsho Finder CLI
//!
//! Local execution entry point, run on a schedule.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use shinsho_finder::{
    error::{AppError, Result},
    models::Config,
    pipeline,
    services::{OpenBdClient, SocialPublisher, XClient},
    storage::{LocalStorage, StateStore},
    utils::http,
};

/// Shinsho Finder - new shinsho releases from openBD
#[derive(Parser, Debug)]
#[command(
    name = "shinsho-finder",
    version,
    about = "Finds newly catalogued shinsho on openBD and publishes them"
)]
struct Cli {
    /// Root directory for data/ and docs/
    #[arg(short, long, default_value = ".")]
    storage_dir: PathBuf,

    /// Path to config file (default: {storage_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline: diff, classify, save, post, feed
    Run {
        /// Do not post to the social channel
        #[arg(long)]
        no_post: bool,
    },

    /// Re-render the RSS feed from the stored catalog
    Feed,

    /// Scan openBD for shinsho series labels and report coverage
    Labels,

    /// Validate the configuration
    Validate,

    /// Show stored snapshot, catalog and posted counts
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => {
            if !path.exists() {
                return Err(AppError::config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Config::load(path)?
        }
        None => Config::load_or_default(cli.storage_dir.join("config.toml")),
    };

    let storage = LocalStorage::new(&cli.storage_dir, config.paths.clone());

    match cli.command {
        Command::Run { no_post } => {
            config.validate()?;
            let source = OpenBdClient::new(&config.openbd)?;

            let publisher = if no_post || !config.social.enabled {
                None
            } else {
                let client = http::create_async_client(&config.openbd)?;
                let publisher = XClient::from_env(client, &config.social);
                if publisher.is_none() {
                    log::warn!("X API credentials not configured. Skipping posts.");
                }
                publisher
            };

            let summary = pipeline::run_pipeline(
                &config,
                &source,
                &storage,
                publisher.as_ref().map(|p| p as &dyn SocialPublisher),
                Utc::now(),
            )
            .await?;

            log::info!(
                "New ISBNs: {}, new books: {}, posted: {}, catalog: {}",
                summary.new_isbn_count,
                summary.new_books,
                summary.posted,
                summary.catalog_size
            );
        }

        Command::Feed => {
            let count = pipeline::regenerate_feed(&config, &storage, Utc::now()).await?;
            log::info!(
                "Feed written to {} ({} books in catalog)",
                storage.path(&config.paths.feed).display(),
                count
            );
        }

        Command::Labels => {
            config.validate()?;
            let source = OpenBdClient::new(&config.openbd)?;
            let report =
                pipeline::run_label_discovery(&config, &source, &storage, Utc::now()).await?;
            log::info!(
                "Report saved to {} ({} labels)",
                storage.path(&config.paths.label_report).display(),
                report.total_unique_labels
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} labels, recency policy {:?})",
                config.classifier.labels.len(),
                config.recency.policy
            );
        }

        Command::Info => {
            log::info!("Storage directory: {}", storage.root_dir().display());

            let snapshot = storage.load_snapshot().await?;
            let catalog = storage.load_catalog().await?;
            let posted = storage.load_posted().await?;

            log::info!("Known ISBNs: {}", snapshot.len());
            log::info!("Catalog books: {}", catalog.len());
            log::info!("Posted ISBNs: {}", posted.len());
            if let Some(latest) = catalog.iter().max_by_key(|b| b.discovered_at) {
                log::info!("Latest: {} ({})", latest.title, latest.discovered_at);
            }
        }
    }

    log::info!("Done!");
    Ok(())
}
