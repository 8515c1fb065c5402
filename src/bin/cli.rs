//! Review Crawler CLI
//!
//! Local execution entry point.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use review_crawler::{
    browser::HttpPageDriver,
    error::Result,
    models::{Config, Input},
    pipeline::{self, STATISTICS_KEY},
    storage::{DatasetStorage, JSON_CONTENT_TYPE, LocalStorage},
};

/// Review Crawler - Listing Review Extractor
#[derive(Parser, Debug)]
#[command(
    name = "review-crawler",
    version,
    about = "Extracts and reconciles product reviews from listing pages"
)]
struct Cli {
    /// Path to storage directory containing config files and run output
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl reviews starting from the input's start URL
    Crawl {
        /// Path to run input (default: {storage_dir}/INPUT.json)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Override the start URL
        #[arg(long)]
        start_url: Option<String>,

        /// Override the number of reviews to collect (0 = unlimited)
        #[arg(long)]
        results_wanted: Option<usize>,

        /// Persist debug screenshots and markup snapshots
        #[arg(long)]
        debug: bool,

        /// Override retries per page visit
        #[arg(long)]
        max_retries: Option<u32>,
    },

    /// Validate configuration and run input
    Validate {
        /// Path to run input (default: {storage_dir}/INPUT.json)
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Show stored dataset and run statistics
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Load run input, falling back to defaults when the file is absent.
fn load_input(path: &Path) -> Result<Input> {
    if path.exists() {
        Input::load(path)
    } else {
        log::warn!("No run input at {}. Using defaults.", path.display());
        Ok(Input::default())
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Review Crawler starting...");

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    log::info!("Loaded configuration from {}", cli.storage_dir.display());

    let storage = LocalStorage::new(&cli.storage_dir);
    let default_input = cli.storage_dir.join("INPUT.json");

    match cli.command {
        Command::Crawl {
            input,
            start_url,
            results_wanted,
            debug,
            max_retries,
        } => {
            let mut input = load_input(&input.unwrap_or(default_input))?;
            if let Some(url) = start_url {
                input.start_url = Some(url);
            }
            if let Some(wanted) = results_wanted {
                input.results_wanted = wanted;
            }
            if let Some(retries) = max_retries {
                input.max_request_retries = retries;
            }
            input.debug |= debug;

            // Fail before any navigation when the input is unusable.
            input.validate()?;
            config.validate()?;

            let mut driver =
                HttpPageDriver::new(&config.crawler, input.proxy_configuration.as_ref())?;
            let stats = pipeline::run_crawler(&config, &input, &mut driver, &storage).await?;

            log::info!(
                "Crawl complete! {} reviews from {} page(s) in {}",
                stats.total_reviews_scraped,
                stats.pages_processed,
                stats.duration
            );
        }

        Command::Validate { input } => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (crawler settings and review selectors)");

            let input = load_input(&input.unwrap_or(default_input))?;
            match input.normalized_start_url() {
                Ok(url) => log::info!("✓ Input OK (start URL {})", url),
                Err(e) => {
                    log::error!("Input validation failed: {}", e);
                    return Err(e);
                }
            }

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());

            let reviews = storage.load_reviews().await?;
            log::info!("Dataset: {} review(s)", reviews.len());

            match storage.get_value(STATISTICS_KEY, JSON_CONTENT_TYPE).await? {
                Some(bytes) => {
                    if let Ok(stats) = serde_json::from_slice::<serde_json::Value>(&bytes) {
                        log::info!("Last run statistics: {}", stats);
                    }
                }
                None => log::info!("No run statistics found yet."),
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
