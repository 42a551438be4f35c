//! Species photo crawler CLI
//!
//! Local execution entry point.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use photo_crawler::{
    error::{AppError, Result},
    models::Config,
    pipeline,
    storage::{LocalStorage, PhotoStorage},
    utils::http,
};

const DEFAULT_CONFIG: &str = "data/config.toml";

/// photo-crawler - Reference photos per species from iNaturalist
#[derive(Parser, Debug)]
#[command(
    name = "photo-crawler",
    version,
    about = "Collects reference photos per species from iNaturalist"
)]

struct Cli {
    /// Path to the TOML configuration file [default: data/config.toml if present]
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
    /// Resolve names, then download photos for every taxon
    Crawl {
        /// Output root (default: output.root_dir from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Names to crawl instead of the configured list (repeatable)
        #[arg(short, long = "name")]
        names: Vec<String>,

        /// Override budget.max_photos
        #[arg(long)]
        max_photos: Option<usize>,

        /// Override budget.max_pages
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// Resolve names to taxa without downloading
    Resolve {
        /// Names to resolve instead of the configured list (repeatable)
        #[arg(short, long = "name")]
        names: Vec<String>,
    },

    /// Validate configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (mut config, source) = Config::resolve(cli.config.as_deref(), Path::new(DEFAULT_CONFIG))
        .inspect_err(|e| log::error!("Config load failed: {}", e))?;
    if let Some(path) = &source {
        log::info!("Loaded configuration from {}", path.display());
    }

    match cli.command {
        Command::Crawl {
            output,
            names,
            max_photos,
            max_pages,
        } => {
            if let Some(dir) = output {
                config.output.root_dir = dir;
            }
            if !names.is_empty() {
                config.names = names;
            }
            if let Some(n) = max_photos {
                config.budget.max_photos = n;
            }
            if let Some(n) = max_pages {
                config.budget.max_pages = n;
            }

            let client = http::create_async_client(&config.crawler)?;
            let storage: Arc<dyn PhotoStorage> =
                Arc::new(LocalStorage::new(&config.output.root_dir));
            let report = pipeline::run_crawler(Arc::new(config), storage, &client).await?;

            for species in report.species.iter().filter(|s| s.error.is_some()) {
                log::warn!(
                    "{} / {}: {}",
                    species.query,
                    species.species,
                    species.error.as_deref().unwrap_or_default()
                );
            }
            log::info!("Crawl complete!");
        }

        Command::Resolve { names } => {
            if !names.is_empty() {
                config.names = names;
            }

            let client = http::create_async_client(&config.crawler)?;
            let storage: Arc<dyn PhotoStorage> =
                Arc::new(LocalStorage::new(&config.output.root_dir));
            let resolution = pipeline::run_resolve(Arc::new(config), storage, &client).await?;

            log::info!(
                "{} taxa resolved ({} names failed, {} without matches)",
                resolution.jobs.len(),
                resolution.names_failed,
                resolution.names_empty
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if source.is_none() {
                let e = AppError::config(format!("no configuration file at {}", DEFAULT_CONFIG));
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} names, up to {} photos from {} pages each)",
                config.names.len(),
                config.budget.max_photos,
                config.budget.max_pages
            );
        }
    }

    log::info!("Done!");

    Ok(())
}
