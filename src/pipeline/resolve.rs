// src/pipeline/resolve.rs

//! Resolve-only run: lists the taxa a crawl would target without fetching
//! observations or writing anything.

use std::sync::Arc;

use reqwest::Client;

use crate::error::Result;
use crate::models::Config;
use crate::storage::PhotoStorage;
use crate::utils::rate_limit::RateLimits;

use super::crawl::{PhotoCrawler, Resolution};

/// Resolve the configured names and log each planned species directory.
pub async fn run_resolve(
    config: Arc<Config>,
    storage: Arc<dyn PhotoStorage>,
    client: &Client,
) -> Result<Resolution> {
    config.validate()?;

    let limits = RateLimits::from_config(&config.rate_limit);
    let crawler = PhotoCrawler::new(Arc::clone(&config), client.clone(), storage, limits);
    let resolution = crawler.resolve_all().await;

    for job in &resolution.jobs {
        log::info!(
            "{} -> {} (id {}, rank {}) => {}",
            job.query,
            job.taxon.scientific_name,
            job.taxon.id,
            job.taxon.rank,
            job.directory.display()
        );
    }

    Ok(resolution)
}
