// src/pipeline/crawl.rs

//! Photo crawling pipeline.
//!
//! Stage 1 resolves every configured name into taxa, one name at a time.
//! Stage 2 crawls the resulting species directories concurrently, bounded by
//! `crawler.max_concurrent`. Failures stay inside the smallest unit they hit:
//! a name, a taxon, or a single photo.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{Config, CrawlReport, DownloadTask, SpeciesOutcome, TaxonRecord};
use crate::services::{Downloader, ObservationSource, PhotoSelector, TaxonResolver};
use crate::storage::PhotoStorage;
use crate::utils::photo_file_name;
use crate::utils::rate_limit::RateLimits;

/// One resolved taxon bound to the directory it owns for this run.
#[derive(Debug, Clone)]
pub struct SpeciesJob {
    pub query: String,
    pub taxon: TaxonRecord,
    pub directory: PathBuf,
}

/// Result of the resolution stage.
#[derive(Debug, Default)]
pub struct Resolution {
    pub jobs: Vec<SpeciesJob>,
    pub names_failed: usize,
    pub names_empty: usize,
}

/// Next free file index of one species directory.
///
/// Owned by the worker crawling that species; an index is only consumed once
/// its file is on disk, so written indices stay contiguous from zero.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    next: usize,
}

impl SequenceCounter {
    pub fn peek(&self) -> usize {
        self.next
    }

    pub fn commit(&mut self) -> usize {
        let index = self.next;
        self.next += 1;
        index
    }
}

/// Drives resolution, paging and downloads for one run.
pub struct PhotoCrawler {
    config: Arc<Config>,
    storage: Arc<dyn PhotoStorage>,
    resolver: TaxonResolver,
    observations: ObservationSource,
    selector: PhotoSelector,
    downloader: Downloader,
}

impl PhotoCrawler {
    /// Build a crawler; `limits` is shared by every worker of the run.
    pub fn new(
        config: Arc<Config>,
        client: Client,
        storage: Arc<dyn PhotoStorage>,
        limits: RateLimits,
    ) -> Self {
        let resolver = TaxonResolver::new(&config, client.clone(), limits.search);
        let observations = ObservationSource::new(&config, client.clone(), limits.observations);
        let selector = PhotoSelector::new(&config.photos);
        let downloader = Downloader::new(
            client,
            Arc::clone(&storage),
            limits.downloads,
            config.crawler.retry_backoff(),
        );

        Self {
            config,
            storage,
            resolver,
            observations,
            selector,
            downloader,
        }
    }

    /// Resolve every configured name into species jobs.
    ///
    /// Lookup failures and empty results are counted, never raised. Taxa that
    /// map to an already claimed directory are dropped so each directory has
    /// exactly one owner.
    pub async fn resolve_all(&self) -> Resolution {
        let mut resolution = Resolution::default();
        let mut claimed = HashSet::new();

        for name in self.config.unique_names() {
            let taxa = match self
                .resolver
                .resolve(&name, self.config.api.taxa_per_page)
                .await
            {
                Ok(taxa) => taxa,
                Err(e) => {
                    resolution.names_failed += 1;
                    log::warn!("Skipping '{}': {}", name, e);
                    continue;
                }
            };

            if taxa.is_empty() {
                resolution.names_empty += 1;
                log::warn!("No taxa found for '{}'", name);
                continue;
            }

            log::info!("'{}' resolved to {} taxa", name, taxa.len());
            for taxon in taxa {
                let directory = self.storage.species_dir(&name, &taxon.scientific_name);
                if !claimed.insert(directory.clone()) {
                    log::debug!(
                        "Taxon {} ({}) shares {} with an earlier taxon, skipping",
                        taxon.id,
                        taxon.scientific_name,
                        directory.display()
                    );
                    continue;
                }
                resolution.jobs.push(SpeciesJob {
                    query: name.clone(),
                    taxon,
                    directory,
                });
            }
        }

        resolution
    }

    /// Crawl one species into its directory.
    pub async fn crawl_species(&self, job: SpeciesJob) -> SpeciesOutcome {
        let species = job.taxon.scientific_name.clone();
        let mut outcome = SpeciesOutcome {
            query: job.query,
            taxon_id: job.taxon.id,
            species: species.clone(),
            directory: job.directory.clone(),
            photos_written: 0,
            photos_failed: 0,
            pages_fetched: 0,
            error: None,
        };

        if let Err(e) = self.storage.ensure_dir(&job.directory).await {
            log::warn!("Skipping species {}: {}", species, e);
            outcome.error = Some(e.to_string());
            return outcome;
        }

        let mut cursor = self.observations.cursor(job.taxon.id, self.config.budget);
        let mut sequence = SequenceCounter::default();

        loop {
            let observation = match cursor.next().await {
                Ok(Some(observation)) => observation,
                Ok(None) => break,
                Err(e) => {
                    log::warn!("Stopping species {}: {}", species, e);
                    outcome.error = Some(e.to_string());
                    break;
                }
            };

            let Some(photo) = self.selector.select(&observation) else {
                continue;
            };

            let task = DownloadTask {
                destination: job.directory.join(photo_file_name(
                    &species,
                    sequence.peek(),
                    &self.config.photos.extension,
                )),
                sequence_index: sequence.peek(),
                photo,
            };

            match self
                .downloader
                .fetch_and_store(&task.photo, &task.destination)
                .await
            {
                Ok(bytes) => {
                    sequence.commit();
                    outcome.photos_written += 1;
                    log::debug!(
                        "Saved photo {} for {} ({} bytes)",
                        task.sequence_index,
                        species,
                        bytes
                    );
                }
                Err(e @ AppError::Filesystem { .. }) => {
                    outcome.photos_failed += 1;
                    log::warn!("Stopping species {}: {}", species, e);
                    outcome.error = Some(e.to_string());
                    break;
                }
                Err(e) => {
                    outcome.photos_failed += 1;
                    log::warn!(
                        "Skipping photo of observation {} for {}: {}",
                        observation.id,
                        species,
                        e
                    );
                }
            }
        }

        outcome.pages_fetched = cursor.pages_fetched();
        log::info!(
            "Downloaded {} images for {}",
            outcome.photos_written,
            species
        );
        outcome
    }

    /// Run both stages and summarize the run. Never fails as a whole.
    pub async fn run(&self) -> CrawlReport {
        let start_time = Utc::now();
        let names_total = self.config.unique_names().len();

        let resolution = self.resolve_all().await;
        log::info!(
            "Crawling {} taxa ({} names failed, {} without matches)",
            resolution.jobs.len(),
            resolution.names_failed,
            resolution.names_empty
        );

        let concurrency = self.config.crawler.max_concurrent.max(1);
        let species: Vec<SpeciesOutcome> = stream::iter(resolution.jobs)
            .map(|job| self.crawl_species(job))
            .buffered(concurrency)
            .collect()
            .await;

        CrawlReport::new(
            start_time,
            names_total,
            resolution.names_failed,
            resolution.names_empty,
            species,
        )
    }
}

/// Run the photo crawler end to end.
///
/// Returns an error only for an invalid configuration; everything after that
/// is isolated and reported in the returned [`CrawlReport`].
pub async fn run_crawler(
    config: Arc<Config>,
    storage: Arc<dyn PhotoStorage>,
    client: &Client,
) -> Result<CrawlReport> {
    config.validate()?;

    log::info!(
        "Collecting up to {} photos per species from at most {} pages",
        config.budget.max_photos,
        config.budget.max_pages
    );

    let limits = RateLimits::from_config(&config.rate_limit);
    let crawler = PhotoCrawler::new(
        Arc::clone(&config),
        client.clone(),
        Arc::clone(&storage),
        limits,
    );
    let report = crawler.run().await;

    if config.output.write_report {
        match storage.write_report(&report).await {
            Ok(path) => log::info!("Report saved to {}", path.display()),
            Err(e) => log::warn!("Failed to save report: {}", e),
        }
    }

    log::info!(
        "Wrote {} photos for {} taxa ({} photos failed, {} taxa cut short)",
        report.photos_written,
        report.taxa_total,
        report.photos_failed,
        report.taxa_failed
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_counter_commits_in_order() {
        let mut counter = SequenceCounter::default();
        assert_eq!(counter.peek(), 0);
        assert_eq!(counter.peek(), 0);
        assert_eq!(counter.commit(), 0);
        assert_eq!(counter.commit(), 1);
        assert_eq!(counter.peek(), 2);
    }
}
