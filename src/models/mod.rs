// src/models/mod.rs

//! Domain models for the photo crawler.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod observation;
mod report;
mod taxon;

// Re-export all public types
pub use config::{
    ApiConfig, BudgetConfig, Config, CrawlerConfig, MAX_OBSERVATIONS_PER_PAGE, OutputConfig,
    PhotoConfig, RateLimitConfig,
};
pub use observation::{DownloadTask, ObservationRecord, ObservationsResponse, PhotoRef};
pub use report::{CrawlReport, SpeciesOutcome};
pub use taxon::{TaxaResponse, TaxonRecord};
