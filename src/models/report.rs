// src/models/report.rs

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of crawling one species directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesOutcome {
    pub query: String,
    pub taxon_id: u64,
    pub species: String,
    pub directory: PathBuf,
    pub photos_written: usize,
    pub photos_failed: usize,
    pub pages_fetched: u32,
    /// Set when the species was cut short by a fetch or filesystem error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a full run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub names_total: usize,
    pub names_failed: usize,
    pub names_empty: usize,
    pub taxa_total: usize,
    pub taxa_failed: usize,
    pub photos_written: usize,
    pub photos_failed: usize,
    pub species: Vec<SpeciesOutcome>,
}

impl CrawlReport {
    /// Build the run summary from per-species outcomes.
    pub fn new(
        start_time: DateTime<Utc>,
        names_total: usize,
        names_failed: usize,
        names_empty: usize,
        species: Vec<SpeciesOutcome>,
    ) -> Self {
        Self {
            start_time,
            end_time: Utc::now(),
            names_total,
            names_failed,
            names_empty,
            taxa_total: species.len(),
            taxa_failed: species.iter().filter(|s| s.error.is_some()).count(),
            photos_written: species.iter().map(|s| s.photos_written).sum(),
            photos_failed: species.iter().map(|s| s.photos_failed).sum(),
            species,
        }
    }
}
