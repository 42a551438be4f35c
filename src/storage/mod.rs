//! Storage abstractions for the photo tree.
//!
//! ## Directory Structure
//!
//! ```text
//! {root}/
//! ├── crawl_report.json            # Summary of the last run
//! └── {name}/                      # Requested name, e.g. "Esox lucius"
//!     └── {species}/               # Resolved taxon name
//!         ├── Esox_lucius_0.jpg
//!         └── Esox_lucius_1.jpg
//! ```

pub mod local;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::CrawlReport;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for photo storage backends.
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Directory that holds the photos of `species` found for `query`.
    fn species_dir(&self, query: &str, species: &str) -> PathBuf;

    /// Create `path` and its parents. Succeeds when it already exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()>;

    /// Write `bytes` to `path` so the file only appears once complete.
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<u64>;

    /// Persist the run summary.
    async fn write_report(&self, report: &CrawlReport) -> Result<PathBuf>;
}
