//! Pipeline entry points for crawler operations.
//!
//! - `run_crawler`: Resolve names, page observations and download photos
//! - `run_resolve`: Resolve names only (dry run)

pub mod crawl;
pub mod resolve;

pub use crawl::{PhotoCrawler, Resolution, SequenceCounter, SpeciesJob, run_crawler};
pub use resolve::run_resolve;
