//! Service layer for the photo crawler.
//!
//! This module contains the business logic for:
//! - Taxon resolution (`TaxonResolver`)
//! - Observation paging (`ObservationSource`, `ObservationCursor`)
//! - Photo selection (`PhotoSelector`)
//! - Photo download (`Downloader`)

mod downloader;
mod observations;
mod photos;
mod taxa;

pub use downloader::Downloader;
pub use observations::{CursorPhase, ObservationCursor, ObservationSource};
pub use photos::PhotoSelector;
pub use taxa::TaxonResolver;
