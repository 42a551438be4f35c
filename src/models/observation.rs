// src/models/observation.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{AppError, Result};

/// An observation with its photos, ordered as the API returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    pub id: u64,
    pub taxon_id: u64,
    pub vote_score: i64,
    pub photos: Vec<PhotoRef>,
}

/// Reference to a single photo variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    pub url_template: String,
    pub size_variant: String,
}

/// One accepted photo, bound to its destination.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub photo: PhotoRef,
    pub destination: PathBuf,
    pub sequence_index: usize,
}

/// Raw body of the observations endpoint.
#[derive(Debug, Deserialize)]
pub struct ObservationsResponse {
    pub results: Option<Vec<RawObservation>>,
}

#[derive(Debug, Deserialize)]
pub struct RawObservation {
    pub id: Option<u64>,
    pub taxon: Option<RawTaxonRef>,
    pub cached_votes_total: Option<i64>,
    pub photos: Option<Vec<RawPhoto>>,
}

#[derive(Debug, Deserialize)]
pub struct RawTaxonRef {
    pub id: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RawPhoto {
    pub url: Option<String>,
}

impl ObservationsResponse {
    /// Validate a page into typed records.
    ///
    /// `taxon_id` fills in observations that do not embed their taxon.
    /// Photo entries without a URL are dropped; the rest keep their order.
    pub fn into_records(self, taxon_id: u64, size_variant: &str) -> Result<Vec<ObservationRecord>> {
        let results = self
            .results
            .ok_or_else(|| AppError::missing_field("observations response", "results"))?;

        results
            .into_iter()
            .map(|raw| {
                let id = raw
                    .id
                    .ok_or_else(|| AppError::missing_field("observation", "id"))?;
                let photos = raw
                    .photos
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|p| p.url)
                    .map(|url| PhotoRef {
                        url_template: url,
                        size_variant: size_variant.to_string(),
                    })
                    .collect();

                Ok(ObservationRecord {
                    id,
                    taxon_id: raw.taxon.and_then(|t| t.id).unwrap_or(taxon_id),
                    vote_score: raw.cached_votes_total.unwrap_or(0),
                    photos,
                })
            })
            .collect()
    }
}
