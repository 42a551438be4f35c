// src/models/taxon.rs

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A taxon returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonRecord {
    pub id: u64,
    pub scientific_name: String,
    pub rank: String,
}

/// Raw body of the taxa search endpoint.
#[derive(Debug, Deserialize)]
pub struct TaxaResponse {
    pub results: Option<Vec<RawTaxon>>,
}

/// One raw entry of `results`; every field is checked before use.
#[derive(Debug, Deserialize)]
pub struct RawTaxon {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub rank: Option<String>,
}

impl TaxaResponse {
    /// Validate the payload into typed records, keeping upstream order.
    pub fn into_records(self) -> Result<Vec<TaxonRecord>> {
        let results = self
            .results
            .ok_or_else(|| AppError::missing_field("taxa response", "results"))?;
        results.into_iter().map(TaxonRecord::try_from).collect()
    }
}

impl TryFrom<RawTaxon> for TaxonRecord {
    type Error = AppError;

    fn try_from(raw: RawTaxon) -> Result<Self> {
        let id = raw
            .id
            .ok_or_else(|| AppError::missing_field("taxon", "id"))?;
        let scientific_name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::missing_field(format!("taxon {id}"), "name"))?;

        Ok(Self {
            id,
            scientific_name,
            rank: raw.rank.unwrap_or_default(),
        })
    }
}
