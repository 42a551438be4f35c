// src/services/taxa.rs

//! Taxon resolution service.
//!
//! Turns a free-text species or genus name into taxon records via the
//! search endpoint.

use std::sync::Arc;

use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{Config, TaxaResponse, TaxonRecord};
use crate::utils::http::{RetryPolicy, get_with_retry};
use crate::utils::rate_limit::RateLimiter;
use crate::utils::url::endpoint;

/// Service for resolving names against the taxa search endpoint.
pub struct TaxonResolver {
    client: Client,
    base_url: String,
    rank: String,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl TaxonResolver {
    pub fn new(config: &Config, client: Client, limiter: Arc<RateLimiter>) -> Self {
        Self {
            client,
            base_url: config.api.base_url.clone(),
            rank: config.api.taxon_rank.clone(),
            limiter,
            retry: RetryPolicy::new(config.crawler.max_retries, config.crawler.retry_backoff()),
        }
    }

    /// Resolve `name` into at most `page_size` taxa, in upstream order.
    ///
    /// Zero matches is an empty list, not an error.
    pub async fn resolve(&self, name: &str, page_size: u32) -> Result<Vec<TaxonRecord>> {
        let per_page = page_size.to_string();
        let url = endpoint(
            &self.base_url,
            "taxa",
            &[("q", name), ("rank", self.rank.as_str()), ("per_page", per_page.as_str())],
        )?;

        let response = get_with_retry(&self.client, &url, &self.limiter, self.retry)
            .await
            .map_err(|e| AppError::taxonomy(name, e))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::taxonomy(name, e))?;
        let parsed: TaxaResponse =
            serde_json::from_slice(&body).map_err(|e| AppError::taxonomy(name, e))?;

        let mut records = parsed.into_records()?;
        records.truncate(page_size as usize);

        log::debug!("Resolved '{}' to {} taxa", name, records.len());
        Ok(records)
    }
}
