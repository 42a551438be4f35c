// src/services/observations.rs

//! Observation paging service.
//!
//! An [`ObservationCursor`] walks the vote-ranked observations of one taxon
//! page by page. It stops at the first of:
//!
//! - a page shorter than the requested page size,
//! - the page budget (`budget.max_pages`),
//! - the photo budget (`budget.max_photos` observations yielded).
//!
//! The result is therefore *up to* `max_photos` observations drawn from the
//! best-voted pages, not an exhaustive listing of the taxon.

use std::collections::VecDeque;
use std::sync::Arc;

use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{
    BudgetConfig, Config, MAX_OBSERVATIONS_PER_PAGE, ObservationRecord, ObservationsResponse,
};
use crate::utils::http::{RetryPolicy, get_with_retry};
use crate::utils::rate_limit::RateLimiter;
use crate::utils::url::endpoint;

/// Fetches single observation pages; shared by all cursors of a run.
pub struct ObservationSource {
    client: Client,
    base_url: String,
    per_page: u32,
    order_by: String,
    order: String,
    size_variant: String,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl ObservationSource {
    pub fn new(config: &Config, client: Client, limiter: Arc<RateLimiter>) -> Self {
        Self {
            client,
            base_url: config.api.base_url.clone(),
            per_page: config
                .api
                .observations_per_page
                .clamp(1, MAX_OBSERVATIONS_PER_PAGE),
            order_by: config.api.order_by.clone(),
            order: config.api.order.clone(),
            size_variant: config.photos.source_size.clone(),
            limiter,
            retry: RetryPolicy::new(config.crawler.max_retries, config.crawler.retry_backoff()),
        }
    }

    /// Open a cursor over the observations of `taxon_id`.
    pub fn cursor(&self, taxon_id: u64, budget: BudgetConfig) -> ObservationCursor<'_> {
        ObservationCursor {
            source: self,
            taxon_id,
            budget,
            pages_fetched: 0,
            yielded: 0,
            state: CursorState::Init,
        }
    }

    /// Fetch one page (1-based) after waiting on the rate limiter.
    pub async fn fetch_page(&self, taxon_id: u64, page: u32) -> Result<Vec<ObservationRecord>> {
        let taxon = taxon_id.to_string();
        let per_page = self.per_page.to_string();
        let page_no = page.to_string();
        let url = endpoint(
            &self.base_url,
            "observations",
            &[
                ("taxon_id", taxon.as_str()),
                ("per_page", per_page.as_str()),
                ("order_by", self.order_by.as_str()),
                ("order", self.order.as_str()),
                ("page", page_no.as_str()),
            ],
        )?;

        let response = get_with_retry(&self.client, &url, &self.limiter, self.retry)
            .await
            .map_err(|e| AppError::observations(taxon_id, page, e))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::observations(taxon_id, page, e))?;
        let parsed: ObservationsResponse = serde_json::from_slice(&body)
            .map_err(|e| AppError::observations(taxon_id, page, e))?;

        parsed.into_records(taxon_id, &self.size_variant)
    }
}

/// Lifecycle of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPhase {
    Init,
    Fetching,
    HasPage,
    Exhausted,
}

enum CursorState {
    Init,
    Fetching,
    HasPage {
        buffer: VecDeque<ObservationRecord>,
        last_page: bool,
    },
    Exhausted,
}

enum Step {
    Yield(ObservationRecord),
    Skip(u64),
    Fetch,
    Finish,
}

/// Single-pass, lazily paged sequence of observations for one taxon.
pub struct ObservationCursor<'a> {
    source: &'a ObservationSource,
    taxon_id: u64,
    budget: BudgetConfig,
    pages_fetched: u32,
    yielded: usize,
    state: CursorState,
}

impl ObservationCursor<'_> {
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    pub fn phase(&self) -> CursorPhase {
        match self.state {
            CursorState::Init => CursorPhase::Init,
            CursorState::Fetching => CursorPhase::Fetching,
            CursorState::HasPage { .. } => CursorPhase::HasPage,
            CursorState::Exhausted => CursorPhase::Exhausted,
        }
    }

    /// Next photo-bearing observation, or `None` once exhausted.
    ///
    /// Observations without photos are skipped and do not count toward the
    /// photo budget. A fetch error exhausts the cursor; later calls return
    /// `Ok(None)`.
    pub async fn next(&mut self) -> Result<Option<ObservationRecord>> {
        loop {
            if self.yielded >= self.budget.max_photos {
                self.state = CursorState::Exhausted;
            }

            let step = match &mut self.state {
                CursorState::Exhausted => Step::Finish,
                CursorState::Init | CursorState::Fetching => Step::Fetch,
                CursorState::HasPage { buffer, last_page } => match buffer.pop_front() {
                    Some(obs) if obs.photos.is_empty() => Step::Skip(obs.id),
                    Some(obs) => Step::Yield(obs),
                    None if *last_page => Step::Finish,
                    None => Step::Fetch,
                },
            };

            match step {
                Step::Yield(obs) => {
                    self.yielded += 1;
                    return Ok(Some(obs));
                }
                Step::Skip(id) => {
                    log::debug!("Observation {} has no photos, skipping", id);
                }
                Step::Fetch => self.fetch_next_page().await?,
                Step::Finish => {
                    self.state = CursorState::Exhausted;
                    return Ok(None);
                }
            }
        }
    }

    async fn fetch_next_page(&mut self) -> Result<()> {
        if self.pages_fetched >= self.budget.max_pages {
            self.state = CursorState::Exhausted;
            return Ok(());
        }

        let page = self.pages_fetched + 1;
        self.state = CursorState::Fetching;

        match self.source.fetch_page(self.taxon_id, page).await {
            Ok(records) => {
                self.pages_fetched = page;
                let short = records.len() < self.source.per_page as usize;
                log::debug!(
                    "Taxon {}: page {} returned {} observations",
                    self.taxon_id,
                    page,
                    records.len()
                );
                self.state = CursorState::HasPage {
                    buffer: records.into(),
                    last_page: short || page >= self.budget.max_pages,
                };
                Ok(())
            }
            Err(e) => {
                self.state = CursorState::Exhausted;
                Err(e)
            }
        }
    }
}
