// src/utils/rate_limit.rs

//! Fixed-interval gate for outbound calls.
//!
//! One instance is shared by every worker that talks to the same endpoint
//! category, so the aggregate call rate stays at one call per interval no
//! matter how many taxa are in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::models::RateLimitConfig;

#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter allowing one call per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Wait until the next call slot, then reserve the one after it.
    ///
    /// The lock is held across the sleep so concurrent callers queue up
    /// behind each other instead of waking together.
    pub async fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }

        let mut next_slot = self.next_slot.lock().await;
        if let Some(at) = *next_slot {
            if at > Instant::now() {
                tokio::time::sleep_until(at).await;
            }
        }
        *next_slot = Some(Instant::now() + self.interval);
    }
}

/// Shared limiters, one per call-site category.
#[derive(Debug, Clone)]
pub struct RateLimits {
    pub search: Arc<RateLimiter>,
    pub observations: Arc<RateLimiter>,
    pub downloads: Arc<RateLimiter>,
}

impl RateLimits {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        let gate = |ms: u64| Arc::new(RateLimiter::new(Duration::from_millis(ms)));
        Self {
            search: gate(config.search_interval_ms),
            observations: gate(config.observation_interval_ms),
            downloads: gate(config.download_interval_ms),
        }
    }

    pub fn unlimited() -> Self {
        Self::from_config(&RateLimitConfig {
            search_interval_ms: 0,
            observation_interval_ms: 0,
            download_interval_ms: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_calls_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_the_rate() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_secs(1)));
        let start = Instant::now();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_unlimited_never_waits() {
        let limiter = RateLimiter::unlimited();
        let start = std::time::Instant::now();
        for _ in 0..100 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
