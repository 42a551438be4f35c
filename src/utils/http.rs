// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use url::Url;

use crate::error::Result;
use crate::models::CrawlerConfig;
use crate::utils::rate_limit::RateLimiter;

/// Why a single GET did not produce a success response.
#[derive(Error, Debug)]
pub enum HttpFailure {
    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl HttpFailure {
    /// Server errors, throttling, timeouts and connection failures are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
        }
    }
}

/// How many times a transient failure is retried, and how long to back off.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CrawlerConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// GET `url`, waiting on `limiter` before every attempt.
///
/// Only success responses are returned. Transient failures are retried up to
/// `policy.max_retries` times with linear backoff.
pub async fn get_with_retry(
    client: &Client,
    url: &Url,
    limiter: &RateLimiter,
    policy: RetryPolicy,
) -> std::result::Result<Response, HttpFailure> {
    let mut attempt = 0;
    loop {
        limiter.acquire().await;

        let result = match client.get(url.clone()).send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => HttpFailure::Status(response.status()),
            Err(e) => HttpFailure::Transport(e),
        };

        if attempt >= policy.max_retries || !result.is_transient() {
            return Err(result);
        }

        attempt += 1;
        log::debug!(
            "Retrying {} after {} (attempt {}/{})",
            url,
            result,
            attempt,
            policy.max_retries
        );
        if !policy.backoff.is_zero() {
            tokio::time::sleep(policy.backoff * attempt).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn endpoint(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
    }

    #[test]
    fn test_transient_classification() {
        assert!(HttpFailure::Status(StatusCode::BAD_GATEWAY).is_transient());
        assert!(HttpFailure::Status(StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(!HttpFailure::Status(StatusCode::NOT_FOUND).is_transient());
        assert!(!HttpFailure::Status(StatusCode::FORBIDDEN).is_transient());
    }

    #[tokio::test]
    async fn test_retries_server_errors_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = Client::new();
        let response = get_with_retry(
            &client,
            &endpoint(&server, "/flaky"),
            &RateLimiter::unlimited(),
            RetryPolicy::new(2, Duration::ZERO),
        )
        .await
        .unwrap();

        assert_eq!(response.text().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new();
        let err = get_with_retry(
            &client,
            &endpoint(&server, "/missing"),
            &RateLimiter::unlimited(),
            RetryPolicy::new(3, Duration::ZERO),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, HttpFailure::Status(StatusCode::NOT_FOUND)));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let client = Client::new();
        let err = get_with_retry(
            &client,
            &endpoint(&server, "/down"),
            &RateLimiter::unlimited(),
            RetryPolicy::new(2, Duration::ZERO),
        )
        .await
        .unwrap_err();

        assert!(err.is_transient());
    }
}
