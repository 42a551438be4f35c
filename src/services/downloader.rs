// src/services/downloader.rs

//! Photo download service.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::PhotoRef;
use crate::storage::PhotoStorage;
use crate::utils::http::{RetryPolicy, get_with_retry};
use crate::utils::rate_limit::RateLimiter;

/// Fetches photo bytes and hands them to storage for an atomic write.
pub struct Downloader {
    client: Client,
    storage: Arc<dyn PhotoStorage>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl Downloader {
    /// Transient download failures are retried exactly once.
    pub fn new(
        client: Client,
        storage: Arc<dyn PhotoStorage>,
        limiter: Arc<RateLimiter>,
        backoff: Duration,
    ) -> Self {
        Self {
            client,
            storage,
            limiter,
            retry: RetryPolicy::new(1, backoff),
        }
    }

    /// Download `photo` and store it at `destination`.
    ///
    /// Nothing is written unless the response is a success. Returns the
    /// number of bytes written. HTTP failures are [`AppError::Download`] and
    /// cost only this photo. A file that cannot be written is a
    /// [`AppError::Filesystem`] error, which aborts the whole species since
    /// every later write into the same directory would fail the same way.
    pub async fn fetch_and_store(&self, photo: &PhotoRef, destination: &Path) -> Result<u64> {
        let url = Url::parse(&photo.url_template)
            .map_err(|e| AppError::download(&photo.url_template, e))?;

        let response = get_with_retry(&self.client, &url, &self.limiter, self.retry)
            .await
            .map_err(|e| AppError::download(url.as_str(), e))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::download(url.as_str(), e))?;

        self.storage.write_atomic(destination, &bytes).await
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::storage::LocalStorage;

    fn downloader(root: &Path) -> Downloader {
        Downloader::new(
            Client::new(),
            Arc::new(LocalStorage::new(root)),
            Arc::new(RateLimiter::unlimited()),
            Duration::ZERO,
        )
    }

    fn photo(server: &MockServer, p: &str) -> PhotoRef {
        PhotoRef {
            url_template: format!("{}{}", server.uri(), p),
            size_variant: "large".into(),
        }
    }

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_successful_download_writes_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/1/large.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("Esox_lucius_0.jpg");
        let written = downloader(tmp.path())
            .fetch_and_store(&photo(&server, "/photos/1/large.jpg"), &dest)
            .await
            .unwrap();

        assert_eq!(written, 3);
        assert_eq!(std::fs::read(&dest).unwrap(), vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(entries(tmp.path()), 1);
    }

    #[tokio::test]
    async fn test_not_found_leaves_no_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("Esox_lucius_0.jpg");
        let err = downloader(tmp.path())
            .fetch_and_store(&photo(&server, "/photos/1/large.jpg"), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Download { .. }));
        assert!(!dest.exists());
        assert_eq!(entries(tmp.path()), 0);
    }

    #[tokio::test]
    async fn test_transient_failure_retried_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .expect(2)
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("x_0.jpg");
        let result = downloader(tmp.path())
            .fetch_and_store(&photo(&server, "/photos/1/large.jpg"), &dest)
            .await;

        assert!(result.is_err());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_invalid_url_is_download_error() {
        let tmp = TempDir::new().unwrap();
        let bad = PhotoRef {
            url_template: "not a url".into(),
            size_variant: "large".into(),
        };
        let err = downloader(tmp.path())
            .fetch_and_store(&bad, &tmp.path().join("x_0.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Download { .. }));
    }
}
