//! Local filesystem storage implementation.
//!
//! Every file is written to a hidden `.part` sibling first and renamed into
//! place, so a reader never observes a partial photo under its final name.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::CrawlReport;
use crate::storage::PhotoStorage;
use crate::utils::sanitize_component;

const REPORT_FILE: &str = "crawl_report.json";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Temporary sibling used while `path` is being written.
    fn part_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{name}.part"))
    }

    async fn write_part(tmp: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::File::create(tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_atomic(path, &bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl PhotoStorage for LocalStorage {
    fn species_dir(&self, query: &str, species: &str) -> PathBuf {
        self.root_dir
            .join(sanitize_component(query))
            .join(sanitize_component(species))
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        // create_dir_all tolerates the directory appearing concurrently
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| AppError::filesystem(path, e))
    }

    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<u64> {
        let tmp = Self::part_path(path);

        if let Err(e) = Self::write_part(&tmp, bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(AppError::filesystem(&tmp, e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(AppError::filesystem(path, e));
        }
        Ok(bytes.len() as u64)
    }

    async fn write_report(&self, report: &CrawlReport) -> Result<PathBuf> {
        self.ensure_dir(&self.root_dir).await?;
        let path = self.root_dir.join(REPORT_FILE);
        self.write_json(&path, report).await?;
        Ok(path)
    }
}
