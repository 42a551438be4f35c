//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Upper bound the observations endpoint accepts for `per_page`.
pub const MAX_OBSERVATIONS_PER_PAGE: u32 = 200;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client and worker settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Upstream API endpoints and query parameters
    #[serde(default)]
    pub api: ApiConfig,

    /// Page and photo budgets per taxon
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Minimum spacing between outbound calls
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Photo URL rewriting and file naming
    #[serde(default)]
    pub photos: PhotoConfig,

    /// Output tree settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Requested species or genus names
    #[serde(default = "defaults::names")]
    pub names: Vec<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load `explicit` if given, else `default_path` if it exists, else defaults.
    ///
    /// A file that exists but cannot be read or parsed is always an error;
    /// only an absent default file falls back to built-in values.
    pub fn resolve(
        explicit: Option<&Path>,
        default_path: &Path,
    ) -> Result<(Self, Option<PathBuf>)> {
        match explicit {
            Some(path) => Ok((Self::load(path)?, Some(path.to_path_buf()))),
            None if default_path.exists() => {
                Ok((Self::load(default_path)?, Some(default_path.to_path_buf())))
            }
            None => {
                log::info!(
                    "No config file at {}, using built-in defaults",
                    default_path.display()
                );
                Ok((Self::default(), None))
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::validation("api.base_url is empty"));
        }
        if self.api.taxa_per_page == 0 {
            return Err(AppError::validation("api.taxa_per_page must be > 0"));
        }
        if !(1..=MAX_OBSERVATIONS_PER_PAGE).contains(&self.api.observations_per_page) {
            return Err(AppError::validation(format!(
                "api.observations_per_page must be between 1 and {}",
                MAX_OBSERVATIONS_PER_PAGE
            )));
        }
        if self.budget.max_pages == 0 {
            return Err(AppError::validation("budget.max_pages must be > 0"));
        }
        if self.budget.max_photos == 0 {
            return Err(AppError::validation("budget.max_photos must be > 0"));
        }
        if self.photos.source_size.is_empty() || self.photos.target_size.is_empty() {
            return Err(AppError::validation("photos size tokens must not be empty"));
        }
        if self.photos.extension.trim().is_empty() {
            return Err(AppError::validation("photos.extension is empty"));
        }
        if self.names.is_empty() {
            return Err(AppError::validation("No names defined"));
        }
        if self.names.iter().any(|n| n.trim().is_empty()) {
            return Err(AppError::validation("names must not contain blank entries"));
        }
        Ok(())
    }

    /// Configured names, trimmed, with repeats removed (first occurrence wins).
    pub fn unique_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.names
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty() && seen.insert(n.clone()))
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            api: ApiConfig::default(),
            budget: BudgetConfig::default(),
            rate_limit: RateLimitConfig::default(),
            photos: PhotoConfig::default(),
            output: OutputConfig::default(),
            names: defaults::names(),
        }
    }
}

/// HTTP client and worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Number of taxa crawled in parallel
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Extra attempts for transient lookup/observation failures
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Base delay between retry attempts in milliseconds
    #[serde(default = "defaults::retry_backoff")]
    pub retry_backoff_ms: u64,
}

impl CrawlerConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            max_retries: defaults::max_retries(),
            retry_backoff_ms: defaults::retry_backoff(),
        }
    }
}

/// Upstream API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root, e.g. `https://api.inaturalist.org/v1`
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Rank filter sent with taxon searches
    #[serde(default = "defaults::taxon_rank")]
    pub taxon_rank: String,

    /// Taxa returned per searched name
    #[serde(default = "defaults::taxa_per_page")]
    pub taxa_per_page: u32,

    /// Observations requested per page (at most 200)
    #[serde(default = "defaults::observations_per_page")]
    pub observations_per_page: u32,

    #[serde(default = "defaults::order_by")]
    pub order_by: String,

    #[serde(default = "defaults::order")]
    pub order: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            taxon_rank: defaults::taxon_rank(),
            taxa_per_page: defaults::taxa_per_page(),
            observations_per_page: defaults::observations_per_page(),
            order_by: defaults::order_by(),
            order: defaults::order(),
        }
    }
}

/// Per-taxon crawl budgets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Maximum observation pages fetched per taxon
    #[serde(default = "defaults::max_pages")]
    pub max_pages: u32,

    /// Maximum photos accepted per species
    #[serde(default = "defaults::max_photos")]
    pub max_photos: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_pages: defaults::max_pages(),
            max_photos: defaults::max_photos(),
        }
    }
}

/// Minimum intervals between calls, per call-site category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "defaults::search_interval")]
    pub search_interval_ms: u64,

    #[serde(default = "defaults::observation_interval")]
    pub observation_interval_ms: u64,

    /// Photo downloads; 0 leaves them ungated
    #[serde(default)]
    pub download_interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            search_interval_ms: defaults::search_interval(),
            observation_interval_ms: defaults::observation_interval(),
            download_interval_ms: 0,
        }
    }
}

/// Photo URL rewriting and file naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoConfig {
    /// Size token present in URLs returned by the API
    #[serde(default = "defaults::source_size")]
    pub source_size: String,

    /// Size token substituted before downloading
    #[serde(default = "defaults::target_size")]
    pub target_size: String,

    /// Extension of written files
    #[serde(default = "defaults::extension")]
    pub extension: String,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            source_size: defaults::source_size(),
            target_size: defaults::target_size(),
            extension: defaults::extension(),
        }
    }
}

/// Output tree settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root of the `<name>/<species>/<file>` tree
    #[serde(default = "defaults::root_dir")]
    pub root_dir: PathBuf,

    /// Store `crawl_report.json` under the root after each run
    #[serde(default = "defaults::write_report")]
    pub write_report: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root_dir: defaults::root_dir(),
            write_report: defaults::write_report(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; photo-crawler/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn max_retries() -> u32 {
        2
    }
    pub fn retry_backoff() -> u64 {
        500
    }

    // API defaults
    pub fn base_url() -> String {
        "https://api.inaturalist.org/v1".into()
    }
    pub fn taxon_rank() -> String {
        "species".into()
    }
    pub fn taxa_per_page() -> u32 {
        5
    }
    pub fn observations_per_page() -> u32 {
        200
    }
    pub fn order_by() -> String {
        "votes".into()
    }
    pub fn order() -> String {
        "desc".into()
    }

    // Budget defaults
    pub fn max_pages() -> u32 {
        5
    }
    pub fn max_photos() -> usize {
        1000
    }

    // Rate limit defaults
    pub fn search_interval() -> u64 {
        1000
    }
    pub fn observation_interval() -> u64 {
        1000
    }

    // Photo defaults
    pub fn source_size() -> String {
        "square".into()
    }
    pub fn target_size() -> String {
        "large".into()
    }
    pub fn extension() -> String {
        "jpg".into()
    }

    // Output defaults
    pub fn root_dir() -> PathBuf {
        PathBuf::from("freshwater_species_images")
    }
    pub fn write_report() -> bool {
        true
    }

    pub fn names() -> Vec<String> {
        [
            "Micropterus salmoides",
            "Micropterus dolomieu",
            "Salvelinus fontinalis",
            "Oncorhynchus mykiss",
            "Morone saxatilis",
            "Salmo trutta",
            "Esox lucius",
            "Esox niger",
            "Pomoxis",
            "Lepomis",
            "Lepomis macrochirus",
            "Salvelinus namaycush",
            "Acipenser",
            "Esox masquinongy",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.names.len(), 14);
        assert_eq!(config.api.observations_per_page, 200);
        assert_eq!(config.rate_limit.search_interval_ms, 1000);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            names = ["Esox lucius"]

            [budget]
            max_photos = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.names, vec!["Esox lucius".to_string()]);
        assert_eq!(config.budget.max_photos, 10);
        assert_eq!(config.budget.max_pages, 5);
        assert_eq!(config.photos.target_size, "large");
    }

    #[test]
    fn test_validate_rejects_oversized_page() {
        let mut config = Config::default();
        config.api.observations_per_page = 201;
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let mut config = Config::default();
        config.names.push("   ".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unique_names_drops_repeats() {
        let config = Config {
            names: vec![
                "Esox lucius".into(),
                " Esox lucius ".into(),
                "Lepomis".into(),
            ],
            ..Config::default()
        };
        assert_eq!(config.unique_names(), vec!["Esox lucius", "Lepomis"]);
    }

    #[test]
    fn test_bundled_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/config.toml");
        let config = Config::load(&path).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.unique_names().len(), 14);
    }

    #[test]
    fn test_truncated_file_is_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "names = [\"Esox lucius\",\n[budget\n").unwrap();

        assert!(matches!(Config::load(&path), Err(AppError::Toml(_))));
        assert!(matches!(
            Config::resolve(Some(&path), Path::new("unused.toml")),
            Err(AppError::Toml(_))
        ));
        assert!(matches!(Config::resolve(None, &path), Err(AppError::Toml(_))));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let missing = Path::new("/nonexistent/config.toml");
        assert!(matches!(Config::load(missing), Err(AppError::Io(_))));
        assert!(matches!(
            Config::resolve(Some(missing), Path::new("data/config.toml")),
            Err(AppError::Io(_))
        ));
    }

    #[test]
    fn test_absent_default_file_falls_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let (config, source) = Config::resolve(None, &dir.path().join("config.toml")).unwrap();
        assert!(source.is_none());
        assert_eq!(config.budget.max_photos, 1000);
    }

    #[test]
    fn test_existing_default_file_is_loaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "names = [\"Lepomis\"]\n").unwrap();

        let (config, source) = Config::resolve(None, &path).unwrap();
        assert_eq!(source.as_deref(), Some(path.as_path()));
        assert_eq!(config.names, vec!["Lepomis".to_string()]);
    }
}
