// src/error.rs

//! Unified error handling for the photo crawler.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Taxon search returned a non-success response or an unreadable body
    #[error("Taxonomy lookup failed for '{name}': {message}")]
    TaxonomyLookup { name: String, message: String },

    /// Observation page could not be fetched
    #[error("Observation fetch failed for taxon {taxon_id} (page {page}): {message}")]
    ObservationFetch {
        taxon_id: u64,
        page: u32,
        message: String,
    },

    /// Photo could not be fetched or stored
    #[error("Download failed for {url}: {message}")]
    Download { url: String, message: String },

    /// Directory or file could not be created/written
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Upstream response did not carry a required field
    #[error("Missing field '{field}' in {context}")]
    MissingField { context: String, field: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a taxonomy lookup error.
    pub fn taxonomy(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::TaxonomyLookup {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Create an observation fetch error.
    pub fn observations(taxon_id: u64, page: u32, message: impl fmt::Display) -> Self {
        Self::ObservationFetch {
            taxon_id,
            page,
            message: message.to_string(),
        }
    }

    /// Create a download error.
    pub fn download(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Download {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a filesystem error bound to a path.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Create a schema violation error.
    pub fn missing_field(context: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            context: context.into(),
            field: field.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
