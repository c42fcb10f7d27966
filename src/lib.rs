//! Catalog-Sync: keeps a small tools/certificates catalog in step with a web page
//!
//! This crate fetches a single source page, discovers and classifies its links,
//! picks the best link for every known tool, verifies that the chosen links are
//! alive, and assembles a deduplicated catalog document.

pub mod catalog;
pub mod config;
pub mod output;
pub mod sync;

use thiserror::Error;

/// Main error type for Catalog-Sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch source page: {0}")]
    Fetch(#[from] FetchError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Catalog invariant violated: {0}")]
    InvariantViolation(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Errors raised while retrieving the source page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("request timeout for {url}")]
    Timeout { url: String },

    #[error("failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Catalog-Sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{CatalogDocument, CatalogEntry, Classifier, LinkCategory};
pub use config::Config;
pub use sync::{run_sync, Pipeline};
