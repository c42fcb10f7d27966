//! Configuration module for Catalog-Sync
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The classification keyword lists, scoring weights, and identity table all
//! live here so policy tuning never touches the pipeline.
//!
//! # Example
//!
//! ```no_run
//! use catalog_sync::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("catalog-sync.toml")).unwrap();
//! println!("Verifying with {} workers", config.verify.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_identities, ClassificationConfig, Config, DescriptionConfig, HttpConfig,
    IdentityConfig, OutputConfig, ScoringConfig, SourceConfig, VerifyConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, GENERATED_ID_PREFIXES, MAX_CONCURRENCY};
