//! Output module for publishing the catalog document
//!
//! This module handles:
//! - The writer interface the pipeline hands its document to
//! - Atomic JSON file output
//! - Stdout and in-memory writers for dry runs and embedding

mod json;
mod traits;

pub use json::{to_json, JsonFileWriter, StdoutWriter};
pub use traits::{CatalogWriter, MemoryWriter, OutputError, OutputResult};
