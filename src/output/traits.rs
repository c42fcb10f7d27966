//! Output writer trait and error types
//!
//! Persisting the catalog is a boundary to whatever serves the document to
//! the presentation layer; this module only defines the interface.

use crate::catalog::CatalogDocument;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for catalog writers
///
/// A writer receives the complete document of a run. Each write fully
/// replaces whatever the previous run published; there is no merging.
pub trait CatalogWriter {
    /// Persists the document
    fn write(&self, document: &CatalogDocument) -> OutputResult<()>;
}

/// Writer that keeps the last document in memory
///
/// Useful for embedding the pipeline without touching the filesystem.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    last: std::sync::Mutex<Option<CatalogDocument>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the most recently written document
    pub fn last(&self) -> Option<CatalogDocument> {
        self.last
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl CatalogWriter for MemoryWriter {
    fn write(&self, document: &CatalogDocument) -> OutputResult<()> {
        let mut last = self
            .last
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = Some(document.clone());
        Ok(())
    }
}
