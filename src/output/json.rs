//! JSON catalog writers
//!
//! The file writer serializes into a temporary sibling file and renames it
//! over the target, so readers only ever see a complete document and a failed
//! run leaves the previous document untouched.

use crate::catalog::CatalogDocument;
use crate::output::traits::{CatalogWriter, OutputResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Serializes a document to JSON text with a trailing newline
pub fn to_json(document: &CatalogDocument, pretty: bool) -> OutputResult<String> {
    let mut json = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    json.push('\n');
    Ok(json)
}

/// Writes the catalog to a JSON file, replacing it atomically
#[derive(Debug, Clone)]
pub struct JsonFileWriter {
    path: PathBuf,
    pretty: bool,
}

impl JsonFileWriter {
    pub fn new(path: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            path: path.into(),
            pretty,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temporary file next to the target (same filesystem, so rename is atomic)
    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "catalog.json".to_string());
        self.path.with_file_name(format!(".{}.tmp", file_name))
    }
}

impl CatalogWriter for JsonFileWriter {
    fn write(&self, document: &CatalogDocument) -> OutputResult<()> {
        let json = to_json(document, self.pretty)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        let result = fs::write(&temp_path, json.as_bytes())
            .and_then(|_| fs::rename(&temp_path, &self.path));

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result?;

        tracing::info!("Wrote {}", self.path.display());
        Ok(())
    }
}

/// Prints the catalog to standard output
#[derive(Debug, Clone, Default)]
pub struct StdoutWriter {
    pretty: bool,
}

impl StdoutWriter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl CatalogWriter for StdoutWriter {
    fn write(&self, document: &CatalogDocument) -> OutputResult<()> {
        let json = to_json(document, self.pretty)?;
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(json.as_bytes())?;
        handle.flush()?;
        Ok(())
    }
}
