//! Deduplication and catalog assembly
//!
//! Selected tools and certificate/profile links are walked together in
//! discovery order. The first entry for a URL wins; later entries with the
//! same URL are dropped regardless of their category.

use crate::catalog::model::{CatalogDocument, CatalogEntry, ClassifiedLink, LinkCategory};
use crate::catalog::select::SelectedTool;
use crate::config::DescriptionConfig;
use crate::SyncError;
use std::collections::{HashMap, HashSet};

/// A selected tool together with its verified reachability
#[derive(Debug, Clone)]
pub struct VerifiedTool {
    pub tool: SelectedTool,
    pub reachable: bool,
}

/// An item waiting to be placed in the catalog
enum Pending {
    Tool(VerifiedTool),
    Certificate(ClassifiedLink),
}

impl Pending {
    fn position(&self) -> usize {
        match self {
            Self::Tool(verified) => verified.tool.link.position(),
            Self::Certificate(link) => link.position(),
        }
    }

    fn url(&self) -> &str {
        match self {
            Self::Tool(verified) => verified.tool.link.url().as_str(),
            Self::Certificate(link) => link.url().as_str(),
        }
    }
}

/// Builds the catalog document from pipeline output
#[derive(Debug, Clone)]
pub struct Assembler {
    descriptions: DescriptionConfig,
    host: String,
}

impl Assembler {
    /// Creates an assembler; `host` fills the `{host}` description placeholder
    pub fn new(descriptions: DescriptionConfig, host: impl Into<String>) -> Self {
        Self {
            descriptions,
            host: host.into(),
        }
    }

    /// Deduplicates, assigns ids, and produces the catalog document
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvariantViolation` if two entries of a section end
    /// up with the same id. This indicates a defect in id assignment and the
    /// document is not produced.
    pub fn assemble(
        &self,
        tools: Vec<VerifiedTool>,
        certificates: Vec<ClassifiedLink>,
    ) -> Result<CatalogDocument, SyncError> {
        let mut pending: Vec<Pending> = tools
            .into_iter()
            .map(Pending::Tool)
            .chain(
                certificates
                    .into_iter()
                    .filter(|link| !link.category.is_tool())
                    .map(Pending::Certificate),
            )
            .collect();
        pending.sort_by_key(Pending::position);

        let mut document = CatalogDocument::default();
        let mut emitted_urls: HashSet<String> = HashSet::new();
        let mut tool_ids: HashSet<String> = HashSet::new();
        let mut certificate_ids: HashSet<String> = HashSet::new();
        let mut counters: HashMap<&'static str, usize> = HashMap::new();

        for item in pending {
            if !emitted_urls.insert(item.url().to_string()) {
                tracing::debug!("Dropping duplicate catalog url {}", item.url());
                continue;
            }

            match item {
                Pending::Tool(verified) => {
                    let entry = self.tool_entry(verified, &mut counters);
                    insert_unique(&mut tool_ids, &entry.id, "tools")?;
                    document.tools.push(entry);
                }
                Pending::Certificate(link) => {
                    let entry = self.certificate_entry(link, &mut counters);
                    insert_unique(&mut certificate_ids, &entry.id, "certificates")?;
                    document.certificates.push(entry);
                }
            }
        }

        Ok(document)
    }

    fn tool_entry(
        &self,
        verified: VerifiedTool,
        counters: &mut HashMap<&'static str, usize>,
    ) -> CatalogEntry {
        let link = verified.tool.link;
        let (id, name) = match verified.tool.identity {
            Some(identity) => (identity.id, identity.name),
            None => (
                next_id(counters, LinkCategory::Application),
                link.text().to_string(),
            ),
        };

        CatalogEntry {
            id,
            name,
            status: Some(verified.reachable),
            description: self.describe(&self.descriptions.tool, link.text()),
            url: link.link.url.to_string(),
        }
    }

    fn certificate_entry(
        &self,
        link: ClassifiedLink,
        counters: &mut HashMap<&'static str, usize>,
    ) -> CatalogEntry {
        CatalogEntry {
            id: next_id(counters, link.category),
            name: link.category.label().to_string(),
            status: None,
            description: self.describe(&self.descriptions.certificate, link.text()),
            url: link.link.url.to_string(),
        }
    }

    fn describe(&self, template: &str, text: &str) -> String {
        template.replace("{host}", &self.host).replace("{text}", text)
    }
}

/// Generates the next `<prefix>-<n>` id for a category
fn next_id(counters: &mut HashMap<&'static str, usize>, category: LinkCategory) -> String {
    let prefix = category.id_prefix();
    let counter = counters.entry(prefix).or_insert(0);
    *counter += 1;
    format!("{}-{}", prefix, counter)
}

fn insert_unique(ids: &mut HashSet<String>, id: &str, section: &str) -> Result<(), SyncError> {
    if ids.insert(id.to_string()) {
        Ok(())
    } else {
        Err(SyncError::InvariantViolation(format!(
            "duplicate id '{}' in {}",
            id, section
        )))
    }
}
