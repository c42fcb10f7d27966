//! Link and catalog types shared by the pipeline stages
//!
//! Every value here lives for a single synchronization run; only the
//! serialized `CatalogDocument` outlives it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// Domain category of a discovered link
///
/// Links that fit none of these are unrecognized and never reach the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkCategory {
    /// An installable application package
    Application,

    /// A certificate bundle
    Certificate,

    /// A device configuration (DNS) profile
    DnsProfile,
}

impl LinkCategory {
    /// Prefix used for generated catalog ids (`cert-1`, `dns-2`, ...)
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Application => "app",
            Self::Certificate => "cert",
            Self::DnsProfile => "dns",
        }
    }

    /// Human-readable label, used as the entry name for certificates and profiles
    pub fn label(&self) -> &'static str {
        match self {
            Self::Application => "Application",
            Self::Certificate => "Certificate",
            Self::DnsProfile => "DNS Profile",
        }
    }

    /// Returns true if links of this category land in the `tools` section
    pub fn is_tool(&self) -> bool {
        matches!(self, Self::Application)
    }
}

impl fmt::Display for LinkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Application => "application",
            Self::Certificate => "certificate",
            Self::DnsProfile => "dns-profile",
        };
        write!(f, "{}", s)
    }
}

/// An anchor as found in the markup, before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLink {
    /// The `href` attribute, trimmed; possibly relative
    pub href: String,

    /// Plain, whitespace-normalized anchor text
    pub anchor_text: String,
}

/// A link resolved against the source page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    /// Absolute http(s) URL
    pub url: Url,

    /// Anchor text (falls back to the href when the anchor has no text)
    pub text: String,

    /// Discovery index in the extracted sequence
    pub position: usize,
}

/// A resolved link with its category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLink {
    pub link: ResolvedLink,
    pub category: LinkCategory,
}

impl ClassifiedLink {
    pub fn url(&self) -> &Url {
        &self.link.url
    }

    pub fn text(&self) -> &str {
        &self.link.text
    }

    pub fn position(&self) -> usize {
        self.link.position
    }
}

/// One entry of the published catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,

    /// Verified reachability; only present for `tools` entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,

    pub description: String,
    pub url: String,
}

/// The catalog document handed to the presentation layer
///
/// Serializes to a JSON object with exactly two keys, `tools` and
/// `certificates`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub tools: Vec<CatalogEntry>,
    pub certificates: Vec<CatalogEntry>,
}

impl CatalogDocument {
    /// Total number of entries across both sections
    pub fn len(&self) -> usize {
        self.tools.len() + self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty() && self.certificates.is_empty()
    }

    /// Checks the document invariants
    ///
    /// Ids must be unique within each section and urls unique across the
    /// whole document. Returns a description of the first violation.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (section, entries) in [("tools", &self.tools), ("certificates", &self.certificates)] {
            let mut ids = HashSet::new();
            for entry in entries {
                if !ids.insert(entry.id.as_str()) {
                    return Err(format!("duplicate id '{}' in {}", entry.id, section));
                }
            }
        }

        let mut urls = HashSet::new();
        for entry in self.tools.iter().chain(self.certificates.iter()) {
            if !urls.insert(entry.url.as_str()) {
                return Err(format!("duplicate url '{}'", entry.url));
            }
        }

        Ok(())
    }
}
