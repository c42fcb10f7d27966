//! Link classification
//!
//! The policy is an ordered list of rules; the first rule that matches a link
//! decides its category. Profile and certificate rules come before the
//! application rule because they key on file types, while applications are
//! mostly recognized by product names that also show up around certificate
//! links.

use crate::catalog::model::{ClassifiedLink, LinkCategory, ResolvedLink};
use crate::config::{ClassificationConfig, IdentityConfig};
use url::Url;

/// A single classification rule
///
/// Matches when the lowercased URL path ends in one of `extensions`, or the
/// lowercased anchor text contains one of `keywords`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    pub category: LinkCategory,
    pub extensions: Vec<String>,
    pub keywords: Vec<String>,
}

impl ClassificationRule {
    pub fn new(category: LinkCategory, extensions: &[String], keywords: &[String]) -> Self {
        Self {
            category,
            extensions: lowercase_all(extensions),
            keywords: lowercase_all(keywords),
        }
    }

    /// Tests the rule against an already-lowercased path and text
    fn matches(&self, path: &str, text: &str) -> bool {
        self.extensions.iter().any(|ext| path.ends_with(ext.as_str()))
            || self.keywords.iter().any(|kw| text.contains(kw.as_str()))
    }
}

/// Ordered rule set mapping links to categories
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<ClassificationRule>,
}

impl Classifier {
    /// Creates a classifier from explicit rules, evaluated in order
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    /// Builds the standard rule order: DNS profile, certificate, application
    ///
    /// Every identity keyword also counts as an application keyword.
    pub fn from_config(config: &ClassificationConfig, identities: &[IdentityConfig]) -> Self {
        let mut app_keywords = config.app_keywords.clone();
        for identity in identities {
            for keyword in &identity.keywords {
                if !app_keywords.contains(keyword) {
                    app_keywords.push(keyword.clone());
                }
            }
        }

        Self::new(vec![
            ClassificationRule::new(
                LinkCategory::DnsProfile,
                &config.profile_extensions,
                &config.profile_keywords,
            ),
            ClassificationRule::new(
                LinkCategory::Certificate,
                &config.certificate_extensions,
                &config.certificate_keywords,
            ),
            ClassificationRule::new(
                LinkCategory::Application,
                &config.app_extensions,
                &app_keywords,
            ),
        ])
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Classifies a link; `None` means unrecognized
    pub fn classify(&self, url: &Url, text: &str) -> Option<LinkCategory> {
        let path = url.path().to_lowercase();
        let text = text.to_lowercase();

        self.rules
            .iter()
            .find(|rule| rule.matches(&path, &text))
            .map(|rule| rule.category)
    }

    /// Classifies a resolved link, dropping it when unrecognized
    pub fn classify_link(&self, link: ResolvedLink) -> Option<ClassifiedLink> {
        let category = self.classify(&link.url, &link.text)?;
        Some(ClassifiedLink { link, category })
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_config(
            &ClassificationConfig::default(),
            &crate::config::default_identities(),
        )
    }
}

fn lowercase_all(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.trim().to_lowercase()).collect()
}
