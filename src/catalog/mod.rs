//! Catalog module: everything between extracted links and the final document
//!
//! - Classification of links into categories
//! - Grouping and best-link selection for tools
//! - Deduplication and id assignment
//!
//! None of these stages perform I/O; each takes the previous stage's output
//! by value and returns a new value.

mod assemble;
mod classify;
mod model;
mod select;

pub use assemble::{Assembler, VerifiedTool};
pub use classify::{ClassificationRule, Classifier};
pub use model::{
    CatalogDocument, CatalogEntry, ClassifiedLink, LinkCategory, RawLink, ResolvedLink,
};
pub use select::{
    pick_best, GroupKey, Identity, IdentityTable, ScoredCandidate, Scorer, SelectedTool,
    Selector, ToolGroup,
};

use crate::config::Config;

/// Builds the selector described by the configuration
pub fn selector_from_config(config: &Config) -> Selector {
    Selector::new(
        IdentityTable::new(&config.identities),
        Scorer::new(&config.scoring, &config.classification.app_extensions),
    )
}

/// Builds the classifier described by the configuration
pub fn classifier_from_config(config: &Config) -> Classifier {
    Classifier::from_config(&config.classification, &config.identities)
}
