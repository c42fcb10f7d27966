//! Grouping of application links and best-link selection
//!
//! A page often lists the same tool more than once, e.g. once as a direct
//! `.ipa` link and once inside a guide. Application links are grouped by the
//! tool they refer to and every group is reduced to the single link with the
//! highest score.

use crate::catalog::model::{ClassifiedLink, LinkCategory};
use crate::config::{IdentityConfig, ScoringConfig};

/// A known tool identity with lowercased keywords
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub name: String,
    keywords: Vec<String>,
}

impl Identity {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            keywords: config
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .collect(),
        }
    }

    /// Returns true if every keyword occurs in `haystack` (case-insensitive)
    pub fn matches(&self, haystack: &str) -> bool {
        let haystack = haystack.to_lowercase();
        self.keywords.iter().all(|k| haystack.contains(k.as_str()))
    }

    pub fn specificity(&self) -> usize {
        self.keywords.len()
    }
}

/// Identity table ordered most-specific first
///
/// "KSign BMW" must be tested before "KSign", otherwise the compound name
/// would be absorbed by its shorter sub-name.
#[derive(Debug, Clone)]
pub struct IdentityTable {
    identities: Vec<Identity>,
}

impl IdentityTable {
    pub fn new(configs: &[IdentityConfig]) -> Self {
        let mut identities: Vec<Identity> = configs.iter().map(Identity::new).collect();
        // Stable: equally specific identities keep their configured order
        identities.sort_by(|a, b| b.specificity().cmp(&a.specificity()));
        Self { identities }
    }

    /// Finds the identity an anchor text refers to
    pub fn match_text(&self, text: &str) -> Option<&Identity> {
        self.identities.iter().find(|identity| identity.matches(text))
    }
}

/// Key of a tool group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// A known identity, by id
    Identity(String),

    /// A link that matched no identity; numbered from 1 in discovery order
    Unassigned(usize),
}

/// Application links believed to refer to the same tool
#[derive(Debug, Clone)]
pub struct ToolGroup {
    pub key: GroupKey,
    pub identity: Option<Identity>,

    /// Candidates in discovery order
    pub candidates: Vec<ClassifiedLink>,
}

/// A candidate with its computed score
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub link: ClassifiedLink,
    pub score: i32,
}

/// The chosen link for one tool
#[derive(Debug, Clone)]
pub struct SelectedTool {
    pub key: GroupKey,
    pub identity: Option<Identity>,
    pub link: ClassifiedLink,
    pub score: i32,
}

/// Scores candidate links with configurable weights
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: ScoringConfig,
    app_extensions: Vec<String>,
}

impl Scorer {
    pub fn new(weights: &ScoringConfig, app_extensions: &[String]) -> Self {
        let lower = |items: &[String]| -> Vec<String> {
            items.iter().map(|s| s.trim().to_lowercase()).collect()
        };

        Self {
            weights: ScoringConfig {
                download_keywords: lower(&weights.download_keywords),
                raw_markers: lower(&weights.raw_markers),
                misplaced_markers: lower(&weights.misplaced_markers),
                ..weights.clone()
            },
            app_extensions: lower(app_extensions),
        }
    }

    /// Computes the score of a candidate within a group
    ///
    /// | Signal | Default |
    /// |--------|---------|
    /// | path ends in an application extension | +100 |
    /// | URL or text matches the group identity | +30 |
    /// | URL contains a download keyword | +10 |
    /// | URL is on raw-content hosting | +8 |
    /// | path looks like docs/certificates/DNS | -40 |
    pub fn score(&self, link: &ClassifiedLink, identity: Option<&Identity>) -> i32 {
        let w = &self.weights;
        let url = link.url().as_str().to_lowercase();
        let path = link.url().path().to_lowercase();
        let mut score = 0;

        if self.app_extensions.iter().any(|ext| path.ends_with(ext.as_str())) {
            score += w.app_extension;
        }

        if let Some(identity) = identity {
            if identity.matches(&url) || identity.matches(link.text()) {
                score += w.identity_match;
            }
        }

        if w.download_keywords.iter().any(|k| url.contains(k.as_str())) {
            score += w.download_keyword;
        }

        if w.raw_markers.iter().any(|m| url.contains(m.as_str())) {
            score += w.raw_host;
        }

        if w.misplaced_markers.iter().any(|m| path.contains(m.as_str())) {
            score += w.misplaced_path;
        }

        score
    }
}

/// Groups application links and selects one link per tool
#[derive(Debug, Clone)]
pub struct Selector {
    identities: IdentityTable,
    scorer: Scorer,
}

impl Selector {
    pub fn new(identities: IdentityTable, scorer: Scorer) -> Self {
        Self { identities, scorer }
    }

    pub fn identities(&self) -> &IdentityTable {
        &self.identities
    }

    /// Partitions application links into tool groups
    ///
    /// Non-application links are ignored. Groups come out in the order their
    /// first candidate was discovered; unmatched links each get their own
    /// unassigned group.
    pub fn group<I>(&self, links: I) -> Vec<ToolGroup>
    where
        I: IntoIterator<Item = ClassifiedLink>,
    {
        let mut groups: Vec<ToolGroup> = Vec::new();
        let mut unassigned = 0;

        for link in links {
            if link.category != LinkCategory::Application {
                continue;
            }

            match self.identities.match_text(link.text()) {
                Some(identity) => {
                    let key = GroupKey::Identity(identity.id.clone());
                    match groups.iter_mut().find(|g| g.key == key) {
                        Some(group) => group.candidates.push(link),
                        None => groups.push(ToolGroup {
                            key,
                            identity: Some(identity.clone()),
                            candidates: vec![link],
                        }),
                    }
                }
                None => {
                    unassigned += 1;
                    groups.push(ToolGroup {
                        key: GroupKey::Unassigned(unassigned),
                        identity: None,
                        candidates: vec![link],
                    });
                }
            }
        }

        groups
    }

    /// Scores a group's candidates and keeps the best one
    pub fn select(&self, group: ToolGroup) -> Option<SelectedTool> {
        let scored = group
            .candidates
            .into_iter()
            .map(|link| {
                let score = self.scorer.score(&link, group.identity.as_ref());
                tracing::trace!("score {} for {} ({})", score, link.url(), link.text());
                ScoredCandidate { link, score }
            })
            .collect();

        let best = pick_best(scored)?;
        Some(SelectedTool {
            key: group.key,
            identity: group.identity,
            link: best.link,
            score: best.score,
        })
    }

    /// Groups the links and selects one link per group, in group order
    pub fn select_all<I>(&self, links: I) -> Vec<SelectedTool>
    where
        I: IntoIterator<Item = ClassifiedLink>,
    {
        self.group(links)
            .into_iter()
            .filter_map(|group| self.select(group))
            .collect()
    }
}

/// Picks the highest-scoring candidate
///
/// Ties go to the candidate that appears first in `candidates`.
pub fn pick_best(candidates: Vec<ScoredCandidate>) -> Option<ScoredCandidate> {
    let mut best: Option<ScoredCandidate> = None;
    for candidate in candidates {
        match &best {
            Some(current) if candidate.score <= current.score => {}
            _ => best = Some(candidate),
        }
    }
    best
}
