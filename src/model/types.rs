use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Coarse developer category used to select a community prior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Archetype {
    #[default]
    Backend,
    Frontend,
    Devops,
    Aiml,
    Data,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Self::Backend,
        Self::Frontend,
        Self::Devops,
        Self::Aiml,
        Self::Data,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backend => "backend",
            Self::Frontend => "frontend",
            Self::Devops => "devops",
            Self::Aiml => "aiml",
            Self::Data => "data",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "backend" => Some(Self::Backend),
            "frontend" => Some(Self::Frontend),
            "devops" | "infrastructure" => Some(Self::Devops),
            "aiml" | "ai/ml" | "ai-ml" => Some(Self::Aiml),
            "data" | "data-engineer" => Some(Self::Data),
            _ => None,
        }
    }

    /// Guess an archetype from a user's dominant repository language.
    pub fn from_primary_language(language: Option<&str>) -> Self {
        let Some(language) = language else {
            return Self::Backend;
        };
        match language.to_lowercase().as_str() {
            "python" | "julia" => Self::Aiml,
            "javascript" | "typescript" | "vue" | "css" | "html" => Self::Frontend,
            "go" | "rust" | "shell" | "dockerfile" => Self::Devops,
            "scala" | "r" | "sql" => Self::Data,
            _ => Self::Backend,
        }
    }
}

/// Result of one distribution fit. Owned by a single evaluation and never
/// mutated after creation; every consumer must handle all three variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum FittedDistribution {
    Weibull { shape: f64, scale: f64, samples: usize },
    Exponential { rate: f64, samples: usize },
    Insufficient,
}

impl FittedDistribution {
    pub fn family(&self) -> &'static str {
        match self {
            Self::Weibull { .. } => "weibull",
            Self::Exponential { .. } => "exponential",
            Self::Insufficient => "insufficient",
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::Insufficient)
    }

    pub fn samples(&self) -> usize {
        match self {
            Self::Weibull { samples, .. } | Self::Exponential { samples, .. } => *samples,
            Self::Insufficient => 0,
        }
    }
}

/// Discrete match band. Boundary values belong to the higher band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLevel {
    Excellent,
    High,
    Medium,
    Low,
    Mismatch,
}

impl MatchLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::Excellent
        } else if score >= 0.6 {
            Self::High
        } else if score >= 0.4 {
            Self::Medium
        } else if score >= 0.2 {
            Self::Low
        } else {
            Self::Mismatch
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Mismatch => "mismatch",
        }
    }
}

/// Composite score with its weighted sub-scores. A `None` score means one of
/// the inputs carried an insufficient-data sentinel; the available
/// contribution is still reported for explainability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub score: Option<f64>,
    pub level: Option<MatchLevel>,
    pub tech_contribution: Option<f64>,
    pub activity_contribution: Option<f64>,
}

/// One repository as fetched by the host. Language and topics are both
/// optional in upstream data; missing fields are tolerated, not rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRecord {
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Raw per-user input as materialized by the host. The core assumes the data
/// has already been fetched; it never performs I/O itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUserRecord {
    #[serde(default)]
    pub commit_times: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub repositories: Vec<RepositoryRecord>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
}

/// Scalar profile counts. Only used to derive the confidence weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCounters {
    pub project_count: u32,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
}

/// Technology label -> occurrence count, keyed case-insensitively while
/// preserving the first-seen casing for output.
#[derive(Debug, Clone, Default)]
pub struct TechTagMultiset {
    entries: HashMap<String, TagEntry>,
    total: u32,
}

#[derive(Debug, Clone)]
struct TagEntry {
    label: String,
    count: u32,
}

impl TechTagMultiset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str) {
        let label = label.trim();
        if label.is_empty() {
            return;
        }
        let key = label.to_lowercase();
        let entry = self.entries.entry(key).or_insert_with(|| TagEntry {
            label: label.to_string(),
            count: 0,
        });
        entry.count += 1;
        self.total += 1;
    }

    pub fn count(&self, technology: &str) -> u32 {
        self.entries
            .get(&technology.trim().to_lowercase())
            .map(|entry| entry.count)
            .unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn distinct(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels with counts, sorted by count descending then label ascending so
    /// output ordering is deterministic.
    pub fn sorted_entries(&self) -> Vec<(String, u32)> {
        let mut entries: Vec<(String, u32)> = self
            .entries
            .values()
            .map(|entry| (entry.label.clone(), entry.count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }
}

/// Canonical feature set produced by the extractor.
#[derive(Debug, Clone, Default)]
pub struct UserFeatures {
    /// Gaps between consecutive in-window commits, in days.
    pub intervals: Vec<f64>,
    pub tags: TechTagMultiset,
    pub primary_language: Option<String>,
    pub counters: ProfileCounters,
}

/// One entry of the blended affinity distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyAffinity {
    pub technology: String,
    pub probability: f64,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_boundaries_belong_to_higher_band() {
        assert_eq!(MatchLevel::from_score(0.8), MatchLevel::Excellent);
        assert_eq!(MatchLevel::from_score(0.7999), MatchLevel::High);
        assert_eq!(MatchLevel::from_score(0.6), MatchLevel::High);
        assert_eq!(MatchLevel::from_score(0.4), MatchLevel::Medium);
        assert_eq!(MatchLevel::from_score(0.2), MatchLevel::Low);
        assert_eq!(MatchLevel::from_score(0.1999), MatchLevel::Mismatch);
        assert_eq!(MatchLevel::from_score(0.0), MatchLevel::Mismatch);
        assert_eq!(MatchLevel::from_score(1.0), MatchLevel::Excellent);
    }

    #[test]
    fn archetype_parse_round_trip() {
        for archetype in Archetype::ALL {
            assert_eq!(Archetype::parse(archetype.as_str()), Some(archetype));
        }
        assert_eq!(Archetype::parse("AI/ML"), Some(Archetype::Aiml));
        assert_eq!(Archetype::parse("something-else"), None);
    }

    #[test]
    fn archetype_from_language() {
        assert_eq!(
            Archetype::from_primary_language(Some("Python")),
            Archetype::Aiml
        );
        assert_eq!(
            Archetype::from_primary_language(Some("TypeScript")),
            Archetype::Frontend
        );
        assert_eq!(
            Archetype::from_primary_language(Some("Rust")),
            Archetype::Devops
        );
        assert_eq!(
            Archetype::from_primary_language(Some("Scala")),
            Archetype::Data
        );
        assert_eq!(
            Archetype::from_primary_language(Some("Java")),
            Archetype::Backend
        );
        assert_eq!(Archetype::from_primary_language(None), Archetype::Backend);
    }

    #[test]
    fn multiset_is_case_insensitive() {
        let mut tags = TechTagMultiset::new();
        tags.add("Python");
        tags.add("python");
        tags.add("Go");
        assert_eq!(tags.count("PYTHON"), 2);
        assert_eq!(tags.count("go"), 1);
        assert_eq!(tags.total(), 3);
        assert_eq!(tags.distinct(), 2);
        // First-seen casing wins in output.
        let entries = tags.sorted_entries();
        assert_eq!(entries[0], ("Python".to_string(), 2));
    }

    #[test]
    fn multiset_ignores_blank_labels() {
        let mut tags = TechTagMultiset::new();
        tags.add("  ");
        tags.add("");
        assert!(tags.is_empty());
        assert_eq!(tags.total(), 0);
    }

    #[test]
    fn distribution_family_tags() {
        let weibull = FittedDistribution::Weibull {
            shape: 1.5,
            scale: 7.0,
            samples: 12,
        };
        assert_eq!(weibull.family(), "weibull");
        assert_eq!(weibull.samples(), 12);
        assert!(FittedDistribution::Insufficient.is_insufficient());
        assert_eq!(FittedDistribution::Insufficient.samples(), 0);
    }
}
