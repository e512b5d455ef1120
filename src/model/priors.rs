use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::error::ModelError;
use crate::model::types::Archetype;

/// Static reference data: per-archetype technology priors and per-activity
/// -level Weibull presets. Loaded once at construction, never fitted or
/// mutated at runtime.
struct PriorSeed {
    archetype: Archetype,
    entries: &'static [(&'static str, f64)],
}

const PRIOR_SEEDS: &[PriorSeed] = &[
    PriorSeed {
        archetype: Archetype::Backend,
        entries: &[
            ("Python", 0.25),
            ("Java", 0.20),
            ("Go", 0.15),
            ("C++", 0.15),
            ("Node.js", 0.10),
            ("Ruby", 0.08),
            ("Other", 0.07),
        ],
    },
    PriorSeed {
        archetype: Archetype::Frontend,
        entries: &[
            ("JavaScript", 0.35),
            ("TypeScript", 0.25),
            ("React", 0.20),
            ("Vue", 0.12),
            ("CSS", 0.05),
            ("HTML", 0.03),
        ],
    },
    PriorSeed {
        archetype: Archetype::Devops,
        entries: &[
            ("Go", 0.25),
            ("Python", 0.20),
            ("Bash", 0.20),
            ("Rust", 0.15),
            ("C", 0.10),
            ("Other", 0.10),
        ],
    },
    PriorSeed {
        archetype: Archetype::Aiml,
        entries: &[
            ("Python", 0.50),
            ("CUDA", 0.15),
            ("C++", 0.15),
            ("Julia", 0.10),
            ("R", 0.05),
            ("Other", 0.05),
        ],
    },
    PriorSeed {
        archetype: Archetype::Data,
        entries: &[
            ("Python", 0.35),
            ("Scala", 0.20),
            ("SQL", 0.20),
            ("Java", 0.15),
            ("R", 0.05),
            ("Other", 0.05),
        ],
    },
];

/// Fixed technology -> prior probability mapping for one archetype.
#[derive(Debug, Clone)]
pub struct CommunityPrior {
    archetype: Archetype,
    entries: Vec<(String, f64)>,
}

impl CommunityPrior {
    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    /// Prior probability for a technology; 0.0 when absent rather than an
    /// error. Lookup is case-insensitive.
    pub fn probability(&self, technology: &str) -> f64 {
        let technology = technology.trim();
        self.entries
            .iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(technology))
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }
}

/// Community-typical Weibull parameters for one activity level, used as a
/// reference when a user has no usable interval data of their own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPreset {
    pub shape: f64,
    pub scale: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Active,
    Medium,
    Sporadic,
}

impl ActivityLevel {
    pub fn from_project_count(project_count: u32) -> Self {
        if project_count > 3 {
            Self::Active
        } else {
            Self::Sporadic
        }
    }

    pub fn preset(&self) -> ActivityPreset {
        match self {
            Self::Active => ActivityPreset {
                shape: 1.8,
                scale: 3.5,
            },
            Self::Medium => ActivityPreset {
                shape: 1.5,
                scale: 7.2,
            },
            Self::Sporadic => ActivityPreset {
                shape: 1.2,
                scale: 15.0,
            },
        }
    }
}

/// Read-only archetype-keyed prior table.
#[derive(Debug, Clone)]
pub struct CommunityPriorStore {
    table: HashMap<Archetype, CommunityPrior>,
}

impl Default for CommunityPriorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityPriorStore {
    pub fn new() -> Self {
        let table = PRIOR_SEEDS
            .iter()
            .map(|seed| {
                let prior = CommunityPrior {
                    archetype: seed.archetype,
                    entries: seed
                        .entries
                        .iter()
                        .map(|(label, p)| (label.to_string(), *p))
                        .collect(),
                };
                (seed.archetype, prior)
            })
            .collect();
        Self { table }
    }

    pub fn lookup(&self, archetype: Archetype) -> Result<&CommunityPrior, ModelError> {
        self.table
            .get(&archetype)
            .ok_or(ModelError::UnknownArchetype(archetype))
    }

    /// Lookup that recovers from a missing archetype by substituting the
    /// default one. Never fails: the default is seeded unconditionally.
    pub fn lookup_or_default(&self, archetype: Archetype) -> &CommunityPrior {
        match self.lookup(archetype) {
            Ok(prior) => prior,
            Err(err) => {
                tracing::warn!(error = %err, "substituting default archetype prior");
                self.table
                    .get(&Archetype::default())
                    .expect("default archetype prior is always seeded")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_archetype_has_a_prior() {
        let store = CommunityPriorStore::new();
        for archetype in Archetype::ALL {
            assert!(store.lookup(archetype).is_ok());
        }
    }

    #[test]
    fn priors_sum_to_one() {
        let store = CommunityPriorStore::new();
        for archetype in Archetype::ALL {
            let prior = store.lookup(archetype).unwrap();
            let total: f64 = prior.entries().iter().map(|(_, p)| p).sum();
            assert!(
                (total - 1.0).abs() < 1e-9,
                "{archetype:?} prior sums to {total}"
            );
        }
    }

    #[test]
    fn probability_lookup_is_case_insensitive() {
        let store = CommunityPriorStore::new();
        let prior = store.lookup(Archetype::Aiml).unwrap();
        assert_eq!(prior.probability("python"), 0.50);
        assert_eq!(prior.probability("PYTHON"), 0.50);
    }

    #[test]
    fn missing_technology_has_zero_prior() {
        let store = CommunityPriorStore::new();
        let prior = store.lookup(Archetype::Frontend).unwrap();
        assert_eq!(prior.probability("COBOL"), 0.0);
    }

    #[test]
    fn activity_level_from_project_count() {
        assert_eq!(ActivityLevel::from_project_count(0), ActivityLevel::Sporadic);
        assert_eq!(ActivityLevel::from_project_count(3), ActivityLevel::Sporadic);
        assert_eq!(ActivityLevel::from_project_count(4), ActivityLevel::Active);
    }

    #[test]
    fn presets_are_positive() {
        for level in [
            ActivityLevel::Active,
            ActivityLevel::Medium,
            ActivityLevel::Sporadic,
        ] {
            let preset = level.preset();
            assert!(preset.shape > 0.0);
            assert!(preset.scale > 0.0);
        }
    }
}
