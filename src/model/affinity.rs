use std::collections::BTreeMap;

use crate::model::config::AffinityParams;
use crate::model::priors::CommunityPrior;
use crate::model::types::{TechTagMultiset, TechnologyAffinity};

/// Returned when the user has no observed technologies at all and the
/// requested label carries no information either way.
const NEUTRAL_PROBABILITY: f64 = 0.5;

/// Smoothed per-technology engagement probabilities, blended with a
/// community prior under a confidence weight derived from project count.
/// The linear blend itself encodes the cold-start behavior: at low project
/// counts the community term dominates by construction, with no separate
/// branch.
#[derive(Debug, Clone)]
pub struct TechAffinityModel {
    params: AffinityParams,
}

impl Default for TechAffinityModel {
    fn default() -> Self {
        Self::new(AffinityParams::default())
    }
}

impl TechAffinityModel {
    pub fn new(params: AffinityParams) -> Self {
        Self { params }
    }

    /// Laplace-smoothed user estimate: (n_k + alpha) / (N + alpha * K).
    /// Well-defined at N = 0 (uniform 1/K); a neutral constant when K = 0.
    pub fn user_probability(&self, tags: &TechTagMultiset, technology: &str) -> f64 {
        let k = tags.distinct() as f64;
        if tags.distinct() == 0 {
            return NEUTRAL_PROBABILITY;
        }
        let n_total = tags.total() as f64;
        let n_tech = tags.count(technology) as f64;
        (n_tech + self.params.alpha) / (n_total + self.params.alpha * k)
    }

    /// min(1, projectCount / threshold): 0 with no projects, saturating at
    /// the confidence threshold, linear in between.
    pub fn confidence_weight(&self, project_count: u32) -> f64 {
        if self.params.confidence_threshold == 0 {
            return 1.0;
        }
        (project_count as f64 / self.params.confidence_threshold as f64).min(1.0)
    }

    pub fn is_cold_start(&self, project_count: u32) -> bool {
        project_count < self.params.cold_start_threshold
    }

    /// w * userProbability + (1 - w) * communityPrior. A technology absent
    /// from the prior contributes 0 from the community term, not an error.
    pub fn blended_probability(
        &self,
        tags: &TechTagMultiset,
        project_count: u32,
        prior: &CommunityPrior,
        technology: &str,
    ) -> f64 {
        let w = self.confidence_weight(project_count);
        w * self.user_probability(tags, technology) + (1.0 - w) * prior.probability(technology)
    }

    /// Blended probabilities over the union of user-observed and prior
    /// labels, sorted by probability descending then label ascending.
    pub fn blended_distribution(
        &self,
        tags: &TechTagMultiset,
        project_count: u32,
        prior: &CommunityPrior,
    ) -> Vec<TechnologyAffinity> {
        // BTreeMap keyed by lowercase label keeps the union deterministic.
        let mut labels: BTreeMap<String, String> = BTreeMap::new();
        for (label, _) in tags.sorted_entries() {
            labels.insert(label.to_lowercase(), label);
        }
        for (label, _) in prior.entries() {
            labels
                .entry(label.to_lowercase())
                .or_insert_with(|| label.clone());
        }

        let mut distribution: Vec<TechnologyAffinity> = labels
            .into_values()
            .map(|label| {
                let probability = self.blended_probability(tags, project_count, prior, &label);
                TechnologyAffinity {
                    count: tags.count(&label),
                    technology: label,
                    probability,
                }
            })
            .collect();

        distribution.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.technology.cmp(&b.technology))
        });
        distribution
    }
}
