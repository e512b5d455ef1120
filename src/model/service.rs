use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::activity::ActivityModel;
use crate::model::affinity::TechAffinityModel;
use crate::model::config::ModelConfig;
use crate::model::features::FeatureExtractor;
use crate::model::priors::{ActivityLevel, ActivityPreset, CommunityPriorStore};
use crate::model::scoring::MatchScorer;
use crate::model::types::{
    Archetype, FittedDistribution, MatchResult, RawUserRecord, TechnologyAffinity,
};

/// One prediction query: a pre-fetched user record plus the technologies to
/// score against. The archetype is optional; when absent (or unparseable) it
/// is inferred from the user's primary language.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub username: String,
    #[serde(flatten)]
    pub record: RawUserRecord,
    #[serde(default)]
    pub target_technologies: Vec<String>,
    #[serde(default)]
    pub archetype: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPrediction {
    pub distribution: FittedDistribution,
    pub expected_interval_days: Option<f64>,
    pub next_active_probability: Option<f64>,
    /// Community-typical parameters, included as reference context when the
    /// user's own data could not be fitted. Never folded into the score.
    pub community_reference: Option<ActivityPreset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyMatch {
    pub technology: String,
    #[serde(flatten)]
    pub result: MatchResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionReport {
    pub username: String,
    pub archetype: Archetype,
    pub primary_language: Option<String>,
    pub is_cold_start: bool,
    pub confidence_weight: f64,
    pub activity: ActivityPrediction,
    pub affinity: Vec<TechnologyAffinity>,
    pub matches: Vec<TechnologyMatch>,
}

/// Stateless orchestration of one user+technology query: extract features,
/// fit the activity distribution, blend the affinity estimate, score. Every
/// call owns its working set end-to-end; repeated calls with identical input
/// produce identical output.
#[derive(Debug, Clone)]
pub struct PredictionService {
    extractor: FeatureExtractor,
    activity: ActivityModel,
    affinity: TechAffinityModel,
    scorer: MatchScorer,
    priors: CommunityPriorStore,
    horizon_days: f64,
}

impl Default for PredictionService {
    fn default() -> Self {
        Self::new(ModelConfig::default())
    }
}

impl PredictionService {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            extractor: FeatureExtractor::new(config.activity.observation_window_days),
            activity: ActivityModel::new(config.activity.clone()),
            affinity: TechAffinityModel::new(config.affinity.clone()),
            scorer: MatchScorer::new(config.weights.clone()),
            priors: CommunityPriorStore::new(),
            horizon_days: config.activity.horizon_days,
        }
    }

    pub fn predict(
        &self,
        request: &PredictionRequest,
        evaluated_at: DateTime<Utc>,
    ) -> PredictionReport {
        let features = self.extractor.extract(&request.record, evaluated_at);
        let project_count = features.counters.project_count;

        let archetype = self.resolve_archetype(
            request.archetype.as_deref(),
            features.primary_language.as_deref(),
        );
        let prior = self.priors.lookup_or_default(archetype);

        let distribution = self.activity.fit(&features.intervals);
        let next_active_probability = self.activity.cdf(&distribution, self.horizon_days);
        let expected_interval_days = self.activity.expected_recurrence_days(&distribution);

        if distribution.is_insufficient() {
            tracing::debug!(
                user = %request.username,
                "no usable commit intervals, activity estimate withheld"
            );
        }

        let community_reference = if distribution.is_insufficient() {
            Some(ActivityLevel::from_project_count(project_count).preset())
        } else {
            None
        };

        let confidence_weight = self.affinity.confidence_weight(project_count);
        let is_cold_start = self.affinity.is_cold_start(project_count);
        let affinity = self
            .affinity
            .blended_distribution(&features.tags, project_count, prior);

        let matches = request
            .target_technologies
            .iter()
            .map(|technology| {
                let blended = self.affinity.blended_probability(
                    &features.tags,
                    project_count,
                    prior,
                    technology,
                );
                TechnologyMatch {
                    technology: technology.clone(),
                    result: self.scorer.score(Some(blended), next_active_probability),
                }
            })
            .collect();

        PredictionReport {
            username: request.username.clone(),
            archetype,
            primary_language: features.primary_language,
            is_cold_start,
            confidence_weight,
            activity: ActivityPrediction {
                distribution,
                expected_interval_days,
                next_active_probability,
                community_reference,
            },
            affinity,
            matches,
        }
    }

    fn resolve_archetype(&self, requested: Option<&str>, primary_language: Option<&str>) -> Archetype {
        match requested {
            Some(label) => match Archetype::parse(label) {
                Some(archetype) => archetype,
                None => {
                    let fallback = Archetype::from_primary_language(primary_language);
                    tracing::warn!(
                        label,
                        fallback = fallback.as_str(),
                        "unrecognized archetype label, using inferred archetype"
                    );
                    fallback
                }
            },
            None => Archetype::from_primary_language(primary_language),
        }
    }
}
