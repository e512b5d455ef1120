use crate::model::config::ScoreWeights;
use crate::model::types::{MatchLevel, MatchResult};

/// Combines the blended technology probability and the horizon activity
/// probability into one bounded composite score with a discrete level.
///
/// A `None` input is an insufficient-data sentinel: it is surfaced in the
/// result rather than silently defaulted, and the composite score is
/// withheld. The available sub-score is still reported.
#[derive(Debug, Clone)]
pub struct MatchScorer {
    weights: ScoreWeights,
}

impl Default for MatchScorer {
    fn default() -> Self {
        Self::new(ScoreWeights::default())
    }
}

impl MatchScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn score(
        &self,
        tech_probability: Option<f64>,
        activity_probability: Option<f64>,
    ) -> MatchResult {
        let tech_contribution = tech_probability.map(|p| self.weights.tech * p.clamp(0.0, 1.0));
        let activity_contribution =
            activity_probability.map(|p| self.weights.active * p.clamp(0.0, 1.0));

        let score = match (tech_contribution, activity_contribution) {
            (Some(tech), Some(active)) => Some((tech + active).clamp(0.0, 1.0)),
            _ => None,
        };

        MatchResult {
            score,
            level: score.map(MatchLevel::from_score),
            tech_contribution,
            activity_contribution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_uses_fixed_weights() {
        let scorer = MatchScorer::default();
        let result = scorer.score(Some(0.75), Some(0.9));
        let score = result.score.unwrap();
        assert!((score - (0.7 * 0.75 + 0.3 * 0.9)).abs() < 1e-12);
        assert!((result.tech_contribution.unwrap() - 0.525).abs() < 1e-12);
        assert!((result.activity_contribution.unwrap() - 0.27).abs() < 1e-12);
    }

    #[test]
    fn level_follows_the_band_of_the_score() {
        let scorer = MatchScorer::default();
        let result = scorer.score(Some(1.0), Some(1.0));
        assert_eq!(result.level, Some(MatchLevel::Excellent));

        // 0.7 * 0.9999 + 0.3 * 0.333 = 0.79983, just under the top band.
        let result = scorer.score(Some(0.9999), Some(0.333));
        assert_eq!(result.level, Some(MatchLevel::High));

        let result = scorer.score(Some(0.5), Some(0.5));
        assert_eq!(result.level, Some(MatchLevel::Medium));
        let result = scorer.score(Some(0.0), Some(0.0));
        assert_eq!(result.level, Some(MatchLevel::Mismatch));
    }

    #[test]
    fn score_is_bounded() {
        let scorer = MatchScorer::default();
        let result = scorer.score(Some(1.0), Some(1.0));
        assert_eq!(result.score, Some(1.0));
        let result = scorer.score(Some(0.0), Some(0.0));
        assert_eq!(result.score, Some(0.0));
        // Out-of-range inputs are clamped defensively.
        let result = scorer.score(Some(1.7), Some(-0.2));
        assert_eq!(result.score, Some(0.7));
    }

    #[test]
    fn missing_activity_withholds_score_but_keeps_tech_side() {
        let scorer = MatchScorer::default();
        let result = scorer.score(Some(0.6), None);
        assert_eq!(result.score, None);
        assert_eq!(result.level, None);
        assert!((result.tech_contribution.unwrap() - 0.42).abs() < 1e-12);
        assert_eq!(result.activity_contribution, None);
    }

    #[test]
    fn missing_tech_withholds_score_but_keeps_activity_side() {
        let scorer = MatchScorer::default();
        let result = scorer.score(None, Some(0.5));
        assert_eq!(result.score, None);
        assert_eq!(result.level, None);
        assert_eq!(result.tech_contribution, None);
        assert!((result.activity_contribution.unwrap() - 0.15).abs() < 1e-12);
    }
}
