use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffinityParams {
    /// Laplace smoothing constant.
    pub alpha: f64,
    /// Below this project count the blend is dominated by the community prior.
    pub cold_start_threshold: u32,
    /// Project count at which the confidence weight saturates at 1.0.
    pub confidence_threshold: u32,
}

impl Default for AffinityParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            cold_start_threshold: 5,
            confidence_threshold: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityParams {
    /// Trailing observation window for commit timestamps, in days.
    pub observation_window_days: i64,
    /// Horizon for the activity-probability query, in days.
    pub horizon_days: f64,
    /// Minimum interval count for a Weibull fit.
    pub min_intervals: usize,
    /// Zero-length gaps are clamped to this value before fitting.
    pub interval_epsilon_days: f64,
    /// Iteration cap for the shape-equation solver.
    pub max_fit_iterations: usize,
    /// Convergence tolerance for the shape-equation solver.
    pub fit_tolerance: f64,
}

impl Default for ActivityParams {
    fn default() -> Self {
        Self {
            observation_window_days: 365,
            horizon_days: 30.0,
            min_intervals: 2,
            interval_epsilon_days: 0.01,
            max_fit_iterations: 50,
            fit_tolerance: 1e-9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub tech: f64,
    pub active: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            tech: 0.7,
            active: 0.3,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    pub affinity: AffinityParams,
    pub activity: ActivityParams,
    pub weights: ScoreWeights,
}

impl ModelConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("DEVSCOPE_SMOOTHING_ALPHA") {
            if let Ok(alpha) = val.parse::<f64>() {
                if alpha > 0.0 && alpha.is_finite() {
                    config.affinity.alpha = alpha;
                }
            }
        }
        if let Ok(val) = std::env::var("DEVSCOPE_COLD_START_THRESHOLD") {
            config.affinity.cold_start_threshold =
                val.parse().unwrap_or(config.affinity.cold_start_threshold);
        }
        if let Ok(val) = std::env::var("DEVSCOPE_CONFIDENCE_THRESHOLD") {
            config.affinity.confidence_threshold =
                val.parse().unwrap_or(config.affinity.confidence_threshold);
        }
        if let Ok(val) = std::env::var("DEVSCOPE_OBSERVATION_WINDOW_DAYS") {
            config.activity.observation_window_days =
                val.parse().unwrap_or(config.activity.observation_window_days);
        }
        if let Ok(val) = std::env::var("DEVSCOPE_HORIZON_DAYS") {
            if let Ok(horizon) = val.parse::<f64>() {
                if horizon >= 0.0 && horizon.is_finite() {
                    config.activity.horizon_days = horizon;
                }
            }
        }
        if let Ok(val) = std::env::var("DEVSCOPE_TECH_WEIGHT") {
            if let Ok(tech) = val.parse::<f64>() {
                if (0.0..=1.0).contains(&tech) {
                    // The two weights must sum to 1.
                    config.weights.tech = tech;
                    config.weights.active = 1.0 - tech;
                }
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = ModelConfig::default();
        assert_eq!(config.affinity.alpha, 1.0);
        assert_eq!(config.affinity.cold_start_threshold, 5);
        assert_eq!(config.affinity.confidence_threshold, 10);
        assert_eq!(config.activity.observation_window_days, 365);
        assert_eq!(config.activity.horizon_days, 30.0);
        assert_eq!(config.activity.min_intervals, 2);
        assert_eq!(config.weights.tech, 0.7);
        assert_eq!(config.weights.active, 0.3);
    }

    #[test]
    fn weights_sum_to_one() {
        let weights = ScoreWeights::default();
        assert!((weights.tech + weights.active - 1.0).abs() < 1e-12);
    }
}
