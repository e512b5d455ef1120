use crate::model::config::ActivityParams;
use crate::model::types::FittedDistribution;

/// Bounds for the Weibull shape parameter during the Newton iteration. A
/// solution pushed against either bound is treated as non-convergence.
const SHAPE_MIN: f64 = 1e-3;
const SHAPE_MAX: f64 = 1e3;

/// Exponent magnitude beyond which `exp` over/underflows f64.
const EXP_GUARD: f64 = 700.0;

/// Fits an inter-event-time distribution to a user's commit intervals and
/// answers activity-probability and expected-recurrence queries.
///
/// Fallback chain: Weibull (maximum likelihood, Newton on the profile
/// shape equation) -> Exponential (rate = 1/mean) -> Insufficient. Fits are
/// deterministic for identical input; there is no randomized initialization.
#[derive(Debug, Clone)]
pub struct ActivityModel {
    params: ActivityParams,
}

impl Default for ActivityModel {
    fn default() -> Self {
        Self::new(ActivityParams::default())
    }
}

impl ActivityModel {
    pub fn new(params: ActivityParams) -> Self {
        Self { params }
    }

    /// Fit a distribution to the given interval sequence (days). Zero-length
    /// gaps are clamped to a small epsilon rather than excluded, so the
    /// sample size is preserved and the likelihood stays non-degenerate.
    pub fn fit(&self, intervals: &[f64]) -> FittedDistribution {
        let epsilon = self.params.interval_epsilon_days;
        let samples: Vec<f64> = intervals
            .iter()
            .copied()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.max(epsilon))
            .collect();

        if samples.is_empty() {
            return FittedDistribution::Insufficient;
        }

        if samples.len() >= self.params.min_intervals {
            if let Some((shape, scale)) = self.fit_weibull(&samples) {
                return FittedDistribution::Weibull {
                    shape,
                    scale,
                    samples: samples.len(),
                };
            }
            tracing::debug!(
                samples = samples.len(),
                "weibull fit did not converge, falling back to exponential"
            );
        }

        self.fit_exponential(&samples)
    }

    /// Closed-form CDF at `horizon_days`. `None` only for the insufficient
    /// state; consumers must not substitute a default probability.
    pub fn cdf(&self, distribution: &FittedDistribution, horizon_days: f64) -> Option<f64> {
        if horizon_days <= 0.0 {
            return match distribution {
                FittedDistribution::Insufficient => None,
                _ => Some(0.0),
            };
        }

        match distribution {
            FittedDistribution::Weibull { shape, scale, .. } => {
                // (t/lambda)^k computed in log space to keep extreme shapes
                // from overflowing the power.
                let exponent = shape * (horizon_days / scale).ln();
                if exponent >= EXP_GUARD.ln() {
                    return Some(1.0);
                }
                let x = exponent.exp();
                Some(1.0 - (-x).exp())
            }
            FittedDistribution::Exponential { rate, .. } => {
                let x = rate * horizon_days;
                if x >= EXP_GUARD {
                    return Some(1.0);
                }
                Some(1.0 - (-x).exp())
            }
            FittedDistribution::Insufficient => None,
        }
    }

    /// Expected time to the next event in days. Weibull: lambda * Gamma(1 + 1/k).
    /// Exponential: 1/lambda. Insufficient: no estimate.
    pub fn expected_recurrence_days(&self, distribution: &FittedDistribution) -> Option<f64> {
        match distribution {
            FittedDistribution::Weibull { shape, scale, .. } => {
                Some(scale * gamma(1.0 + 1.0 / shape))
            }
            FittedDistribution::Exponential { rate, .. } => Some(1.0 / rate),
            FittedDistribution::Insufficient => None,
        }
    }

    /// Maximum-likelihood Weibull fit. The scale parameter has a closed form
    /// given the shape, so the problem reduces to a one-dimensional root
    /// find on the profile-likelihood shape equation
    ///
    ///   g(k) = sum(t^k ln t)/sum(t^k) - 1/k - mean(ln t) = 0
    ///
    /// solved by Newton iteration with a hard iteration cap. Returns `None`
    /// on non-convergence or invalid parameters.
    fn fit_weibull(&self, samples: &[f64]) -> Option<(f64, f64)> {
        let n = samples.len() as f64;
        let mean_ln: f64 = samples.iter().map(|t| t.ln()).sum::<f64>() / n;

        let mut k: f64 = 1.0;
        let mut converged = false;

        for _ in 0..self.params.max_fit_iterations {
            let mut s0 = 0.0;
            let mut s1 = 0.0;
            let mut s2 = 0.0;
            for &t in samples {
                let ln_t = t.ln();
                let tk = (k * ln_t).exp();
                if !tk.is_finite() {
                    return None;
                }
                s0 += tk;
                s1 += tk * ln_t;
                s2 += tk * ln_t * ln_t;
            }
            if s0 <= 0.0 || !s0.is_finite() {
                return None;
            }

            let g = s1 / s0 - 1.0 / k - mean_ln;
            let g_prime = (s2 * s0 - s1 * s1) / (s0 * s0) + 1.0 / (k * k);
            if !g.is_finite() || !g_prime.is_finite() || g_prime.abs() < 1e-300 {
                return None;
            }

            let step = g / g_prime;
            let next = (k - step).clamp(SHAPE_MIN, SHAPE_MAX);

            if (next - k).abs() < self.params.fit_tolerance || g.abs() < self.params.fit_tolerance {
                k = next;
                converged = true;
                break;
            }
            k = next;
        }

        if !converged || k <= SHAPE_MIN || k >= SHAPE_MAX {
            return None;
        }

        // lambda = (mean(t^k))^(1/k)
        let mean_tk: f64 = samples.iter().map(|t| (k * t.ln()).exp()).sum::<f64>() / n;
        let scale = mean_tk.powf(1.0 / k);

        if !k.is_finite() || !scale.is_finite() || k <= 0.0 || scale <= 0.0 {
            return None;
        }

        Some((k, scale))
    }

    fn fit_exponential(&self, samples: &[f64]) -> FittedDistribution {
        let mean: f64 = samples.iter().sum::<f64>() / samples.len() as f64;
        if !mean.is_finite() || mean <= 0.0 {
            return FittedDistribution::Insufficient;
        }
        FittedDistribution::Exponential {
            rate: 1.0 / mean,
            samples: samples.len(),
        }
    }
}

/// Gamma function via the Lanczos approximation (g = 7, 9 coefficients).
/// Accurate to ~15 significant digits over the range used here (x > 1).
fn gamma(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_571_6e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // Reflection formula keeps the approximation valid below 0.5.
        std::f64::consts::PI / ((std::f64::consts::PI * x).sin() * gamma(1.0 - x))
    } else {
        let x = x - 1.0;
        let mut acc = COEFFICIENTS[0];
        for (i, &c) in COEFFICIENTS.iter().enumerate().skip(1) {
            acc += c / (x + i as f64);
        }
        let t = x + 7.5;
        (2.0 * std::f64::consts::PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * acc
    }
}
