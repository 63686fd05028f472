use rand::Rng;
use rand_distr::Distribution as _;
use serde::{Serialize, Deserialize};
use statrs::distribution::{Cauchy, Continuous, LogNormal, Normal, StudentsT};

/// Prior distribution attached to a free variable.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "distribution")]
pub enum Prior {
    /// Half-Cauchy on `[0, inf)` with scale `beta`.
    HalfCauchy { beta: f64 },
    /// Log-normal with log-scale location `mu` and spread `sigma`.
    LogNormal { mu: f64, sigma: f64 },
    Normal { mu: f64, sigma: f64 },
}

impl Prior {
    /// Log-normal parameterised by its median, as the configuration is.
    pub fn log_normal_from_median(median: f64, sigma: f64) -> Self {
        Prior::LogNormal { mu: median.ln(), sigma }
    }

    /// Log density at `x`; `-inf` outside the support or for invalid
    /// parameters.
    pub fn ln_pdf(&self, x: f64) -> f64 {
        if !x.is_finite() || !self.has_valid_scale() {
            return f64::NEG_INFINITY;
        }
        let ln_pdf = match *self {
            Prior::HalfCauchy { beta } => {
                if x < 0.0 {
                    return f64::NEG_INFINITY;
                }
                Cauchy::new(0.0, beta).map(|d| std::f64::consts::LN_2 + d.ln_pdf(x)).ok()
            },
            Prior::LogNormal { mu, sigma } => {
                if x <= 0.0 {
                    return f64::NEG_INFINITY;
                }
                LogNormal::new(mu, sigma).map(|d| d.ln_pdf(x)).ok()
            },
            Prior::Normal { mu, sigma } => {
                Normal::new(mu, sigma).map(|d| d.ln_pdf(x)).ok()
            },
        };
        ln_pdf.unwrap_or(f64::NEG_INFINITY)
    }

    /// Whether the scale parameter is usable; `ln_pdf` and `sample` share
    /// this support.
    pub fn has_valid_scale(&self) -> bool {
        let scale = match *self {
            Prior::HalfCauchy { beta } => beta,
            Prior::LogNormal { sigma, .. } | Prior::Normal { sigma, .. } => sigma,
        };
        scale.is_finite() && scale > 0.0
    }

    /// Draws one value; NaN for invalid parameters.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if !self.has_valid_scale() {
            return f64::NAN;
        }
        match *self {
            Prior::HalfCauchy { beta } => {
                rand_distr::Cauchy::new(0.0, beta)
                    .map(|d| d.sample(rng).abs())
                    .unwrap_or(f64::NAN)
            },
            Prior::LogNormal { mu, sigma } => {
                rand_distr::LogNormal::new(mu, sigma)
                    .map(|d| d.sample(rng))
                    .unwrap_or(f64::NAN)
            },
            Prior::Normal { mu, sigma } => {
                rand_distr::Normal::new(mu, sigma)
                    .map(|d| d.sample(rng))
                    .unwrap_or(f64::NAN)
            },
        }
    }

    /// Family name as Stan spells it.
    pub fn family(&self) -> &'static str {
        match self {
            Prior::HalfCauchy { .. } => "cauchy",
            Prior::LogNormal { .. } => "lognormal",
            Prior::Normal { .. } => "normal",
        }
    }
}

/// Degrees of freedom of the observation likelihood.
pub const OBSERVATION_NU: f64 = 4.0;

/// Per-day noise scale of the observation likelihood.
///
/// Grows like the square root of the expected count, approximating
/// over-dispersed count noise.
pub fn observation_scale(expected: f64, sigma_obs: f64) -> f64 {
    (expected + 1.0).abs().sqrt() * sigma_obs
}

/// Student-t log density of `observed` around `expected`.
pub fn student_t_ln_pdf(observed: f64, expected: f64, sigma_obs: f64) -> f64 {
    StudentsT::new(expected, observation_scale(expected, sigma_obs), OBSERVATION_NU)
        .map(|d| d.ln_pdf(observed))
        .unwrap_or(f64::NEG_INFINITY)
}

/// Draws an observation around `expected`; NaN for an invalid scale.
pub fn student_t_sample<R: Rng + ?Sized>(expected: f64, sigma_obs: f64, rng: &mut R) -> f64 {
    let scale = observation_scale(expected, sigma_obs);
    match rand_distr::StudentT::new(OBSERVATION_NU) {
        Ok(d) if scale.is_finite() && scale > 0.0 => expected + scale * d.sample(rng),
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand_xoshiro::rand_core::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_half_cauchy_support() {
        let prior = Prior::HalfCauchy { beta: 10.0 };
        assert_eq!(prior.ln_pdf(-1.0), f64::NEG_INFINITY);
        // density at 0 is 2 / (pi * beta)
        assert_abs_diff_eq!(prior.ln_pdf(0.0), (2.0 / (std::f64::consts::PI * 10.0)).ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_log_normal_from_median() {
        let prior = Prior::log_normal_from_median(8.0, 0.2);
        assert_eq!(prior, Prior::LogNormal { mu: 8.0f64.ln(), sigma: 0.2 });
        assert_eq!(prior.ln_pdf(0.0), f64::NEG_INFINITY);
        assert!(prior.ln_pdf(8.0) > prior.ln_pdf(12.0));
    }

    #[test]
    fn test_invalid_parameters() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        for prior in &[
            Prior::Normal { mu: 0.0, sigma: -1.0 },
            Prior::LogNormal { mu: 0.0, sigma: -0.2 },
            Prior::LogNormal { mu: 0.0, sigma: f64::NAN },
            Prior::HalfCauchy { beta: 0.0 },
        ] {
            assert!(!prior.has_valid_scale());
            assert_eq!(prior.ln_pdf(1.0), f64::NEG_INFINITY);
            assert!(prior.sample(&mut rng).is_nan());
        }
        assert!(Prior::log_normal_from_median(8.0, 0.2).has_valid_scale());
    }

    #[test]
    fn test_samples_respect_support() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let half_cauchy = Prior::HalfCauchy { beta: 100.0 };
        let log_normal = Prior::log_normal_from_median(0.4, 0.5);
        for _ in 0..1000 {
            assert!(half_cauchy.sample(&mut rng) >= 0.0);
            assert!(log_normal.sample(&mut rng) > 0.0);
        }
    }

    #[test]
    fn test_student_t_scale_grows_with_count() {
        assert_abs_diff_eq!(observation_scale(99.0, 2.0), 20.0, epsilon = 1e-12);
        // same absolute residual is less surprising for a larger expected count
        assert!(student_t_ln_pdf(1100.0, 1000.0, 1.0) > student_t_ln_pdf(110.0, 10.0, 1.0));
        assert_eq!(student_t_ln_pdf(1.0, 1.0, 0.0), f64::NEG_INFINITY);
    }
}
