//! Reporting delay: maps latent daily new infections onto expected reported
//! cases.
//!
//! The delay between infection and report is modelled as a gamma
//! distribution with mean `delay` (the latent variable) and a fixed shape,
//! discretised onto whole days. Reported cases on data day `j` are then
//!
//! ```text
//! cases[j] = sum_k w_k * new_I[diff_data_sim + j - k],  k = 0..=max_lag
//! ```
//!
//! where day 0 of the data window is day `diff_data_sim` of the simulation.
//! Keeping `max_lag <= diff_data_sim` guarantees the sum never reaches back
//! before the start of the simulation.

use statrs::distribution::{ContinuousCDF, Gamma};

/// Shape of the gamma delay profile (coefficient of variation 0.25).
pub const DELAY_KERNEL_SHAPE: f64 = 16.0;

/// Discretised delay distribution over lags `0..=max_lag` days.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayKernel {
    weights: Vec<f64>,
}

impl DelayKernel {
    /// Builds the kernel for a mean delay of `delay` days.
    ///
    /// Lag `k` receives the gamma mass of `[k - 1/2, k + 1/2]` (the lower edge
    /// clipped at zero), and the weights are renormalised over the support.
    /// A non-positive or non-finite `delay` gives an all-NaN kernel, so the
    /// resulting log-density is rejected rather than silently zero.
    pub fn new(delay: f64, max_lag: usize) -> Self {
        let n = max_lag + 1;
        let gamma = if delay.is_finite() && delay > 0.0 {
            Gamma::new(DELAY_KERNEL_SHAPE, DELAY_KERNEL_SHAPE / delay).ok()
        }
        else {
            None
        };
        let gamma = match gamma {
            Some(gamma) => gamma,
            None => return Self { weights: vec![f64::NAN; n] },
        };

        let mut weights = Vec::with_capacity(n);
        let mut cdf_below = 0.0;
        for k in 0..n {
            let cdf_above = gamma.cdf(k as f64 + 0.5);
            weights.push(cdf_above - cdf_below);
            cdf_below = cdf_above;
        }

        // All mass beyond the support: nothing gets reported inside it
        let total = cdf_below;
        if total > 0.0 {
            for w in weights.iter_mut() {
                *w /= total;
            }
        }
        Self { weights }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

/// Expected reported cases for `len_new_cases_obs` data days.
///
/// `new_I_t` is the latent series of length `len_new_I_t` (the full
/// simulation); `diff_data_sim` is the simulation day on which the data
/// window starts and also bounds the kernel's support. Indices past the end
/// of the latent series contribute nothing.
#[allow(non_snake_case)]
pub fn delay_cases(
    new_I_t: &[f64],
    len_new_I_t: usize,
    len_new_cases_obs: usize,
    delay: f64,
    diff_data_sim: usize,
) -> Vec<f64> {
    let kernel = DelayKernel::new(delay, diff_data_sim);
    convolve(new_I_t, len_new_I_t, len_new_cases_obs, &kernel, diff_data_sim)
}

/// Applies an already built kernel; see [`delay_cases`].
#[allow(non_snake_case)]
pub fn convolve(
    new_I_t: &[f64],
    len_new_I_t: usize,
    len_new_cases_obs: usize,
    kernel: &DelayKernel,
    diff_data_sim: usize,
) -> Vec<f64> {
    let len_new_I_t = len_new_I_t.min(new_I_t.len());
    (0..len_new_cases_obs).map(|j| {
        let t_report = diff_data_sim + j;
        kernel.weights().iter().enumerate()
            .filter(|(k, _)| *k <= t_report && t_report - *k < len_new_I_t)
            .map(|(k, w)| w * new_I_t[t_report - k])
            .sum()
    }).collect()
}
