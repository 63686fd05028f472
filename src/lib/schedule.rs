use crate::transition::smooth_transition_at;
use serde::{Serialize, Deserialize};

/// Latent values describing one change point.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePoint {
    /// Day (relative to the simulation start) the transition begins.
    pub transient_begin: f64,
    /// Length of the transition in days.
    pub transient_len: f64,
    /// Rate reached after the transition.
    pub rate: f64,
}

/// Builds the time-varying transmission rate λ(t) on days `0..t_total`.
///
/// Each change point contributes `step_i(t) * (rate_i - rate_{i-1})`, where
/// `step_i` is a smooth 0-to-1 transition over
/// `[transient_begin, transient_begin + transient_len]` and `rate_{-1}` is
/// the baseline. The increments telescope, so on a plateau after change
/// point `i` the sum is exactly `rate_i`, however many transitions precede
/// it. The sum does not depend on the order the change points are given in.
pub fn time_varying_rate(baseline: f64, change_points: &[ChangePoint], t_total: usize) -> Vec<f64> {
    let mut lambda_t = vec![baseline; t_total];
    let mut rate_before = baseline;
    for cp in change_points {
        let step = cp.rate - rate_before;
        let t_begin = cp.transient_begin;
        let t_end = cp.transient_begin + cp.transient_len;
        for (t, lambda) in lambda_t.iter_mut().enumerate() {
            *lambda += step * smooth_transition_at(0.0, 1.0, t_begin, t_end, t as f64);
        }
        rate_before = cp.rate;
    }
    lambda_t
}
