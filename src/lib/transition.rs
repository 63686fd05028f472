use crate::numeric::stable_sigmoid;

/// Steepness of the logistic curve relative to the window width.
///
/// With `8 / (t_end - t_begin)` the curve is at 1.8% of the way at `t_begin`
/// and 98.2% at `t_end`.
pub const TRANSITION_STEEPNESS: f64 = 8.0;

/// Narrowest window the steepness is computed from, in days.
pub const MIN_TRANSITION_WIDTH: f64 = 1e-3;

/// Value of the smooth step from `level_begin` to `level_end` at time `t`.
///
/// `t_begin` and `t_end` are continuous; they may lie anywhere, including
/// outside the simulated range, in which case the curve just saturates.
pub fn smooth_transition_at(
    level_begin: f64, level_end: f64, t_begin: f64, t_end: f64, t: f64
) -> f64 {
    let width = (t_end - t_begin).max(MIN_TRANSITION_WIDTH);
    let midpoint = 0.5 * (t_begin + t_end);
    let weight = stable_sigmoid(TRANSITION_STEEPNESS / width * (t - midpoint));
    level_begin + (level_end - level_begin) * weight
}

/// The smooth step evaluated on days `0..t_total`.
pub fn smooth_transition(
    level_begin: f64, level_end: f64, t_begin: f64, t_end: f64, t_total: usize
) -> Vec<f64> {
    (0..t_total).map(|t| {
        smooth_transition_at(level_begin, level_end, t_begin, t_end, t as f64)
    }).collect()
}
