//! Numerically guarded building blocks shared by the model components.
//!
//! The latent values fed through the model come from an external sampler,
//! which during warm-up happily proposes extreme values. Everything here is
//! written so that such proposals produce finite (if meaningless) numbers
//! instead of overflow.

use finitediff::FiniteDiff;

/// Logistic function `1 / (1 + exp(-x))` that never overflows.
///
/// For `x >= 0` the textbook form is used; for `x < 0` it is rewritten as
/// `exp(x) / (1 + exp(x))` so the exponential only ever sees a
/// non-positive argument. NaN propagates.
pub fn stable_sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    }
    else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Stand-in for a non-finite objective value inside a difference stencil.
const NON_FINITE_FLOOR: f64 = -1e12;

/// Central-difference gradient of `f` at `x`.
///
/// Non-finite objective values are mapped to a large negative constant
/// before differencing so that one bad side of the stencil yields a large
/// but finite slope rather than NaN.
pub fn central_gradient<F>(x: &[f64], f: F) -> Vec<f64>
    where F: Fn(&[f64]) -> f64
{
    let theta: Vec<f64> = x.to_vec();
    let objective = |p: &Vec<f64>| {
        let value = f(p.as_slice());
        if value.is_finite() { value } else { NON_FINITE_FLOOR }
    };
    theta.central_diff(&objective)
}
