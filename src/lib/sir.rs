#![allow(non_snake_case)]

use serde::{Serialize, Deserialize};

/// Germany's population, the default `N`.
pub const DEFAULT_POPULATION: f64 = 83e6;

/// Day-by-day output of the SIR recursion.
///
/// Entry `t` holds the state at the end of day `t`, i.e. after the update
/// driven by `lambda_t[t]`. Values are real-valued and unclamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatentTrajectory {
    pub susceptible: Vec<f64>,
    pub infected: Vec<f64>,
    pub new_infections: Vec<f64>,
}

impl LatentTrajectory {
    fn with_capacity(n: usize) -> Self {
        Self {
            susceptible: Vec::with_capacity(n),
            infected: Vec::with_capacity(n),
            new_infections: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.new_infections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.new_infections.is_empty()
    }
}

/// Discrete-time SIR recursion.
///
/// For each day, carrying `(S, I)`:
///
/// ```text
/// new_I = λ(t) * I * S / N
/// S    <- S - new_I
/// I    <- I + new_I - μ * I
/// ```
///
/// Neither compartment is clamped to `[0, N]`: extreme draws may push them
/// outside, and clamping would make the output non-differentiable there.
pub fn sir_trajectory(
    lambda_t: &[f64], mu: f64, S_begin: f64, I_begin: f64, N: f64
) -> LatentTrajectory {
    let mut trajectory = LatentTrajectory::with_capacity(lambda_t.len());
    lambda_t.iter().fold((S_begin, I_begin), |(S, I), lambda| {
        let new_I = lambda * I * S / N;
        let S_next = S - new_I;
        let I_next = I + new_I - mu * I;
        trajectory.susceptible.push(S_next);
        trajectory.infected.push(I_next);
        trajectory.new_infections.push(new_I);
        (S_next, I_next)
    });
    trajectory
}
