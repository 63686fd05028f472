//! Assembly of the SIR model with change points.
//!
//! Construction runs in a fixed sequence of phases and stops at the first
//! failure, so a caller either gets a complete graph or an error:
//!
//! 1. merge the prior overrides and resolve every change point;
//! 2. check that the simulation horizon leaves room for the delay and covers the data;
//! 3. declare the free variables;
//! 4. check that the change points are in temporal order;
//! 5. to 7. add the λ(t), SIR and delayed-cases nodes;
//! 8. attach the Student-t likelihood of the observed cases.
//!
//! The exposed outputs are `lambda_t` and `new_cases`.

#![allow(non_snake_case)]

use crate::dist::Prior;
use crate::errors::*;
use crate::graph::{ChangePointVars, Deterministic, ModelBuilder, ModelGraph};
use crate::priors::{ChangePointPriors, ChangePointSpec, PriorConfig, merge_with_defaults};
use crate::sir::DEFAULT_POPULATION;

use chrono::NaiveDate;
use indexmap::IndexMap;
use log::info;
use serde::{Serialize, Deserialize};

/// Calendar anchor and length of the simulation.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationHorizon {
    pub date_begin_simulation: NaiveDate,
    /// Total number of simulated days.
    pub num_days_sim: usize,
    /// Simulation day on which the observed data begins.
    pub diff_data_sim: usize,
}

impl SimulationHorizon {
    /// Checks that the lead time covers the delay prior and that the
    /// simulation runs at least to the end of `len_data` observed days.
    pub fn validate(&self, len_data: usize, priors: &PriorConfig) -> Result<()> {
        let required = priors.required_lead_time();
        if (self.diff_data_sim as f64) < required {
            return Err(Error::InsufficientLeadTime { diff_data_sim: self.diff_data_sim, required });
        }
        let required = len_data + self.diff_data_sim;
        if self.num_days_sim < required {
            return Err(Error::HorizonTooShort { num_days_sim: self.num_days_sim, required });
        }
        Ok(())
    }

    /// Days from the simulation start to `date`; negative before it.
    pub fn day_of(&self, date: NaiveDate) -> f64 {
        (date - self.date_begin_simulation).num_days() as f64
    }
}

/// Fails unless the transition dates are non-decreasing in list order.
pub fn check_temporal_order(change_points: &[ChangePointPriors]) -> Result<()> {
    for (index, pair) in change_points.windows(2).enumerate() {
        let (before, after) = (pair[0].mean_date_begin_transient, pair[1].mean_date_begin_transient);
        if before > after {
            return Err(Error::ChangePointOrdering { index: index + 1, date: after, previous: before });
        }
    }
    Ok(())
}

/// Collects the inputs of one model build.
#[derive(Debug, Clone)]
pub struct ModelAssembler {
    new_cases_obs: Vec<f64>,
    change_points: Vec<ChangePointSpec>,
    horizon: SimulationHorizon,
    priors: IndexMap<String, f64>,
    population: f64,
}

impl ModelAssembler {
    pub fn new(new_cases_obs: Vec<f64>, horizon: SimulationHorizon) -> Self {
        Self {
            new_cases_obs,
            change_points: Vec::new(),
            horizon,
            priors: IndexMap::new(),
            population: DEFAULT_POPULATION,
        }
    }

    pub fn change_points(mut self, change_points: Vec<ChangePointSpec>) -> Self {
        self.change_points = change_points;
        self
    }

    /// Overrides for the top-level priors, by option name.
    pub fn priors(mut self, priors: IndexMap<String, f64>) -> Self {
        self.priors = priors;
        self
    }

    pub fn population(mut self, population: f64) -> Self {
        self.population = population;
        self
    }

    pub fn assemble(&self) -> Result<ModelGraph> {
        let horizon = &self.horizon;

        let priors = merge_with_defaults(&self.priors, &PriorConfig::default())?;
        let change_points: Vec<ChangePointPriors> = self.change_points.iter()
            .map(|cp| cp.resolve())
            .collect::<Result<_>>()?;

        horizon.validate(self.new_cases_obs.len(), &priors)?;

        info!(
            "assembling SIR model: {} days from {}, data from day {} ({} days), {} change points",
            horizon.num_days_sim, horizon.date_begin_simulation, horizon.diff_data_sim,
            self.new_cases_obs.len(), change_points.len()
        );

        let mut builder = ModelBuilder::new();

        // True cases at the start of the simulation are unknown
        let I_begin = builder.add_free("I_begin", Prior::HalfCauchy { beta: priors.beta_I_begin })?;

        let lambda_0 = builder.add_free(
            "lambda_0", Prior::log_normal_from_median(priors.median_lambda_0, priors.sigma_lambda_0)
        )?;
        let mut rates = Vec::with_capacity(change_points.len());
        for (i, cp) in change_points.iter().enumerate() {
            rates.push(builder.add_free(
                &format!("lambda_{}", i + 1),
                Prior::log_normal_from_median(cp.median_lambda, cp.sigma_lambda),
            )?);
        }

        let mut transient_begins = Vec::with_capacity(change_points.len());
        for (i, cp) in change_points.iter().enumerate() {
            transient_begins.push(builder.add_free(
                &format!("transient_begin_{}", i),
                Prior::Normal {
                    mu: horizon.day_of(cp.mean_date_begin_transient),
                    sigma: cp.sigma_date_begin_transient,
                },
            )?);
        }

        let mut transient_lens = Vec::with_capacity(change_points.len());
        for (i, cp) in change_points.iter().enumerate() {
            transient_lens.push(builder.add_free(
                &format!("transient_len_{}", i),
                Prior::log_normal_from_median(cp.median_transient_len, cp.sigma_transient_len),
            )?);
        }

        let mu = builder.add_free("mu", Prior::log_normal_from_median(priors.median_mu, priors.sigma_mu))?;

        // Days between infection and being reported
        let delay = builder.add_free(
            "delay", Prior::log_normal_from_median(priors.median_delay, priors.sigma_delay)
        )?;

        let sigma_obs = builder.add_free("sigma_obs", Prior::HalfCauchy { beta: priors.beta_sigma_obs })?;

        check_temporal_order(&change_points)?;

        let change_point_vars = transient_begins.iter().zip(&transient_lens).zip(&rates)
            .map(|((transient_begin, transient_len), rate)| ChangePointVars {
                transient_begin: *transient_begin,
                transient_len: *transient_len,
                rate: *rate,
            })
            .collect();
        let lambda_t = builder.add_deterministic("lambda_t", Deterministic::TimeVaryingRate {
            baseline: lambda_0,
            change_points: change_point_vars,
            t_total: horizon.num_days_sim,
        })?;

        let sir = builder.add_intermediate("sir", Deterministic::Sir {
            lambda_t,
            mu,
            I_begin,
            population: self.population,
        })?;

        let new_cases = builder.add_deterministic("new_cases", Deterministic::DelayedCases {
            sir,
            delay,
            len_new_I_t: horizon.num_days_sim,
            len_new_cases_obs: horizon.num_days_sim - horizon.diff_data_sim,
            diff_data_sim: horizon.diff_data_sim,
        })?;

        builder.set_likelihood("obs", new_cases, sigma_obs, self.new_cases_obs.clone())?;

        let graph = builder.finish();
        info!(
            "model assembled: {} free variables, outputs {:?}",
            graph.n_free(), graph.named_outputs()
        );
        Ok(graph)
    }
}

/// Builds the model in one call; `priors` holds optional overrides by option name.
pub fn sir_model_with_change_points(
    new_cases_obs: &[f64],
    change_points: &[ChangePointSpec],
    date_begin_simulation: NaiveDate,
    num_days_sim: usize,
    diff_data_sim: usize,
    priors: Option<&IndexMap<String, f64>>,
) -> Result<ModelGraph> {
    let horizon = SimulationHorizon { date_begin_simulation, num_days_sim, diff_data_sim };
    ModelAssembler::new(new_cases_obs.to_vec(), horizon)
        .change_points(change_points.to_vec())
        .priors(priors.cloned().unwrap_or_default())
        .assemble()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, day).unwrap()
    }

    fn horizon() -> SimulationHorizon {
        SimulationHorizon { date_begin_simulation: date(1), num_days_sim: 60, diff_data_sim: 16 }
    }

    #[test]
    fn test_horizon_lead_time() {
        let h = SimulationHorizon { diff_data_sim: 0, ..horizon() };
        assert_eq!(
            h.validate(10, &PriorConfig::default()),
            Err(Error::InsufficientLeadTime { diff_data_sim: 0, required: 8.0 + 3.0 * 8.0 * 0.2 })
        );
        let h = SimulationHorizon { diff_data_sim: 13, num_days_sim: 100, ..horizon() };
        assert_eq!(h.validate(10, &PriorConfig::default()), Ok(()));
    }

    #[test]
    fn test_horizon_covers_data() {
        assert_eq!(
            horizon().validate(45, &PriorConfig::default()),
            Err(Error::HorizonTooShort { num_days_sim: 60, required: 61 })
        );
        assert_eq!(horizon().validate(44, &PriorConfig::default()), Ok(()));
    }

    #[test]
    fn test_day_of() {
        assert_eq!(horizon().day_of(date(21)), 20.0);
        assert_eq!(horizon().day_of(NaiveDate::from_ymd_opt(2020, 2, 28).unwrap()), -2.0);
    }

    #[test]
    fn test_temporal_order() {
        let ordered: Vec<ChangePointPriors> = vec![date(10), date(10), date(20)].into_iter()
            .map(|d| ChangePointSpec::new(d).resolve().unwrap())
            .collect();
        assert_eq!(check_temporal_order(&ordered), Ok(()));

        let unordered: Vec<ChangePointPriors> = vec![date(21), date(11)].into_iter()
            .map(|d| ChangePointSpec::new(d).resolve().unwrap())
            .collect();
        assert_eq!(
            check_temporal_order(&unordered),
            Err(Error::ChangePointOrdering { index: 1, date: date(11), previous: date(21) })
        );
    }

    #[test]
    fn test_variable_order_follows_declaration() {
        let graph = ModelAssembler::new(vec![5.0; 30], horizon())
            .change_points(vec![ChangePointSpec::new(date(15)), ChangePointSpec::new(date(25))])
            .assemble()
            .unwrap();
        let names: Vec<&str> = graph.free_variables().map(|(name, _)| name).collect();
        assert_eq!(names, vec![
            "I_begin", "lambda_0", "lambda_1", "lambda_2",
            "transient_begin_0", "transient_begin_1",
            "transient_len_0", "transient_len_1",
            "mu", "delay", "sigma_obs",
        ]);
        let (_, prior) = graph.free_variables().nth(4).unwrap();
        assert_eq!(*prior, Prior::Normal { mu: 14.0, sigma: 3.0 });
    }

    #[test]
    fn test_population_is_passed_to_recursion() {
        let graph = ModelAssembler::new(vec![5.0; 30], horizon())
            .population(1e5)
            .assemble()
            .unwrap();
        let sir = graph.deterministics().find(|n| n.name == "sir").unwrap();
        match sir.op {
            Deterministic::Sir { population, .. } => assert_eq!(population, 1e5),
            _ => panic!("sir node has the wrong operation"),
        }
    }
}
