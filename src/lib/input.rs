use crate::errors::*;
use crate::graph::ModelGraph;
use crate::model::{ModelAssembler, SimulationHorizon};
use crate::priors::ChangePointSpec;
use crate::sir::DEFAULT_POPULATION;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Serialize, Deserialize};
use serde_json::Value;

/// The JSON document both binaries read.
///
/// Priors and change points stay in their mapping form here so that
/// unrecognised option names surface as `Error::UnknownOption` rather than
/// as a generic JSON error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInput {
    pub new_cases_obs: Vec<f64>,
    #[serde(default)]
    pub change_points: Vec<IndexMap<String, Value>>,
    pub date_begin_simulation: NaiveDate,
    pub num_days_sim: usize,
    pub diff_data_sim: usize,
    #[serde(default)]
    pub priors: IndexMap<String, f64>,
    pub population: Option<f64>,
}

impl ModelInput {
    pub fn from_json(json_data: &str) -> Result<Self> {
        Ok(serde_json::from_str(json_data)?)
    }

    pub fn assembler(&self) -> Result<ModelAssembler> {
        let change_points = self.change_points.iter()
            .map(ChangePointSpec::from_options)
            .collect::<Result<Vec<_>>>()?;
        let horizon = SimulationHorizon {
            date_begin_simulation: self.date_begin_simulation,
            num_days_sim: self.num_days_sim,
            diff_data_sim: self.diff_data_sim,
        };
        Ok(
            ModelAssembler::new(self.new_cases_obs.clone(), horizon)
                .change_points(change_points)
                .priors(self.priors.clone())
                .population(self.population.unwrap_or(DEFAULT_POPULATION))
        )
    }

    pub fn assemble(&self) -> Result<ModelGraph> {
        self.assembler()?.assemble()
    }
}

/// Settings of a prior-predictive run, alongside the model input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(flatten)]
    pub model: ModelInput,
    pub rng_seed: Option<u64>,
    #[serde(default = "default_n_draws")]
    pub n_draws: usize,
    pub output_path: Option<String>,
    pub write_to_stdout: Option<bool>,
}

fn default_n_draws() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const INPUT: &str = indoc!(r#"
        {
            "new_cases_obs": [3, 5, 8, 13, 21],
            "change_points": [
                {"prior_mean_date_begin_transient": "2020-03-09", "prior_median_lambda": 0.2}
            ],
            "date_begin_simulation": "2020-02-20",
            "num_days_sim": 40,
            "diff_data_sim": 16,
            "priors": {"prior_median_mu": 0.1}
        }
    "#);

    #[test]
    fn test_parse_and_assemble() {
        let input = ModelInput::from_json(INPUT).unwrap();
        assert_eq!(input.new_cases_obs, vec![3.0, 5.0, 8.0, 13.0, 21.0]);
        let graph = input.assemble().unwrap();
        assert_eq!(graph.n_free(), 8);
        assert_eq!(graph.likelihood().unwrap().observed.len(), 5);
    }

    #[test]
    fn test_unknown_change_point_option() {
        let json_data = INPUT.replace("prior_median_lambda\"", "prior_median_rate\"");
        let input = ModelInput::from_json(&json_data).unwrap();
        assert_eq!(input.assemble().unwrap_err(), Error::UnknownOption("prior_median_rate".into()));
    }

    #[test]
    fn test_simulation_config_defaults() {
        let config: SimulationConfig = serde_json::from_str(INPUT).unwrap();
        assert_eq!(config.n_draws, 100);
        assert_eq!(config.rng_seed, None);
        assert_eq!(config.model.num_days_sim, 40);
    }
}
