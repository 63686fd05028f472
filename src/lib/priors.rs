//! Prior configuration: the recognised option names, their defaults, and the
//! pure merge from a caller-supplied mapping into typed structures.

#![allow(non_snake_case)]

use crate::errors::*;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Serialize, Deserialize};
use serde_json::Value;

/// Recognised top-level option names, each with its accepted aliases.
const PRIOR_OPTIONS: &[(&str, &[&str])] = &[
    ("prior_beta_I_begin", &[]),
    ("prior_median_lambda_0", &["prior_median_λ_0"]),
    ("prior_sigma_lambda_0", &["prior_sigma_λ_0"]),
    ("prior_median_mu", &["prior_median_μ"]),
    ("prior_sigma_mu", &["prior_sigma_μ"]),
    ("prior_median_delay", &[]),
    ("prior_sigma_delay", &[]),
    ("prior_beta_sigma_obs", &["prior_beta_σ_obs"]),
];

/// Recognised change-point option names, each with its accepted aliases.
const CHANGE_POINT_OPTIONS: &[(&str, &[&str])] = &[
    ("prior_mean_date_begin_transient", &[]),
    ("prior_median_lambda", &["prior_median_λ"]),
    ("prior_sigma_lambda", &["prior_sigma_λ"]),
    ("prior_sigma_date_begin_transient", &[]),
    ("prior_median_transient_len", &[]),
    ("prior_sigma_transient_len", &[]),
];

fn canonical_name(options: &[(&'static str, &[&str])], key: &str) -> Result<&'static str> {
    options.iter()
        .find(|(name, aliases)| *name == key || aliases.contains(&key))
        .map(|(name, _)| *name)
        .ok_or_else(|| Error::UnknownOption(key.into()))
}

/// Resolves every supplied key to its canonical name, rejecting unknown keys
/// before anything is merged.
fn canonicalize<V: Clone>(
    options: &[(&'static str, &[&str])], supplied: &IndexMap<String, V>
) -> Result<IndexMap<&'static str, V>> {
    let mut resolved = IndexMap::new();
    for (key, value) in supplied {
        resolved.insert(canonical_name(options, key)?, value.clone());
    }
    Ok(resolved)
}

/// Every prior parameter is a median, a spread or a scale, so it must be a
/// finite positive number.
fn check_positive(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    }
    else {
        Err(Error::InvalidOptionValue {
            name: name.into(),
            reason: format!("expected a finite positive number, found {}", value),
        })
    }
}

/// Top-level priors of the change-point SIR model.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorConfig {
    /// Scale of the half-Cauchy prior on the initial number of infected.
    pub beta_I_begin: f64,
    /// Median of the log-normal prior on the baseline transmission rate.
    pub median_lambda_0: f64,
    pub sigma_lambda_0: f64,
    /// Median of the log-normal prior on the recovery rate.
    pub median_mu: f64,
    pub sigma_mu: f64,
    /// Median of the log-normal prior on the reporting delay, in days.
    pub median_delay: f64,
    pub sigma_delay: f64,
    /// Scale of the half-Cauchy prior on the observation noise.
    pub beta_sigma_obs: f64,
}

impl Default for PriorConfig {
    fn default() -> Self {
        Self {
            beta_I_begin: 100.0,
            median_lambda_0: 0.4,
            sigma_lambda_0: 0.5,
            median_mu: 1.0 / 8.0,
            sigma_mu: 0.2,
            median_delay: 8.0,
            sigma_delay: 0.2,
            beta_sigma_obs: 10.0,
        }
    }
}

impl PriorConfig {
    /// Minimum lead time between the simulation start and the data start:
    /// the delay median plus three (approximate) standard deviations.
    pub fn required_lead_time(&self) -> f64 {
        self.median_delay + 3.0 * self.median_delay * self.sigma_delay
    }
}

/// Merges caller-supplied overrides into a fresh `PriorConfig`.
///
/// Unknown keys fail with `Error::UnknownOption` and values that are not
/// finite and positive with `Error::InvalidOptionValue`; the input is not
/// touched.
pub fn merge_with_defaults(supplied: &IndexMap<String, f64>, defaults: &PriorConfig) -> Result<PriorConfig> {
    let supplied = canonicalize(PRIOR_OPTIONS, supplied)?;
    let get = |name: &str, default: f64| {
        check_positive(name, supplied.get(name).copied().unwrap_or(default))
    };
    Ok(PriorConfig {
        beta_I_begin: get("prior_beta_I_begin", defaults.beta_I_begin)?,
        median_lambda_0: get("prior_median_lambda_0", defaults.median_lambda_0)?,
        sigma_lambda_0: get("prior_sigma_lambda_0", defaults.sigma_lambda_0)?,
        median_mu: get("prior_median_mu", defaults.median_mu)?,
        sigma_mu: get("prior_sigma_mu", defaults.sigma_mu)?,
        median_delay: get("prior_median_delay", defaults.median_delay)?,
        sigma_delay: get("prior_sigma_delay", defaults.sigma_delay)?,
        beta_sigma_obs: get("prior_beta_sigma_obs", defaults.beta_sigma_obs)?,
    })
}

/// One change point as supplied by the caller. Only the date is required;
/// every `None` falls back to the documented default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePointSpec {
    /// Prior mean of the day the transition begins.
    pub mean_date_begin_transient: NaiveDate,
    /// Median of the log-normal prior on the rate after this change point (0.4).
    pub median_lambda: Option<f64>,
    /// Log-scale spread of that prior (0.5).
    pub sigma_lambda: Option<f64>,
    /// Standard deviation, in days, of the normal prior on the begin date (3).
    pub sigma_date_begin_transient: Option<f64>,
    /// Median of the log-normal prior on the transition length, in days (3).
    pub median_transient_len: Option<f64>,
    /// Log-scale spread of that prior (0.3).
    pub sigma_transient_len: Option<f64>,
}

/// A change point with every prior parameter filled in.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePointPriors {
    pub mean_date_begin_transient: NaiveDate,
    pub median_lambda: f64,
    pub sigma_lambda: f64,
    pub sigma_date_begin_transient: f64,
    pub median_transient_len: f64,
    pub sigma_transient_len: f64,
}

impl ChangePointSpec {
    pub fn new(mean_date_begin_transient: NaiveDate) -> Self {
        Self {
            mean_date_begin_transient,
            median_lambda: None,
            sigma_lambda: None,
            sigma_date_begin_transient: None,
            median_transient_len: None,
            sigma_transient_len: None,
        }
    }

    /// Parses a change point from its mapping form, e.g. a JSON object
    /// `{"prior_mean_date_begin_transient": "2020-03-09", "prior_median_lambda": 0.2}`.
    pub fn from_options(options: &IndexMap<String, Value>) -> Result<Self> {
        let options = canonicalize(CHANGE_POINT_OPTIONS, options)?;

        let date_value = options.get("prior_mean_date_begin_transient").ok_or_else(
            || Error::MissingOption("prior_mean_date_begin_transient".into())
        )?;
        let mean_date_begin_transient = date_value.as_str()
            .and_then(|s| s.parse::<NaiveDate>().ok())
            .ok_or_else(|| Error::InvalidOptionValue {
                name: "prior_mean_date_begin_transient".into(),
                reason: format!("expected an ISO date, found {}", date_value),
            })?;

        let number = |name: &str| -> Result<Option<f64>> {
            match options.get(name) {
                None => Ok(None),
                Some(value) => value.as_f64().map(Some).ok_or_else(|| Error::InvalidOptionValue {
                    name: name.into(),
                    reason: format!("expected a number, found {}", value),
                }),
            }
        };

        Ok(Self {
            mean_date_begin_transient,
            median_lambda: number("prior_median_lambda")?,
            sigma_lambda: number("prior_sigma_lambda")?,
            sigma_date_begin_transient: number("prior_sigma_date_begin_transient")?,
            median_transient_len: number("prior_median_transient_len")?,
            sigma_transient_len: number("prior_sigma_transient_len")?,
        })
    }

    /// Fills unset fields and checks every value is finite and positive.
    /// The rate defaults are the fixed baseline defaults, not whatever the
    /// caller chose for the baseline.
    pub fn resolve(&self) -> Result<ChangePointPriors> {
        let defaults = PriorConfig::default();
        let get = |name: &str, value: Option<f64>, default: f64| {
            check_positive(name, value.unwrap_or(default))
        };
        Ok(ChangePointPriors {
            mean_date_begin_transient: self.mean_date_begin_transient,
            median_lambda: get("prior_median_lambda", self.median_lambda, defaults.median_lambda_0)?,
            sigma_lambda: get("prior_sigma_lambda", self.sigma_lambda, defaults.sigma_lambda_0)?,
            sigma_date_begin_transient: get(
                "prior_sigma_date_begin_transient", self.sigma_date_begin_transient, 3.0
            )?,
            median_transient_len: get("prior_median_transient_len", self.median_transient_len, 3.0)?,
            sigma_transient_len: get("prior_sigma_transient_len", self.sigma_transient_len, 0.3)?,
        })
    }
}
