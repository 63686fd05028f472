//! The assembled model: named free variables with priors, deterministic
//! nodes computed from them, and one observation likelihood.
//!
//! There is no ambient model context. A `ModelBuilder` owns the graph while
//! it is being built and every variable is added through an explicit call;
//! `finish()` hands the graph over. Nodes can only reference variables and
//! nodes declared before them, so insertion order is an evaluation order.
//!
//! A point in parameter space is a slice of values in the order the free
//! variables were declared. The graph is immutable once built; evaluating
//! it never changes it, so one graph can serve any number of evaluations.

#![allow(non_snake_case)]

use crate::delay::delay_cases;
use crate::dist::{Prior, OBSERVATION_NU, student_t_ln_pdf, student_t_sample};
use crate::errors::*;
use crate::numeric::central_gradient;
use crate::schedule::{ChangePoint, time_varying_rate};
use crate::sir::{LatentTrajectory, sir_trajectory};

use indexmap::IndexMap;
use log::debug;
use rand::Rng;
use serde::{Serialize, Deserialize};

/// Handle to a free (latent) variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarId(usize);

/// Handle to a deterministic node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

/// The latent variables behind one change point.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePointVars {
    pub transient_begin: VarId,
    pub transient_len: VarId,
    pub rate: VarId,
}

/// Operations a deterministic node can perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Deterministic {
    /// λ(t) from a baseline rate and change points.
    TimeVaryingRate {
        baseline: VarId,
        change_points: Vec<ChangePointVars>,
        t_total: usize,
    },
    /// SIR recursion driven by a `TimeVaryingRate` node; `S_begin = N - I_begin`.
    Sir {
        lambda_t: NodeId,
        mu: VarId,
        I_begin: VarId,
        population: f64,
    },
    /// Delay convolution of the new infections of a `Sir` node.
    DelayedCases {
        sir: NodeId,
        delay: VarId,
        len_new_I_t: usize,
        len_new_cases_obs: usize,
        diff_data_sim: usize,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Series,
    Trajectory,
}

impl Deterministic {
    fn output_kind(&self) -> NodeKind {
        match self {
            Deterministic::Sir { .. } => NodeKind::Trajectory,
            _ => NodeKind::Series,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeterministicNode {
    pub name: String,
    pub op: Deterministic,
    /// Listed among the model's named outputs.
    pub exposed: bool,
    pub len: usize,
}

/// Student-t likelihood of observed counts around a series node.
///
/// Only the first `observed.len()` entries of the expected series take part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Likelihood {
    pub name: String,
    pub expected: NodeId,
    pub sigma_obs: VarId,
    pub observed: Vec<f64>,
}

/// Result of evaluating a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeValue {
    Series(Vec<f64>),
    Trajectory(LatentTrajectory),
}

impl NodeValue {
    fn as_series(&self) -> &[f64] {
        match self {
            NodeValue::Series(values) => values,
            NodeValue::Trajectory(trajectory) => &trajectory.new_infections,
        }
    }

    fn as_trajectory(&self) -> Option<&LatentTrajectory> {
        match self {
            NodeValue::Trajectory(trajectory) => Some(trajectory),
            NodeValue::Series(_) => None,
        }
    }
}

/// Values of every deterministic node at one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    values: IndexMap<String, NodeValue>,
}

impl Trace {
    /// A series node by name. For a trajectory node this is its new-infection series.
    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.values.get(name).map(|v| v.as_series())
    }

    pub fn trajectory(&self, name: &str) -> Option<&LatentTrajectory> {
        self.values.get(name).and_then(|v| v.as_trajectory())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Built only through `ModelBuilder`, which checks every handle, so the graph
/// serializes but does not deserialize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelGraph {
    free: IndexMap<String, Prior>,
    nodes: IndexMap<String, DeterministicNode>,
    likelihood: Option<Likelihood>,
}

/// Owns a graph under construction.
#[derive(Debug)]
pub struct ModelBuilder {
    graph: ModelGraph,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self {
            graph: ModelGraph {
                free: IndexMap::new(),
                nodes: IndexMap::new(),
                likelihood: None,
            },
        }
    }

    fn check_name(&self, name: &str) -> Result<()> {
        let taken = self.graph.free.contains_key(name)
            || self.graph.nodes.contains_key(name)
            || self.graph.likelihood.as_ref().map_or(false, |l| l.name == name);
        if taken {
            Err(Error::DuplicateVariable(name.into()))
        }
        else {
            Ok(())
        }
    }

    fn check_var(&self, name: &str, var: VarId) -> Result<()> {
        if var.0 < self.graph.free.len() {
            Ok(())
        }
        else {
            Err(Error::InvalidNode {
                name: name.into(),
                reason: format!("free variable {} does not exist", var.0),
            })
        }
    }

    fn check_node(&self, name: &str, node: NodeId, kind: NodeKind) -> Result<usize> {
        match self.graph.nodes.get_index(node.0) {
            Some((_, n)) if n.op.output_kind() == kind => Ok(n.len),
            Some((other, _)) => Err(Error::InvalidNode {
                name: name.into(),
                reason: format!("node {} is not a {:?}", other, kind),
            }),
            None => Err(Error::InvalidNode {
                name: name.into(),
                reason: format!("node {} does not exist", node.0),
            }),
        }
    }

    /// Declares a free variable with its prior.
    pub fn add_free(&mut self, name: &str, prior: Prior) -> Result<VarId> {
        self.check_name(name)?;
        debug!("declaring {} ~ {:?}", name, prior);
        self.graph.free.insert(name.into(), prior);
        Ok(VarId(self.graph.free.len() - 1))
    }

    /// Adds a deterministic node listed among the model's named outputs.
    pub fn add_deterministic(&mut self, name: &str, op: Deterministic) -> Result<NodeId> {
        self.add_node(name, op, true)
    }

    /// Adds a deterministic node that is evaluated but not listed as an output.
    pub fn add_intermediate(&mut self, name: &str, op: Deterministic) -> Result<NodeId> {
        self.add_node(name, op, false)
    }

    fn add_node(&mut self, name: &str, op: Deterministic, exposed: bool) -> Result<NodeId> {
        self.check_name(name)?;
        let len = match &op {
            Deterministic::TimeVaryingRate { baseline, change_points, t_total } => {
                self.check_var(name, *baseline)?;
                for cp in change_points {
                    self.check_var(name, cp.transient_begin)?;
                    self.check_var(name, cp.transient_len)?;
                    self.check_var(name, cp.rate)?;
                }
                *t_total
            },
            Deterministic::Sir { lambda_t, mu, I_begin, .. } => {
                self.check_var(name, *mu)?;
                self.check_var(name, *I_begin)?;
                self.check_node(name, *lambda_t, NodeKind::Series)?
            },
            Deterministic::DelayedCases { sir, delay, len_new_cases_obs, .. } => {
                self.check_var(name, *delay)?;
                self.check_node(name, *sir, NodeKind::Trajectory)?;
                *len_new_cases_obs
            },
        };
        debug!("adding node {} of length {}", name, len);
        self.graph.nodes.insert(name.into(), DeterministicNode { name: name.into(), op, exposed, len });
        Ok(NodeId(self.graph.nodes.len() - 1))
    }

    /// Attaches the observation likelihood. The expected series must be at
    /// least as long as the observations.
    pub fn set_likelihood(
        &mut self, name: &str, expected: NodeId, sigma_obs: VarId, observed: Vec<f64>
    ) -> Result<()> {
        if self.graph.likelihood.is_some() {
            return Err(Error::DuplicateVariable(name.into()));
        }
        self.check_name(name)?;
        self.check_var(name, sigma_obs)?;
        let len = self.check_node(name, expected, NodeKind::Series)?;
        if len < observed.len() {
            return Err(Error::InvalidNode {
                name: name.into(),
                reason: format!("{} observations but the expected series has {} days", observed.len(), len),
            });
        }
        debug!("observing {} ({} days)", name, observed.len());
        self.graph.likelihood = Some(Likelihood { name: name.into(), expected, sigma_obs, observed });
        Ok(())
    }

    pub fn finish(self) -> ModelGraph {
        self.graph
    }
}

impl ModelGraph {
    pub fn n_free(&self) -> usize {
        self.free.len()
    }

    /// Free variables in declaration order.
    pub fn free_variables(&self) -> impl Iterator<Item = (&str, &Prior)> {
        self.free.iter().map(|(name, prior)| (name.as_str(), prior))
    }

    pub fn free_name(&self, var: VarId) -> &str {
        self.free.get_index(var.0).map(|(name, _)| name.as_str()).unwrap_or("")
    }

    /// Deterministic nodes in evaluation order.
    pub fn deterministics(&self) -> impl Iterator<Item = &DeterministicNode> {
        self.nodes.values()
    }

    pub fn node_name(&self, node: NodeId) -> &str {
        self.nodes.get_index(node.0).map(|(name, _)| name.as_str()).unwrap_or("")
    }

    /// Names of the nodes exposed for inspection.
    pub fn named_outputs(&self) -> Vec<&str> {
        self.nodes.values().filter(|n| n.exposed).map(|n| n.name.as_str()).collect()
    }

    pub fn likelihood(&self) -> Option<&Likelihood> {
        self.likelihood.as_ref()
    }

    /// Orders a name-to-value map as a point.
    pub fn point_from_map(&self, values: &IndexMap<String, f64>) -> Result<Vec<f64>> {
        if let Some(name) = values.keys().find(|name| !self.free.contains_key(name.as_str())) {
            return Err(Error::UnknownVariable(name.clone()));
        }
        self.free.keys().map(|name| {
            values.get(name).copied().ok_or_else(|| Error::UnknownVariable(name.clone()))
        }).collect()
    }

    fn check_point(&self, point: &[f64]) -> Result<()> {
        if point.len() == self.free.len() {
            Ok(())
        }
        else {
            Err(Error::PointDimension { expected: self.free.len(), found: point.len() })
        }
    }

    /// Computes every deterministic node at `point`.
    pub fn evaluate(&self, point: &[f64]) -> Result<Trace> {
        self.check_point(point)?;
        let mut values: Vec<NodeValue> = Vec::with_capacity(self.nodes.len());
        for node in self.nodes.values() {
            let value = evaluate_node(node, point, &values)?;
            values.push(value);
        }
        Ok(Trace {
            values: self.nodes.keys().cloned().zip(values).collect(),
        })
    }

    pub fn log_prior(&self, point: &[f64]) -> Result<f64> {
        self.check_point(point)?;
        Ok(self.free.values().zip(point).map(|(prior, x)| prior.ln_pdf(*x)).sum())
    }

    /// Log-likelihood of the observed data at an already evaluated point.
    pub fn log_likelihood_of(&self, point: &[f64], trace: &Trace) -> Result<f64> {
        self.check_point(point)?;
        let likelihood = match &self.likelihood {
            Some(likelihood) => likelihood,
            None => return Ok(0.0),
        };
        let expected = trace.series(self.node_name(likelihood.expected)).unwrap_or(&[]);
        let sigma_obs = free_value(&likelihood.name, point, likelihood.sigma_obs)?;
        Ok(likelihood.observed.iter().zip(expected).map(|(observed, expected)| {
            student_t_ln_pdf(*observed, *expected, sigma_obs)
        }).sum())
    }

    pub fn log_likelihood(&self, point: &[f64]) -> Result<f64> {
        let trace = self.evaluate(point)?;
        self.log_likelihood_of(point, &trace)
    }

    /// Unnormalised log posterior density; `-inf` whenever any term is not finite.
    pub fn log_prob(&self, point: &[f64]) -> Result<f64> {
        let log_prior = self.log_prior(point)?;
        if !log_prior.is_finite() {
            return Ok(f64::NEG_INFINITY);
        }
        let log_likelihood = self.log_likelihood(point)?;
        if log_likelihood.is_finite() {
            Ok(log_prior + log_likelihood)
        }
        else {
            Ok(f64::NEG_INFINITY)
        }
    }

    /// Gradient of `log_prob` by central differences.
    pub fn grad_log_prob(&self, point: &[f64]) -> Result<Vec<f64>> {
        self.check_point(point)?;
        Ok(central_gradient(point, |p| self.log_prob(p).unwrap_or(f64::NEG_INFINITY)))
    }

    /// Draws a point from the priors.
    pub fn sample_prior<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        self.free.values().map(|prior| prior.sample(rng)).collect()
    }

    /// Draws an observed series from the likelihood at an evaluated point.
    pub fn sample_observations<R: Rng + ?Sized>(
        &self, point: &[f64], trace: &Trace, rng: &mut R
    ) -> Option<Vec<f64>> {
        let likelihood = self.likelihood.as_ref()?;
        let expected = trace.series(self.node_name(likelihood.expected))?;
        let sigma_obs = *point.get(likelihood.sigma_obs.0)?;
        Some(expected.iter().take(likelihood.observed.len()).map(|mu| {
            student_t_sample(*mu, sigma_obs, rng)
        }).collect())
    }

    /// Structural description, identical for identical inputs.
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            free: self.free.iter().map(|(name, prior)| FreeSummary {
                name: name.clone(),
                prior: *prior,
            }).collect(),
            deterministics: self.nodes.values().map(|n| NodeSummary {
                name: n.name.clone(),
                kind: n.op.output_kind(),
                len: n.len,
                exposed: n.exposed,
            }).collect(),
            likelihood: self.likelihood.as_ref().map(|l| LikelihoodSummary {
                name: l.name.clone(),
                expected: self.node_name(l.expected).into(),
                sigma_obs: self.free_name(l.sigma_obs).into(),
                nu: OBSERVATION_NU,
                n_observed: l.observed.len(),
            }),
        }
    }
}

fn free_value(name: &str, point: &[f64], var: VarId) -> Result<f64> {
    point.get(var.0).copied().ok_or_else(|| Error::InvalidNode {
        name: name.into(),
        reason: format!("free variable {} does not exist", var.0),
    })
}

fn node_value<'a>(name: &str, values: &'a [NodeValue], node: NodeId) -> Result<&'a NodeValue> {
    values.get(node.0).ok_or_else(|| Error::InvalidNode {
        name: name.into(),
        reason: format!("node {} is not evaluated before it", node.0),
    })
}

fn evaluate_node(node: &DeterministicNode, point: &[f64], values: &[NodeValue]) -> Result<NodeValue> {
    let name = node.name.as_str();
    let value = match &node.op {
        Deterministic::TimeVaryingRate { baseline, change_points, t_total } => {
            let change_points = change_points.iter().map(|cp| -> Result<ChangePoint> {
                Ok(ChangePoint {
                    transient_begin: free_value(name, point, cp.transient_begin)?,
                    transient_len: free_value(name, point, cp.transient_len)?,
                    rate: free_value(name, point, cp.rate)?,
                })
            }).collect::<Result<Vec<_>>>()?;
            NodeValue::Series(time_varying_rate(free_value(name, point, *baseline)?, &change_points, *t_total))
        },
        Deterministic::Sir { lambda_t, mu, I_begin, population } => {
            let I_begin = free_value(name, point, *I_begin)?;
            NodeValue::Trajectory(sir_trajectory(
                node_value(name, values, *lambda_t)?.as_series(),
                free_value(name, point, *mu)?,
                population - I_begin,
                I_begin,
                *population,
            ))
        },
        Deterministic::DelayedCases { sir, delay, len_new_I_t, len_new_cases_obs, diff_data_sim } => {
            NodeValue::Series(delay_cases(
                node_value(name, values, *sir)?.as_series(),
                *len_new_I_t,
                *len_new_cases_obs,
                free_value(name, point, *delay)?,
                *diff_data_sim,
            ))
        },
    };
    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeSummary {
    pub name: String,
    pub prior: Prior,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub name: String,
    pub kind: NodeKind,
    pub len: usize,
    pub exposed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodSummary {
    pub name: String,
    pub expected: String,
    pub sigma_obs: String,
    pub nu: f64,
    pub n_observed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub free: Vec<FreeSummary>,
    pub deterministics: Vec<NodeSummary>,
    pub likelihood: Option<LikelihoodSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand_xoshiro::rand_core::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    /// Small graph without change points: 40 simulated days, data from day 15.
    fn small_graph(observed: Vec<f64>) -> ModelGraph {
        let mut builder = ModelBuilder::new();
        let I_begin = builder.add_free("I_begin", Prior::HalfCauchy { beta: 100.0 }).unwrap();
        let lambda_0 = builder.add_free("lambda_0", Prior::log_normal_from_median(0.4, 0.5)).unwrap();
        let mu = builder.add_free("mu", Prior::log_normal_from_median(0.125, 0.2)).unwrap();
        let delay = builder.add_free("delay", Prior::log_normal_from_median(8.0, 0.2)).unwrap();
        let sigma_obs = builder.add_free("sigma_obs", Prior::HalfCauchy { beta: 10.0 }).unwrap();
        let lambda_t = builder.add_deterministic("lambda_t", Deterministic::TimeVaryingRate {
            baseline: lambda_0, change_points: vec![], t_total: 40,
        }).unwrap();
        let sir = builder.add_intermediate("sir", Deterministic::Sir {
            lambda_t, mu, I_begin, population: 1e6,
        }).unwrap();
        let new_cases = builder.add_deterministic("new_cases", Deterministic::DelayedCases {
            sir, delay, len_new_I_t: 40, len_new_cases_obs: 25, diff_data_sim: 15,
        }).unwrap();
        builder.set_likelihood("obs", new_cases, sigma_obs, observed).unwrap();
        builder.finish()
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut builder = ModelBuilder::new();
        builder.add_free("mu", Prior::Normal { mu: 0.0, sigma: 1.0 }).unwrap();
        assert_eq!(
            builder.add_free("mu", Prior::Normal { mu: 0.0, sigma: 1.0 }),
            Err(Error::DuplicateVariable("mu".into()))
        );
    }

    #[test]
    fn test_node_kinds_are_checked() {
        let mut builder = ModelBuilder::new();
        let rate = builder.add_free("rate", Prior::Normal { mu: 0.0, sigma: 1.0 }).unwrap();
        let lambda_t = builder.add_deterministic("lambda_t", Deterministic::TimeVaryingRate {
            baseline: rate, change_points: vec![], t_total: 10,
        }).unwrap();
        let result = builder.add_deterministic("cases", Deterministic::DelayedCases {
            sir: lambda_t, delay: rate, len_new_I_t: 10, len_new_cases_obs: 5, diff_data_sim: 5,
        });
        assert!(matches!(result, Err(Error::InvalidNode { .. })));
    }

    #[test]
    fn test_evaluate_shapes_and_outputs() {
        let graph = small_graph(vec![10.0; 20]);
        assert_eq!(graph.named_outputs(), vec!["lambda_t", "new_cases"]);
        let trace = graph.evaluate(&[50.0, 0.3, 0.125, 8.0, 1.0]).unwrap();
        assert_eq!(trace.series("lambda_t").unwrap().len(), 40);
        assert_eq!(trace.trajectory("sir").unwrap().len(), 40);
        assert_eq!(trace.series("new_cases").unwrap().len(), 25);
        assert!(trace.series("lambda_t").unwrap().iter().all(|x| *x == 0.3));
    }

    #[test]
    fn test_dangling_handles_are_errors() {
        let mut graph = small_graph(vec![]);
        graph.nodes[1].op = Deterministic::Sir {
            lambda_t: NodeId(7), mu: VarId(2), I_begin: VarId(0), population: 1e6,
        };
        assert!(matches!(
            graph.evaluate(&[50.0, 0.3, 0.125, 8.0, 1.0]),
            Err(Error::InvalidNode { ref name, .. }) if name == "sir"
        ));

        let mut graph = small_graph(vec![1.0; 3]);
        if let Some(likelihood) = graph.likelihood.as_mut() {
            likelihood.sigma_obs = VarId(9);
        }
        assert!(matches!(
            graph.log_likelihood(&[50.0, 0.3, 0.125, 8.0, 1.0]),
            Err(Error::InvalidNode { ref name, .. }) if name == "obs"
        ));
    }

    #[test]
    fn test_point_dimension() {
        let graph = small_graph(vec![]);
        assert_eq!(
            graph.evaluate(&[1.0]).unwrap_err(),
            Error::PointDimension { expected: 5, found: 1 }
        );
    }

    #[test]
    fn test_point_from_map() {
        let graph = small_graph(vec![]);
        let mut values = IndexMap::new();
        for (name, value) in &[("sigma_obs", 1.0), ("delay", 8.0), ("mu", 0.1), ("lambda_0", 0.3), ("I_begin", 20.0)] {
            values.insert(name.to_string(), *value);
        }
        assert_eq!(graph.point_from_map(&values).unwrap(), vec![20.0, 0.3, 0.1, 8.0, 1.0]);

        values.insert("rho".into(), 1.0);
        assert_eq!(graph.point_from_map(&values), Err(Error::UnknownVariable("rho".into())));
    }

    #[test]
    fn test_log_prob_rejects_outside_support() {
        let graph = small_graph(vec![10.0; 20]);
        assert_eq!(graph.log_prob(&[50.0, -0.3, 0.125, 8.0, 1.0]).unwrap(), f64::NEG_INFINITY);
        assert!(graph.log_prob(&[50.0, 0.3, 0.125, 8.0, 1.0]).unwrap().is_finite());
    }

    #[test]
    fn test_likelihood_prefers_generating_point() {
        let truth = [50.0, 0.3, 0.125, 8.0, 1.0];
        let graph = small_graph(vec![]);
        let trace = graph.evaluate(&truth).unwrap();
        let observed: Vec<f64> = trace.series("new_cases").unwrap()[..20].to_vec();

        let graph = small_graph(observed);
        let at_truth = graph.log_likelihood(&truth).unwrap();
        let elsewhere = graph.log_likelihood(&[50.0, 0.45, 0.125, 8.0, 1.0]).unwrap();
        assert!(at_truth > elsewhere);
    }

    #[test]
    fn test_gradient_matches_prior_slope() {
        // with no observations only the priors contribute
        let graph = small_graph(vec![]);
        let point = [50.0, 0.3, 0.125, 8.0, 1.0];
        let grad = graph.grad_log_prob(&point).unwrap();
        assert_eq!(grad.len(), 5);
        // half-Cauchy(100) at 50: d/dx -ln(1 + (x/100)^2) = -2x / (100^2 + x^2)
        assert_abs_diff_eq!(grad[0], -100.0 / 12500.0, epsilon = 1e-6);
    }

    #[test]
    fn test_prior_samples_are_reproducible() {
        let graph = small_graph(vec![10.0; 20]);
        let mut rng_a = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut rng_b = Xoshiro256PlusPlus::seed_from_u64(42);
        let a = graph.sample_prior(&mut rng_a);
        assert_eq!(a, graph.sample_prior(&mut rng_b));
        assert_eq!(a.len(), 5);

        let trace = graph.evaluate(&a).unwrap();
        let observed = graph.sample_observations(&a, &trace, &mut rng_a).unwrap();
        assert_eq!(observed.len(), 20);
    }

    #[test]
    fn test_summary_lists_structure() {
        let summary = small_graph(vec![1.0; 3]).summary();
        let names: Vec<&str> = summary.free.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["I_begin", "lambda_0", "mu", "delay", "sigma_obs"]);
        assert_eq!(summary.deterministics[1].kind, NodeKind::Trajectory);
        assert!(!summary.deterministics[1].exposed);
        let likelihood = summary.likelihood.unwrap();
        assert_eq!(likelihood.expected, "new_cases");
        assert_eq!(likelihood.n_observed, 3);
    }
}
