//! Stan program generation for an assembled model graph, so the model can be
//! handed to an external sampler.

#![allow(non_snake_case)]

use crate::delay::DELAY_KERNEL_SHAPE;
use crate::dist::{Prior, OBSERVATION_NU};
use crate::graph::{Deterministic, ModelGraph, VarId};
use crate::transition::{MIN_TRANSITION_WIDTH, TRANSITION_STEEPNESS};

use indoc::indoc;
use serde_json::json;
use unindent::unindent;

const FUNCTIONS: &str = indoc!("
    real smooth_transition(real t_begin, real t_end, real t) {
      real width = fmax(t_end - t_begin, MIN_WIDTH);
      return inv_logit(STEEPNESS / width * (t - 0.5 * (t_begin + t_end)));
    }

    vector time_varying_rate(real lambda_0, vector rates, vector transient_begin,
                             vector transient_len, int t_total) {
      vector[t_total] lambda_t = rep_vector(lambda_0, t_total);
      real rate_before = lambda_0;
      for (i in 1:num_elements(rates)) {
        for (t in 1:t_total) {
          lambda_t[t] += (rates[i] - rate_before)
            * smooth_transition(transient_begin[i], transient_begin[i] + transient_len[i], t - 1);
        }
        rate_before = rates[i];
      }
      return lambda_t;
    }

    matrix sir_trajectory(vector lambda_t, real mu, real I_begin, real N) {
      int t_total = num_elements(lambda_t);
      matrix[t_total, 3] trajectory;
      real S = N - I_begin;
      real I = I_begin;
      for (t in 1:t_total) {
        real new_I = lambda_t[t] * I * S / N;
        S = S - new_I;
        I = I + new_I - mu * I;
        trajectory[t, 1] = S;
        trajectory[t, 2] = I;
        trajectory[t, 3] = new_I;
      }
      return trajectory;
    }

    vector delay_kernel(real delay, int max_lag) {
      vector[max_lag + 1] w;
      real cdf_below = 0;
      for (k in 0:max_lag) {
        real cdf_above = gamma_cdf(k + 0.5 | DELAY_SHAPE, DELAY_SHAPE / delay);
        w[k + 1] = cdf_above - cdf_below;
        cdf_below = cdf_above;
      }
      return w / cdf_below;
    }

    vector delay_cases(vector new_I_t, int len_out, real delay, int diff_data_sim) {
      vector[diff_data_sim + 1] w = delay_kernel(delay, diff_data_sim);
      int len_in = num_elements(new_I_t);
      vector[len_out] cases = rep_vector(0, len_out);
      for (j in 1:len_out) {
        for (k in 0:diff_data_sim) {
          int t = diff_data_sim + j - k;
          if (t <= len_in) {
            cases[j] += w[k + 1] * new_I_t[t];
          }
        }
      }
      return cases;
    }
");

pub struct StanModel<'a> {
    graph: &'a ModelGraph,
}

impl<'a> StanModel<'a> {
    pub fn new(graph: &'a ModelGraph) -> Self {
        Self { graph }
    }

    pub fn generate_stan_code(&self) -> String {
        generate_stan_code(
            vec![self.functions()],
            self.data(),
            "".into(),
            self.parameters(),
            self.transformed_parameters(),
            self.model(),
            self.generated_quantities(),
        )
    }

    /// Data to run the generated program with.
    pub fn data_json(&self) -> serde_json::Value {
        let observed = self.graph.likelihood().map(|l| l.observed.clone()).unwrap_or_default();
        json!({
            "num_days_data": observed.len(),
            "new_cases_obs": observed,
        })
    }

    fn functions(&self) -> String {
        FUNCTIONS
            .replace("MIN_WIDTH", &format!("{:?}", MIN_TRANSITION_WIDTH))
            .replace("STEEPNESS", &format!("{:?}", TRANSITION_STEEPNESS))
            .replace("DELAY_SHAPE", &format!("{:?}", DELAY_KERNEL_SHAPE))
            .trim_end()
            .into()
    }

    fn data(&self) -> Vec<String> {
        if self.graph.likelihood().is_none() {
            return vec![];
        }
        vec![
            "int<lower=0> num_days_data;".into(),
            "vector[num_days_data] new_cases_obs;".into(),
        ]
    }

    fn parameters(&self) -> Vec<String> {
        self.graph.free_variables().map(|(name, prior)| {
            match prior {
                Prior::HalfCauchy { .. } | Prior::LogNormal { .. } => {
                    format!("real<lower=0> {};", name)
                },
                Prior::Normal { .. } => format!("real {};", name),
            }
        }).collect()
    }

    fn vector_literal(&self, vars: Vec<VarId>) -> String {
        if vars.is_empty() {
            "rep_vector(0.0, 0)".into()
        }
        else {
            let names: Vec<&str> = vars.iter().map(|v| self.graph.free_name(*v)).collect();
            format!("[{}]'", names.join(", "))
        }
    }

    fn transformed_parameters(&self) -> String {
        self.graph.deterministics().map(|node| {
            match &node.op {
                Deterministic::TimeVaryingRate { baseline, change_points, t_total } => {
                    format!(
                        "vector[{t}] {name} = time_varying_rate({baseline}, {rates}, {begins}, {lens}, {t});",
                        t = t_total,
                        name = node.name,
                        baseline = self.graph.free_name(*baseline),
                        rates = self.vector_literal(change_points.iter().map(|cp| cp.rate).collect()),
                        begins = self.vector_literal(change_points.iter().map(|cp| cp.transient_begin).collect()),
                        lens = self.vector_literal(change_points.iter().map(|cp| cp.transient_len).collect()),
                    )
                },
                Deterministic::Sir { lambda_t, mu, I_begin, population } => {
                    format!(
                        "matrix[{t}, 3] {name} = sir_trajectory({lambda_t}, {mu}, {I_begin}, {N:?});",
                        t = node.len,
                        name = node.name,
                        lambda_t = self.graph.node_name(*lambda_t),
                        mu = self.graph.free_name(*mu),
                        I_begin = self.graph.free_name(*I_begin),
                        N = population,
                    )
                },
                Deterministic::DelayedCases { sir, delay, len_new_I_t, len_new_cases_obs, diff_data_sim } => {
                    format!(
                        "vector[{len}] {name} = delay_cases(head(col({sir}, 3), {len_in}), {len}, {delay}, {diff});",
                        len = len_new_cases_obs,
                        name = node.name,
                        sir = self.graph.node_name(*sir),
                        len_in = len_new_I_t,
                        delay = self.graph.free_name(*delay),
                        diff = diff_data_sim,
                    )
                },
            }
        }).collect::<Vec<_>>().join("\n")
    }

    fn model(&self) -> String {
        let mut lines: Vec<String> = self.graph.free_variables().map(|(name, prior)| {
            let args = match prior {
                Prior::HalfCauchy { beta } => format!("0, {:?}", beta),
                Prior::LogNormal { mu, sigma } | Prior::Normal { mu, sigma } => format!("{:?}, {:?}", mu, sigma),
            };
            format!("{} ~ {}({});", name, prior.family(), args)
        }).collect();

        if let Some(likelihood) = self.graph.likelihood() {
            lines.push(format!(
                "new_cases_obs ~ student_t({nu:?}, head({expected}, num_days_data), \
                sqrt(abs(head({expected}, num_days_data) + 1)) * {sigma_obs});",
                nu = OBSERVATION_NU,
                expected = self.graph.node_name(likelihood.expected),
                sigma_obs = self.graph.free_name(likelihood.sigma_obs),
            ));
        }
        lines.join("\n")
    }

    fn generated_quantities(&self) -> String {
        match self.graph.likelihood() {
            Some(likelihood) => unindent(&format!("
                array[num_days_data] real {name}_rep = student_t_rng(
                  {nu:?}, head({expected}, num_days_data),
                  sqrt(abs(head({expected}, num_days_data) + 1)) * {sigma_obs}
                );
                ",
                name = likelihood.name,
                nu = OBSERVATION_NU,
                expected = self.graph.node_name(likelihood.expected),
                sigma_obs = self.graph.free_name(likelihood.sigma_obs),
            )).trim_end().into(),
            None => "".into(),
        }
    }
}

fn indent(s: &str, n_spaces: usize, n_indent: usize) -> String {
    s.lines().map(|line| {
        if line.is_empty() {
            String::new()
        }
        else {
            format!("{}{}", (" ".repeat(n_spaces)).repeat(n_indent), line)
        }
    }).collect::<Vec<_>>().join("\n")
}

fn generate_stan_code(
    functions: Vec<String>,
    data: Vec<String>,
    transformed_data: String,
    parameters: Vec<String>,
    transformed_parameters: String,
    model: String,
    generated_quantities: String,
) -> String {
    format!("{functions}\n\
        {data}\n\
        {transformed_data}\n\
        {parameters}\n\
        {transformed_parameters}\n\
        {model}\n\
        {generated_quantities}\n",
        functions = functions_code(functions),
        data = data_code(data),
        transformed_data = transformed_data_code(transformed_data),
        parameters = parameters_code(parameters),
        transformed_parameters = transformed_parameters_code(transformed_parameters),
        model = model_code(model),
        generated_quantities = generated_quantities_code(generated_quantities),
    )
}

fn format_section(name: &str, body: String) -> String {
    format!(
        "{} {{\n\
            {}\n\
            }}\n\
        ",
        name,
        indent(&body, 2, 1)
    )
}

fn functions_code(functions: Vec<String>) -> String {
    format_section("functions", functions.join("\n\n"))
}

fn data_code(data_variables: Vec<String>) -> String {
    format_section("data", data_variables.join("\n"))
}

fn transformed_data_code(body: String) -> String {
    format_section("transformed data", body)
}

fn parameters_code(parameters: Vec<String>) -> String {
    format_section("parameters", parameters.join("\n"))
}

fn transformed_parameters_code(body: String) -> String {
    format_section("transformed parameters", body)
}

fn model_code(body: String) -> String {
    format_section("model", body)
}

fn generated_quantities_code(body: String) -> String {
    format_section("generated quantities", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(indent("a\n\nb", 2, 1), "  a\n\n  b");
        assert_eq!(indent("a", 2, 2), "    a");
    }

    #[test]
    fn test_section_layout() {
        assert_eq!(format_section("model", "x ~ normal(0, 1);".into()), "model {\n  x ~ normal(0, 1);\n}\n");
    }

    #[test]
    fn test_constants_are_substituted() {
        let graph = crate::graph::ModelBuilder::new().finish();
        let functions = StanModel::new(&graph).functions();
        assert!(functions.contains("inv_logit(8.0 / width"));
        assert!(functions.contains("fmax(t_end - t_begin, 0.001)"));
        assert!(functions.contains("gamma_cdf(k + 0.5 | 16.0, 16.0 / delay)"));
        assert!(!functions.contains("DELAY_SHAPE"));
    }
}
