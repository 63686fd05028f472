use sirchange::errors::Error;
use sirchange::model::{ModelAssembler, SimulationHorizon, sir_model_with_change_points};
use sirchange::priors::ChangePointSpec;

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use indexmap::IndexMap;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, month, day).unwrap()
}

fn observed() -> Vec<f64> {
    (0..30).map(|t| 20.0 * 1.1f64.powi(t)).collect()
}

fn change_points() -> Vec<ChangePointSpec> {
    let mut first = ChangePointSpec::new(date(3, 9));
    first.median_lambda = Some(0.2);
    let mut second = ChangePointSpec::new(date(3, 16));
    second.median_lambda = Some(1.0 / 8.0);
    second.sigma_lambda = Some(0.2);
    vec![first, second]
}

#[test]
fn assembly_is_structurally_deterministic() {
    let build = || sir_model_with_change_points(
        &observed(), &change_points(), date(2, 20), 60, 16, None
    ).unwrap();
    let (a, b) = (build(), build());
    assert_eq!(a.summary(), b.summary());
    assert_eq!(a.n_free(), 1 + 3 + 2 + 2 + 3);
    assert_eq!(a.named_outputs(), vec!["lambda_t", "new_cases"]);
}

#[test]
fn unknown_prior_fails_before_any_variable() {
    let mut priors = IndexMap::new();
    priors.insert("not_a_real_prior".to_string(), 1.0);
    let result = sir_model_with_change_points(
        &observed(), &change_points(), date(2, 20), 60, 16, Some(&priors)
    );
    assert_eq!(result.unwrap_err(), Error::UnknownOption("not_a_real_prior".into()));
}

#[test]
fn out_of_order_change_points_fail() {
    let change_points = vec![ChangePointSpec::new(date(3, 21)), ChangePointSpec::new(date(3, 11))];
    let result = sir_model_with_change_points(
        &observed(), &change_points, date(3, 1), 60, 16, None
    );
    assert_eq!(
        result.unwrap_err(),
        Error::ChangePointOrdering { index: 1, date: date(3, 11), previous: date(3, 21) }
    );
}

#[test]
fn zero_lead_time_fails() {
    let result = sir_model_with_change_points(&observed(), &[], date(3, 1), 60, 0, None);
    assert!(matches!(result, Err(Error::InsufficientLeadTime { diff_data_sim: 0, .. })));
}

#[test]
fn lead_time_follows_delay_prior() {
    let mut priors = IndexMap::new();
    priors.insert("prior_median_delay".to_string(), 4.0);
    // 4 * (1 + 3 * 0.2) = 6.4
    assert!(sir_model_with_change_points(&observed(), &[], date(3, 1), 60, 7, Some(&priors)).is_ok());
    assert!(sir_model_with_change_points(&observed(), &[], date(3, 1), 60, 6, Some(&priors)).is_err());
}

#[test]
fn invalid_delay_prior_fails_before_lead_time_check() {
    let mut priors = IndexMap::new();
    priors.insert("prior_median_delay".to_string(), f64::NAN);
    let result = sir_model_with_change_points(&observed(), &[], date(3, 1), 60, 0, Some(&priors));
    assert!(matches!(result, Err(Error::InvalidOptionValue { ref name, .. }) if name == "prior_median_delay"));

    let mut priors = IndexMap::new();
    priors.insert("prior_sigma_delay".to_string(), -0.2);
    let result = sir_model_with_change_points(&observed(), &[], date(3, 1), 60, 4, Some(&priors));
    assert!(matches!(result, Err(Error::InvalidOptionValue { ref name, .. }) if name == "prior_sigma_delay"));
}

#[test]
fn invalid_change_point_prior_fails() {
    let mut change_points = change_points();
    change_points[1].sigma_lambda = Some(-0.2);
    let result = sir_model_with_change_points(
        &observed(), &change_points, date(2, 20), 60, 16, None
    );
    assert!(matches!(result, Err(Error::InvalidOptionValue { ref name, .. }) if name == "prior_sigma_lambda"));
}

#[test]
fn short_horizon_fails() {
    let result = sir_model_with_change_points(&observed(), &[], date(3, 1), 45, 16, None);
    assert_eq!(result.unwrap_err(), Error::HorizonTooShort { num_days_sim: 45, required: 46 });
}

#[test]
fn outputs_are_retrievable_after_assembly() {
    let graph = sir_model_with_change_points(
        &observed(), &change_points(), date(2, 20), 60, 16, None
    ).unwrap();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
    let point = graph.sample_prior(&mut rng);
    let trace = graph.evaluate(&point).unwrap();

    assert_eq!(trace.series("lambda_t").unwrap().len(), 60);
    assert_eq!(trace.series("new_cases").unwrap().len(), 60 - 16);
    assert_eq!(trace.trajectory("sir").unwrap().len(), 60);

    // the same point always gives the same values
    assert_eq!(graph.evaluate(&point).unwrap(), trace);
}

#[test]
fn rate_plateaus_between_change_points() {
    let horizon = SimulationHorizon { date_begin_simulation: date(3, 1), num_days_sim: 80, diff_data_sim: 16 };
    let graph = ModelAssembler::new(observed(), horizon)
        .change_points(vec![ChangePointSpec::new(date(3, 21)), ChangePointSpec::new(date(4, 10))])
        .assemble()
        .unwrap();

    let mut values = IndexMap::new();
    for (name, value) in &[
        ("I_begin", 30.0), ("lambda_0", 0.4), ("lambda_1", 0.2), ("lambda_2", 0.1),
        ("transient_begin_0", 20.0), ("transient_begin_1", 40.0),
        ("transient_len_0", 3.0), ("transient_len_1", 3.0),
        ("mu", 0.125), ("delay", 8.0), ("sigma_obs", 5.0),
    ] {
        values.insert(name.to_string(), *value);
    }
    let point = graph.point_from_map(&values).unwrap();
    let trace = graph.evaluate(&point).unwrap();
    let lambda_t = trace.series("lambda_t").unwrap();
    assert_abs_diff_eq!(lambda_t[5], 0.4, epsilon = 1e-9);
    assert_abs_diff_eq!(lambda_t[31], 0.2, epsilon = 1e-9);
    assert_abs_diff_eq!(lambda_t[79], 0.1, epsilon = 1e-9);
}

#[test]
fn posterior_density_is_finite_at_prior_draws() {
    let graph = sir_model_with_change_points(
        &observed(), &change_points(), date(2, 20), 60, 16, None
    ).unwrap();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
    for _ in 0..20 {
        let point = graph.sample_prior(&mut rng);
        let log_prob = graph.log_prob(&point).unwrap();
        assert!(log_prob.is_finite() || log_prob == f64::NEG_INFINITY);
        assert!(!log_prob.is_nan());
    }
}

#[test]
fn gradient_has_one_entry_per_free_variable() {
    let graph = sir_model_with_change_points(
        &observed(), &change_points(), date(2, 20), 60, 16, None
    ).unwrap();
    let mut values = IndexMap::new();
    for (name, value) in &[
        ("I_begin", 20.0), ("lambda_0", 0.4), ("lambda_1", 0.2), ("lambda_2", 0.125),
        ("transient_begin_0", 18.0), ("transient_begin_1", 25.0),
        ("transient_len_0", 3.0), ("transient_len_1", 3.0),
        ("mu", 0.125), ("delay", 8.0), ("sigma_obs", 5.0),
    ] {
        values.insert(name.to_string(), *value);
    }
    let point = graph.point_from_map(&values).unwrap();
    let grad = graph.grad_log_prob(&point).unwrap();
    assert_eq!(grad.len(), graph.n_free());
    assert!(grad.iter().all(|g| g.is_finite()));
}
