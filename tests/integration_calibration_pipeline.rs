//! Integration tests for the calibration pipeline.
//!
//! Purpose
//! -------
//! - Drive the public API from configuration blocks to a minimised
//!   objective: build a population model, declare estimates, wrap them in
//!   a `Calibration` and recover a known catchability.
//! - Check the adapter contract on a real model: transformed writes,
//!   determinism and the dimension guard.
//!
//! Coverage
//! --------
//! - `model::PopulationModel::from_config` with selectivities, processes,
//!   an abundance observation, a penalty and an estimate block.
//! - `optimization::Calibration::evaluate` and `minimise` with L-BFGS and
//!   Nelder–Mead.
//! - `optimization::covariance::standard_errors` at the optimum.
//! - Penalty triggers flowing into the objective breakdown.
//!
//! Exclusions
//! ----------
//! - Binder, registry, transform and prior details; unit tests cover them.
use stock_calibration::{
    model::{ConfigBlock, ModelError, PopulationModel},
    objective::{ContributionKind, Objective},
    optimization::{
        Calibration, LineSearcher, Method, MinimiserOptions, OptError, Tolerances, covariance::standard_errors,
        minimise,
    },
};

const TRUE_Q: f64 = 0.5;
const YEARS: std::ops::RangeInclusive<u32> = 2000..=2009;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Model, selectivity, process, penalty and observation blocks.
///
/// `obs` fills the survey table; `fishing_catch` is taken every year from
/// 2003 on.
fn model_blocks(q: &str, obs: &[(u32, f64)], fishing_catch: &str) -> Vec<ConfigBlock> {
    let owned: Vec<[String; 2]> = obs.iter().map(|(y, v)| [y.to_string(), v.to_string()]).collect();
    let rows: Vec<Vec<&str>> = owned.iter().map(|r| vec![r[0].as_str(), r[1].as_str()]).collect();
    let row_refs: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();
    let fishing_years: Vec<String> = (2003..=2009).map(|y: u32| y.to_string()).collect();
    let year_refs: Vec<&str> = fishing_years.iter().map(String::as_str).collect();
    let catches = vec![fishing_catch; year_refs.len()];

    vec![
        ConfigBlock::new("model", "model", "stock.csl", 1)
            .with_line("min_age", &["1"])
            .with_line("max_age", &["6"])
            .with_line("start_year", &["2000"])
            .with_line("final_year", &["2009"])
            .with_line("categories", &["stock"])
            .with_line("initialisation_years", &["20"])
            .with_line("initialisation_cycle", &["recruit", "natural", "ageing"])
            .with_line("annual_cycle", &["recruit", "natural", "fishing", "ageing"]),
        ConfigBlock::new("selectivity", "flat", "stock.csl", 20)
            .with_line("type", &["constant"])
            .with_line("c", &["1"]),
        ConfigBlock::new("selectivity", "fishery", "stock.csl", 30)
            .with_line("type", &["logistic"])
            .with_line("a50", &["3"])
            .with_line("ato95", &["1.5"]),
        ConfigBlock::new("process", "recruit", "stock.csl", 40)
            .with_line("type", &["recruitment_constant"])
            .with_line("r0", &["1000"])
            .with_line("categories", &["stock"])
            .with_line("proportions", &["1"]),
        ConfigBlock::new("process", "natural", "stock.csl", 50)
            .with_line("type", &["mortality_constant"])
            .with_line("m", &["0.2"])
            .with_line("categories", &["stock"])
            .with_line("selectivities", &["flat"]),
        ConfigBlock::new("process", "fishing", "stock.csl", 60)
            .with_line("type", &["mortality_event"])
            .with_line("categories", &["stock"])
            .with_line("selectivities", &["fishery"])
            .with_line("years", &year_refs)
            .with_line("catches", &catches)
            .with_line("penalty", &["catch_shortfall"]),
        ConfigBlock::new("process", "ageing", "stock.csl", 70)
            .with_line("type", &["ageing"])
            .with_line("categories", &["stock"]),
        ConfigBlock::new("penalty", "catch_shortfall", "stock.csl", 80).with_line("multiplier", &["1"]),
        ConfigBlock::new("observation", "survey", "stock.csl", 90)
            .with_line("type", &["abundance"])
            .with_line("q", &[q])
            .with_line("sigma", &["0.2"])
            .with_line("categories", &["stock"])
            .with_line("selectivities", &["flat"])
            .with_table("obs", &["year", "value"], &row_refs),
    ]
}

fn q_estimate() -> ConfigBlock {
    ConfigBlock::new("estimate", "catchability", "stock.csl", 120)
        .with_line("parameter", &["observation[survey].q"])
        .with_line("lower_bound", &["0.01"])
        .with_line("upper_bound", &["10"])
        .with_line("transformation", &["log"])
}

/// Survey index generated by the model at the true catchability.
fn true_index() -> Vec<(u32, f64)> {
    use stock_calibration::model::Model;

    let placeholder: Vec<(u32, f64)> = YEARS.map(|y| (y, 1.0)).collect();
    let (mut truth, _) =
        PopulationModel::from_config(&model_blocks(&TRUE_Q.to_string(), &placeholder, "100")).unwrap();
    truth.full_iteration().unwrap();
    let survey = truth.observation("survey").unwrap();
    YEARS.map(|y| (y, TRUE_Q * survey.expected(y).unwrap())).collect()
}

fn calibration(q_start: &str, fishing_catch: &str) -> Calibration<PopulationModel, Objective> {
    let mut blocks = model_blocks(q_start, &true_index(), fishing_catch);
    blocks.push(q_estimate());
    let (model, estimates) = PopulationModel::from_config(&blocks).unwrap();
    Calibration::new(model, estimates, Objective::new())
}

fn current_q(cal: &Calibration<PopulationModel, Objective>) -> f64 {
    cal.model().addressables().get("observation[survey].q").unwrap()
}

#[test]
// Purpose
// -------
// A trial vector is written through the log transform and scoring is
// deterministic.
//
// Given
// -----
// - One enabled estimate: survey q with a log transform.
//
// Expect
// ------
// - evaluate([ln 0.7]) leaves q = 0.7 in the model.
// - Two evaluations of the same vector return the same score.
// - At the true q every likelihood term is ln(sigma).
fn evaluate_writes_transformed_values_deterministically() {
    init_tracing();
    // Arrange
    let cal = calibration("1.0", "100");

    // Act
    let first = cal.evaluate(&[0.7_f64.ln()]).unwrap();
    let q = current_q(&cal);
    let second = cal.evaluate(&[0.7_f64.ln()]).unwrap();
    let at_truth = cal.evaluate(&[TRUE_Q.ln()]).unwrap();

    // Assert
    assert!((q - 0.7).abs() < 1e-12);
    assert_eq!(first.to_bits(), second.to_bits());
    let n_years = YEARS.count() as f64;
    assert!((at_truth - n_years * 0.2_f64.ln()).abs() < 1e-9, "score at truth {at_truth}");
    assert!(first > at_truth);
}

#[test]
// Purpose
// -------
// A trial vector of the wrong length is rejected before anything is
// written.
fn wrong_length_trial_writes_nothing() {
    let cal = calibration("1.0", "100");

    let err = cal.evaluate(&[0.0, 1.0]).unwrap_err();

    assert_eq!(err, OptError::DimensionMismatch { expected: 1, found: 2 });
    assert_eq!(current_q(&cal), 1.0);
}

#[test]
// Purpose
// -------
// L-BFGS recovers the catchability used to generate the index, leaves the
// model at the optimum and yields a sensible standard error.
//
// Given
// -----
// - Noise-free index, sigma = 0.2 over ten years, q started at 1.0.
//
// Expect
// ------
// - q̂ ≈ 0.5; the model holds q̂ afterwards.
// - SE of ln q ≈ sigma / sqrt(10).
fn lbfgs_recovers_true_catchability() {
    init_tracing();
    // Arrange
    let cal = calibration("1.0", "100");
    let opts = MinimiserOptions::default();

    // Act
    let outcome = minimise(&cal, &opts).unwrap();
    let se = standard_errors(&cal, &outcome.theta_hat).unwrap();

    // Assert
    assert!(outcome.converged, "status: {}", outcome.status);
    assert_eq!(outcome.labels, vec!["observation[survey].q".to_string()]);
    assert!((outcome.natural[0] - TRUE_Q).abs() < 1e-4, "q_hat = {}", outcome.natural[0]);
    assert!((current_q(&cal) - outcome.natural[0]).abs() < 1e-12);
    let expected_se = 0.2 / 10.0_f64.sqrt();
    assert!((se[0] - expected_se).abs() < 0.1 * expected_se, "se = {}", se[0]);
}

#[test]
fn nelder_mead_recovers_true_catchability() {
    let cal = calibration("2.0", "100");
    let tols = Tolerances::new(None, Some(1e-12), Some(500)).unwrap();
    let opts = MinimiserOptions::new(tols, Method::NelderMead, LineSearcher::MoreThuente, false, None, 0.1).unwrap();

    let outcome = minimise(&cal, &opts).unwrap();

    assert!((outcome.natural[0] - TRUE_Q).abs() < 1e-3, "q_hat = {}", outcome.natural[0]);
}

#[test]
// Purpose
// -------
// A catch the stock cannot supply triggers the configured penalty, which
// shows up in the objective breakdown.
fn impossible_catch_is_penalised() {
    init_tracing();
    let cal = calibration("1.0", "1e9");

    let score = cal.evaluate(&[0.0]).unwrap();

    let triggers = cal.model().penalties().triggers().to_vec();
    assert!(!triggers.is_empty());
    assert!(triggers.iter().all(|t| t.source == "fishing" && t.requested == 1e9));
    let penalty_total = cal.objective().total(ContributionKind::Penalty);
    assert!(penalty_total > 0.0);
    assert!(score.is_finite() && score > 0.0);
}

#[test]
// Purpose
// -------
// Configuration problems across blocks are reported together with their
// file and line.
fn configuration_errors_are_reported_together() {
    let mut blocks = model_blocks("1.0", &true_index(), "100");
    blocks[5] = blocks[5].clone().with_line("u_max", &["1.5"]);
    blocks[4] = blocks[4].clone().with_line("selectivities", &["flat", "flat"]);

    let err = PopulationModel::from_config(&blocks).err().unwrap();

    let ModelError::Config(errors) = &err else { panic!("expected configuration errors, got {err}") };
    assert_eq!(errors.len(), 2, "{err}");
    let text = err.to_string();
    assert!(text.contains("stock.csl:"), "{text}");
    assert!(text.contains("expected 1 but got 2"), "{text}");
    assert!(text.contains("Value defined was 1.5"), "{text}");
}
