//! High-level entry point for minimising a calibration's objective.
//!
//! Reads the starting vector from the model, checks it evaluates, picks
//! the solver from [`MinimiserOptions::method`], runs it, then writes the
//! best vector back through [`Calibration::evaluate`] so the model is left
//! in its best-fit state.
use tracing::info;

use crate::{
    model::Model,
    objective::ObjectiveFunction,
    optimization::{
        calibration::Calibration,
        errors::{OptError, OptResult},
        minimiser::{
            adapter::ArgMinAdapter,
            builders::{build_nelder_mead, build_optimizer_hager_zhang, build_optimizer_more_thuente},
            options::{LineSearcher, Method, MinimiseOutcome, MinimiserOptions},
            run::run_solver,
            validation::validate_value,
        },
    },
};

/// Minimise the objective of `calibration`.
///
/// # Behavior
/// - `θ₀` is the current transformed value of every enabled estimate.
/// - `θ₀` is evaluated once before the solver starts; a start the model
///   cannot run fails here rather than inside the solver.
/// - After the run the model holds the values at `θ̂`.
///
/// # Errors
/// - [`OptError::EmptyEstimateSet`] when no estimate is enabled.
/// - Builder, runtime and evaluation errors from the layers below.
pub fn minimise<M: Model, O: ObjectiveFunction>(
    calibration: &Calibration<M, O>, opts: &MinimiserOptions,
) -> OptResult<MinimiseOutcome> {
    if calibration.dimension()? == 0 {
        return Err(OptError::EmptyEstimateSet);
    }
    let theta0 = calibration.start_vector()?;
    let start_score = calibration.evaluate_theta(&theta0)?;
    validate_value(start_score)?;
    info!(
        dimension = theta0.len(),
        start_score,
        method = ?opts.method,
        "starting minimisation"
    );

    let problem = ArgMinAdapter::new(calibration);
    let summary = match (opts.method, opts.line_searcher) {
        (Method::Lbfgs, LineSearcher::MoreThuente) => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_solver(theta0, opts, problem, solver)?
        }
        (Method::Lbfgs, LineSearcher::HagerZhang) => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_solver(theta0, opts, problem, solver)?
        }
        (Method::NelderMead, _) => {
            let solver = build_nelder_mead(&theta0, opts)?;
            run_solver(theta0, opts, problem, solver)?
        }
    };

    let score = calibration.evaluate_theta(&summary.theta_hat)?;
    let natural = calibration.estimates().natural_values()?;
    let labels = calibration.estimates().enabled_labels()?.into_iter().map(str::to_string).collect();
    info!(
        score,
        iterations = summary.iterations,
        converged = summary.converged,
        status = %summary.status,
        "minimisation finished"
    );
    Ok(MinimiseOutcome {
        theta_hat: summary.theta_hat,
        natural,
        labels,
        score,
        converged: summary.converged,
        status: summary.status,
        iterations: summary.iterations,
        fn_evals: summary.fn_evals,
    })
}
