//! Execution helper that runs an `argmin` solver on a calibration and
//! returns a validated [`SolverSummary`].
#[cfg(feature = "obs_slog")]
use argmin::core::CostFunction;
use argmin::core::{Executor, IterState, Solver, State};
use tracing::debug;

use crate::{
    model::Model,
    objective::ObjectiveFunction,
    optimization::{
        errors::OptResult,
        minimiser::{
            adapter::ArgMinAdapter,
            options::{MinimiserOptions, SolverSummary},
            types::Theta,
        },
    },
};

/// Run `solver` on `problem` starting from `theta0`.
///
/// Shared by every solver family. `G` is the solver's gradient type
/// (`Grad` for L-BFGS, `()` for Nelder–Mead).
///
/// # Feature flags
/// With `obs_slog` and `opts.verbose`, a terminal slog observer is
/// attached with `ObserverMode::Always` and the starting score is printed
/// before the first iteration.
///
/// # Errors
/// - Any argmin runtime error, including [`OptError`](crate::optimization::errors::OptError)s
///   raised inside the cost function, via `From<argmin::core::Error>`.
/// - Validation errors while building the [`SolverSummary`].
pub fn run_solver<'a, M, O, S, G>(
    theta0: Theta, opts: &MinimiserOptions, problem: ArgMinAdapter<'a, M, O>, solver: S,
) -> OptResult<SolverSummary>
where
    M: Model,
    O: ObjectiveFunction,
    G: Clone,
    S: Solver<ArgMinAdapter<'a, M, O>, IterState<Theta, G, (), (), (), f64>>,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let c0 = problem.cost(&theta0)?;
        eprintln!("init: objective(theta0) = {c0:.6}");
    }
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    debug!(iterations, status = ?termination, "solver finished");
    SolverSummary::new(
        result.take_best_param(),
        result.get_best_cost(),
        termination,
        iterations,
        function_counts,
    )
}
