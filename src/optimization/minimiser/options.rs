//! Public configuration and result types for minimisation.
//!
//! - [`Method`]: which argmin solver drives the search.
//! - [`LineSearcher`]: line search used by L-BFGS.
//! - [`MinimiserOptions`] and [`Tolerances`]: validated run configuration.
//! - [`MinimiseOutcome`]: normalized result returned by
//!   [`minimise`](super::minimise).
use std::str::FromStr;

use argmin::core::{TerminationReason, TerminationStatus};

use crate::optimization::{
    errors::{OptError, OptResult},
    minimiser::{
        types::{DEFAULT_LBFGS_MEM, DEFAULT_SIMPLEX_SCALE, FnEvalMap, Theta},
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};

/// Solver family.
///
/// Parsing is case-insensitive: `"lbfgs"`/`"l-bfgs"` and
/// `"neldermead"`/`"nelder-mead"`/`"simplex"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Quasi-Newton with finite-difference gradients.
    #[default]
    Lbfgs,
    /// Derivative-free simplex search.
    NelderMead,
}

impl FromStr for Method {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lbfgs" | "l-bfgs" => Ok(Method::Lbfgs),
            "neldermead" | "nelder-mead" | "simplex" => Ok(Method::NelderMead),
            _ => Err(OptError::InvalidMethod {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'lbfgs' or 'neldermead'.",
            }),
        }
    }
}

/// Choice of line search used inside the L-BFGS solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    /// Parse a line-search choice from a string (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Minimiser configuration.
///
/// Fields:
/// - `tols`: tolerances and iteration limit.
/// - `method`: solver family.
/// - `line_searcher`: used only by [`Method::Lbfgs`].
/// - `verbose`: attach argmin's terminal observer (behind `obs_slog`).
/// - `lbfgs_mem`: L-BFGS history size; `None` uses [`DEFAULT_LBFGS_MEM`].
/// - `simplex_scale`: Nelder–Mead initial step relative to `max(1, |θ_i|)`.
///
/// Default: L-BFGS with More–Thuente, `tol_grad = 1e-6`, `max_iter = 300`.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimiserOptions {
    pub tols: Tolerances,
    pub method: Method,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
    pub simplex_scale: f64,
}

impl MinimiserOptions {
    /// Create validated options.
    ///
    /// # Errors
    /// - [`OptError::InvalidLBFGSMem`] if `lbfgs_mem == Some(0)`.
    /// - [`OptError::InvalidSimplexScale`] unless `simplex_scale` is finite
    ///   and positive.
    pub fn new(
        tols: Tolerances, method: Method, line_searcher: LineSearcher, verbose: bool,
        lbfgs_mem: Option<usize>, simplex_scale: f64,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        if !simplex_scale.is_finite() || simplex_scale <= 0.0 {
            return Err(OptError::InvalidSimplexScale {
                value: simplex_scale,
                reason: "Simplex scale must be finite and positive.",
            });
        }
        Ok(Self { tols, method, line_searcher, verbose, lbfgs_mem, simplex_scale })
    }

    pub fn lbfgs_mem(&self) -> usize {
        self.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM)
    }
}

impl Default for MinimiserOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: None, max_iter: Some(300) },
            method: Method::Lbfgs,
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
            simplex_scale: DEFAULT_SIMPLEX_SCALE,
        }
    }
}

/// Numerical tolerances and iteration limits.
///
/// - `tol_grad`: L-BFGS stops when the gradient norm falls below it.
/// - `tol_cost`: stop when the change in cost falls below it (for
///   Nelder–Mead, the standard deviation of the simplex scores).
/// - `max_iter`: hard cap on iterations.
///
/// At least one of the three must be provided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Result of [`minimise`](super::minimise).
///
/// - `theta_hat`: best optimizer-space vector.
/// - `natural`: the same point in natural space, read back from the model
///   after it was re-evaluated at `theta_hat`.
/// - `labels`: estimate labels in vector order.
/// - `score`: objective at `theta_hat`.
/// - `converged`: `true` only when the solver reported convergence or the
///   target cost; hitting `max_iter` is not convergence.
/// - `status`: human-readable termination status.
/// - `fn_evals`: argmin's counters (`cost_count`, `gradient_count`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct MinimiseOutcome {
    pub theta_hat: Theta,
    pub natural: Theta,
    pub labels: Vec<String>,
    pub score: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
}

/// Raw solver result before it is written back into the model.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverSummary {
    pub theta_hat: Theta,
    pub score: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
}

impl SolverSummary {
    /// Build a validated summary from raw solver state.
    ///
    /// # Errors
    /// - Propagates validation errors for `theta_hat` or `score`.
    pub fn new(
        theta_hat_opt: Option<Theta>, score: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(score)?;
        let converged = matches!(
            termination,
            TerminationStatus::Terminated(
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached
            )
        );
        let status = match &termination {
            TerminationStatus::NotTerminated => "Not terminated".to_string(),
            TerminationStatus::Terminated(reason) => format!("{reason:?}"),
        };
        Ok(Self { theta_hat, score, converged, status, iterations: iterations as usize, fn_evals })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn method_and_line_search_parse_case_insensitively() {
        assert_eq!("Nelder-Mead".parse::<Method>().unwrap(), Method::NelderMead);
        assert_eq!("LBFGS".parse::<Method>().unwrap(), Method::Lbfgs);
        assert!(matches!("bfgs".parse::<Method>(), Err(OptError::InvalidMethod { .. })));
        assert_eq!("hagerzhang".parse::<LineSearcher>().unwrap(), LineSearcher::HagerZhang);
    }

    #[test]
    fn tolerances_need_at_least_one_rule() {
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(matches!(Tolerances::new(None, None, Some(0)), Err(OptError::InvalidMaxIter { .. })));
        assert!(Tolerances::new(None, Some(1e-8), None).is_ok());
    }

    #[test]
    fn options_reject_bad_memory_and_simplex_scale() {
        let tols = Tolerances::new(Some(1e-6), None, Some(10)).unwrap();

        let mem = MinimiserOptions::new(tols, Method::Lbfgs, LineSearcher::MoreThuente, false, Some(0), 0.1);
        let scale = MinimiserOptions::new(tols, Method::NelderMead, LineSearcher::MoreThuente, false, None, 0.0);

        assert!(matches!(mem, Err(OptError::InvalidLBFGSMem { .. })));
        assert!(matches!(scale, Err(OptError::InvalidSimplexScale { .. })));
        assert_eq!(MinimiserOptions::default().lbfgs_mem(), DEFAULT_LBFGS_MEM);
    }

    #[test]
    // Purpose
    // -------
    // Only a genuine convergence status counts as converged.
    fn max_iters_is_not_convergence() {
        let hit_cap = SolverSummary::new(
            Some(array![0.0]),
            1.0,
            TerminationStatus::Terminated(TerminationReason::MaxItersReached),
            10,
            FnEvalMap::new(),
        )
        .unwrap();
        let done = SolverSummary::new(
            Some(array![0.0]),
            1.0,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            3,
            FnEvalMap::new(),
        )
        .unwrap();

        assert!(!hit_cap.converged);
        assert!(done.converged);
        assert_eq!(done.iterations, 3);
    }
}
