//! minimiser::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the numeric types and solver aliases used by the minimiser
//! so the rest of the optimization code can stay agnostic to `ndarray`
//! and Argmin generics.
//!
//! Invariants & assumptions
//! ------------------------
//! - All optimizer vectors and matrices are `ndarray` containers over
//!   `f64`.
//! - `Cost` is the objective score (lower is better); no sign flips happen
//!   anywhere in the minimiser.
//! - The line-search aliases assume Argmin's three-parameter forms
//!   `(Param, Gradient, Float)` as of the pinned Argmin version.
//!
//! Conventions
//! -----------
//! - `Theta` is in optimizer (transformed) space with one entry per
//!   enabled estimate, in the estimate set's frozen order.
//! - `DEFAULT_LBFGS_MEM` and `DEFAULT_SIMPLEX_SCALE` are defaults that
//!   callers may override via [`MinimiserOptions`](super::MinimiserOptions).
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    neldermead::NelderMead,
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Parameter vector `θ` in optimizer space.
pub type Theta = Array1<f64>;

/// Gradient of the objective with respect to `θ`.
pub type Grad = Array1<f64>;

/// Dense Hessian matrix; `n × n` for `n = Theta.len()`.
pub type Hessian = Array2<f64>;

/// Objective score.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver
/// (e.g., `"cost_count"`, `"gradient_count"`).
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Default step, relative to `max(1, |θ_i|)`, used to build the initial
/// Nelder–Mead simplex.
pub const DEFAULT_SIMPLEX_SCALE: f64 = 0.1;

/// Hager–Zhang line search specialized to this crate's numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search specialized to this crate's numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS solver wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

/// L-BFGS solver wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;

/// Derivative-free simplex solver.
pub type NelderMeadSolver = NelderMead<Theta, Cost>;
