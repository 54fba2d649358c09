//! minimiser — argmin-backed minimisation of a calibration objective.
//!
//! Purpose
//! -------
//! Drive a [`Calibration`](crate::optimization::Calibration) to the
//! minimum of its objective with a configurable argmin solver, and return
//! a normalized [`MinimiseOutcome`].
//!
//! Key behaviors
//! -------------
//! - [`minimise`] reads `θ₀` from the estimate set, validates it
//!   evaluates, runs the solver chosen by [`MinimiserOptions::method`]
//!   and writes `θ̂` back into the model.
//! - L-BFGS (More–Thuente or Hager–Zhang line search) uses
//!   finite-difference gradients; Nelder–Mead needs none.
//! - Errors raised inside the objective travel through argmin and come
//!   back as the original [`OptError`](crate::optimization::OptError).
//!
//! Conventions
//! -----------
//! - Optimizer vectors live in transformed space; `MinimiseOutcome::natural`
//!   reports the natural-space values read back from the model.
//! - Progress is logged with `tracing` (`info!` at start/finish,
//!   `debug!` per solver run); the `obs_slog` feature additionally
//!   attaches argmin's own terminal observer when `verbose` is set.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover tolerance/option validation,
//!   solver construction and finite-difference behavior.
//! - Integration tests minimise small models end to end.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod options;
pub mod run;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::minimise;
pub use self::options::{LineSearcher, Method, MinimiseOutcome, MinimiserOptions, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};
