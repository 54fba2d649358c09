//! stock_calibration — calibration core for age-structured population models.
//!
//! Purpose
//! -------
//! Let strongly typed parameters scattered across independently written
//! model components be (a) populated from configuration with validated
//! cardinality and provenance and (b) exposed by label to a numeric
//! optimizer that only understands flat `f64` vectors; then turn each
//! optimizer trial vector into a full model run and a scalar score.
//!
//! Key behaviors
//! -------------
//! - [`parameters`]: label → typed target binding (scalar, sequence, table)
//!   with defaults and `file:line` provenance.
//! - [`addressable`]: model-scoped registry of label → `f64` slot.
//! - [`estimates`]: the subset of addressables handed to the optimizer,
//!   with bounds, transforms and priors, in a frozen enabled order.
//! - [`objective`]: priors, penalties and likelihoods summed into one
//!   score.
//! - [`optimization`]: the [`Calibration`](optimization::Calibration)
//!   adapter, argmin-backed minimisers and covariance at the optimum.
//! - [`model`]: the [`Model`](model::Model) contract and a small
//!   age-structured [`PopulationModel`](model::PopulationModel).
//!
//! Invariants & assumptions
//! ------------------------
//! - Everything is single-threaded; shared slots use `Rc`/`RefCell`.
//!   Parallel calibrations need independent model instances.
//! - Configuration errors are collected and reported together; internal
//!   errors (unknown labels at run time, expired slots, wrong vector
//!   lengths) stop the run.
//!
//! Conventions
//! -----------
//! - Optimizer vectors live in transformed space; estimate values in the
//!   model are natural space.
//! - Logging goes through `tracing`; install a subscriber to see it.
//!
//! Downstream usage
//! ----------------
//! - Produce [`ConfigBlock`](model::ConfigBlock)s with your own loader,
//!   build with [`PopulationModel::from_config`](model::PopulationModel::from_config),
//!   wrap in a `Calibration` and call
//!   [`minimise`](optimization::minimise).
//! - Custom models implement [`Model`](model::Model) and reuse the rest.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` drives the public API
//!   from configuration to a minimised objective.

pub mod addressable;
pub mod estimates;
pub mod model;
pub mod numerics;
pub mod objective;
pub mod optimization;
pub mod parameters;
