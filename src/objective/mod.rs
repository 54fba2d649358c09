//! objective — scoring the current model state.
//!
//! Purpose
//! -------
//! Turn priors, bound violations, penalties and observation likelihoods
//! into one scalar for the optimizer.
//!
//! Key behaviors
//! -------------
//! - [`ScoreSource`] lets unrelated components contribute named terms.
//! - [`ObjectiveFunction`] is the contract consumed by the calibration
//!   adapter; [`Objective`] is the summing default.
//! - [`Penalties`] records process triggers during a run and scores them.
//!
//! Conventions
//! -----------
//! - Lower is better; every contribution is a negative log-density or a
//!   non-negative penalty up to an additive constant.

pub mod errors;
pub mod function;
pub mod penalty;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{ObjResult, ObjectiveError};
pub use self::function::{Contribution, ContributionKind, Objective, ObjectiveFunction, ScoreSource};
pub use self::penalty::{Penalties, Penalty, PenaltyTrigger};
