//! optimization — calibration adapter, minimiser and covariance.
//!
//! Purpose
//! -------
//! Connect the model to an optimizer. [`Calibration`] turns a trial vector
//! into a score; [`minimiser`] searches for the best vector with argmin;
//! [`covariance`] approximates the uncertainty around it.
//!
//! Key behaviors
//! -------------
//! - One error surface ([`OptError`], [`OptResult`]) for option validation,
//!   evaluation failures and backend solver errors.
//! - Evaluation goes through `&self` so argmin can call it freely; the
//!   model and objective are mutated behind `RefCell`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every failure is returned, never panicked; callers never see raw
//!   argmin errors.
//!
//! Downstream usage
//! ----------------
//! - Build a model and its estimate set, wrap them in a [`Calibration`]
//!   and call [`minimise`]; optionally follow with
//!   [`covariance::covariance_matrix`] at `θ̂`.

pub mod calibration;
pub mod covariance;
pub mod errors;
pub mod minimiser;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::calibration::Calibration;
pub use self::errors::{OptError, OptResult};
pub use self::minimiser::{
    LineSearcher, Method, MinimiseOutcome, MinimiserOptions, Theta, Tolerances, minimise,
};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::calibration::Calibration;
    pub use super::errors::{OptError, OptResult};
    pub use super::minimiser::{MinimiseOutcome, MinimiserOptions, Tolerances, minimise};
}
