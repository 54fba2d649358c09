//! estimates — parameters the optimizer is allowed to move.
//!
//! Purpose
//! -------
//! Describe which addressable values are free, within which bounds, under
//! which transform and with which prior, and present the enabled ones to
//! the optimizer as a fixed-order vector.
//!
//! Key behaviors
//! -------------
//! - [`Estimate`]: bounds, [`Transform`], [`Prior`] and an addressable
//!   handle; reads and writes go straight to the owning object.
//! - [`EstimateSet`]: declaration-order collection with a frozen enabled
//!   order, index-based (transformed) accessors and prior/bound scoring.
//!
//! Invariants & assumptions
//! ------------------------
//! - Bounds are finite with `lower < upper` and lie in the transform's
//!   domain; violations are configuration errors.
//! - The enabled order is frozen before the first evaluation and never
//!   changes afterwards.
//!
//! Testing notes
//! -------------
//! - Transform inverse laws live in [`transform`]; order and scoring
//!   behavior in [`set`].

pub mod errors;
pub mod estimate;
pub mod prior;
pub mod set;
pub mod transform;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{EstimateError, EstimateResult};
pub use self::estimate::Estimate;
pub use self::prior::Prior;
pub use self::set::{BOUND_PENALTY, EstimateSet};
pub use self::transform::Transform;
