//! Errors for estimate declaration and access.
//!
//! Two groups live here. Declaration errors (bad bounds, bounds outside a
//! transform's domain, bad prior hyper-parameters, duplicate estimates)
//! come from user configuration and convert into [`ConfigError`]. Access
//! errors (index out of range, order not built, order frozen, expired
//! slot) are internal and fatal.
use std::fmt;

use crate::{
    addressable::AddressableError,
    estimates::transform::Transform,
    parameters::ConfigError,
};

/// Result alias for estimate operations.
pub type EstimateResult<T> = Result<T, EstimateError>;

#[derive(Debug, Clone, PartialEq)]
pub enum EstimateError {
    // ---- Declaration ----
    /// `lower` must be finite, `upper` finite, and `lower < upper`.
    InvalidBounds { label: String, lower: f64, upper: f64 },

    /// Bounds reach outside the set where the transform is defined.
    OutsideTransformDomain { label: String, transform: Transform, lower: f64, upper: f64 },

    /// Prior hyper-parameters were rejected.
    InvalidPrior { label: String, reason: String },

    /// The same addressable was declared as an estimate twice.
    DuplicateEstimate { label: String },

    /// No estimate has this label.
    UnknownEstimate { label: String },

    // ---- Access ----
    /// Index past the end of the enabled order.
    IndexOutOfRange { index: usize, len: usize },

    /// Index access before `build_enabled_order`.
    OrderNotBuilt,

    /// Enabled flags cannot change once the order is built.
    OrderFrozen { label: String },

    /// The underlying slot failed.
    Addressable(AddressableError),
}

impl EstimateError {
    pub fn is_declaration_error(&self) -> bool {
        matches!(
            self,
            EstimateError::InvalidBounds { .. }
                | EstimateError::OutsideTransformDomain { .. }
                | EstimateError::InvalidPrior { .. }
                | EstimateError::DuplicateEstimate { .. }
                | EstimateError::UnknownEstimate { .. }
        )
    }
}

impl std::error::Error for EstimateError {}

impl fmt::Display for EstimateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // ---- Declaration ----
            EstimateError::InvalidBounds { label, lower, upper } => write!(
                f,
                "estimate '{label}': bounds must be finite with lower < upper; got [{lower}, {upper}]"
            ),
            EstimateError::OutsideTransformDomain { label, transform, lower, upper } => write!(
                f,
                "estimate '{label}': bounds [{lower}, {upper}] fall outside the domain of the {transform} transformation"
            ),
            EstimateError::InvalidPrior { label, reason } => {
                write!(f, "estimate '{label}': invalid prior: {reason}")
            }
            EstimateError::DuplicateEstimate { label } => {
                write!(f, "parameter '{label}' is already estimated")
            }
            EstimateError::UnknownEstimate { label } => write!(f, "no estimate for '{label}'"),

            // ---- Access ----
            EstimateError::IndexOutOfRange { index, len } => {
                write!(f, "estimate index {index} out of range for {len} enabled estimates")
            }
            EstimateError::OrderNotBuilt => {
                write!(f, "enabled estimate order has not been built")
            }
            EstimateError::OrderFrozen { label } => write!(
                f,
                "cannot change enabled flag of '{label}' after the estimate order was built"
            ),
            EstimateError::Addressable(err) => write!(f, "{err}"),
        }
    }
}

impl From<AddressableError> for EstimateError {
    fn from(err: AddressableError) -> Self {
        EstimateError::Addressable(err)
    }
}

impl From<EstimateError> for ConfigError {
    fn from(err: EstimateError) -> Self {
        let label = match &err {
            EstimateError::InvalidBounds { label, .. }
            | EstimateError::OutsideTransformDomain { label, .. }
            | EstimateError::InvalidPrior { label, .. }
            | EstimateError::DuplicateEstimate { label }
            | EstimateError::UnknownEstimate { label }
            | EstimateError::OrderFrozen { label } => label.clone(),
            EstimateError::Addressable(inner) => inner.label().to_string(),
            EstimateError::IndexOutOfRange { .. } | EstimateError::OrderNotBuilt => String::new(),
        };
        ConfigError::new(label, None, err.to_string())
    }
}
