//! Errors raised while assembling an objective score.
//!
//! None of these are user conditions. A non-finite contribution or a
//! penalty label nobody declared means the model was wired incorrectly, and
//! the evaluation stops rather than hand the optimizer a wrong score.
use std::fmt;

use crate::{addressable::AddressableError, estimates::EstimateError};

/// Result alias for objective assembly.
pub type ObjResult<T> = Result<T, ObjectiveError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectiveError {
    /// A source produced NaN or ±inf for a named contribution.
    NonFiniteContribution { label: String, value: f64 },

    /// A process triggered a penalty that was never declared.
    UnknownPenalty { label: String, source: String },

    /// Reading estimate state failed.
    Estimate(EstimateError),

    /// Reading an addressable failed.
    Addressable(AddressableError),
}

impl std::error::Error for ObjectiveError {}

impl fmt::Display for ObjectiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveError::NonFiniteContribution { label, value } => {
                write!(f, "objective contribution '{label}' is not finite: {value}")
            }
            ObjectiveError::UnknownPenalty { label, source } => {
                write!(f, "'{source}' triggered penalty '{label}', which does not exist")
            }
            ObjectiveError::Estimate(err) => write!(f, "{err}"),
            ObjectiveError::Addressable(err) => write!(f, "{err}"),
        }
    }
}

impl From<EstimateError> for ObjectiveError {
    fn from(err: EstimateError) -> Self {
        ObjectiveError::Estimate(err)
    }
}

impl From<AddressableError> for ObjectiveError {
    fn from(err: AddressableError) -> Self {
        ObjectiveError::Addressable(err)
    }
}
