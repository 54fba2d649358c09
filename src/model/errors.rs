//! Errors raised while building or running a population model.
//!
//! Building reports every configuration problem at once through
//! [`ModelError::Config`]. The remaining variants are internal failures
//! (a slot that vanished, a penalty nobody declared, a partition that went
//! non-finite) and stop the run.
use std::fmt;

use crate::{
    addressable::AddressableError,
    estimates::EstimateError,
    objective::ObjectiveError,
    parameters::{BindingError, ConfigErrors},
};

/// Result alias for model construction and execution.
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// All configuration errors found while building.
    Config(ConfigErrors),

    /// A component bound the same parameter twice.
    Binding(BindingError),

    Addressable(AddressableError),

    Estimate(EstimateError),

    Objective(ObjectiveError),

    /// A process left NaN or ±inf in the partition; `year` is `None`
    /// during initialisation.
    NonFiniteState { process: String, year: Option<u32> },
}

impl std::error::Error for ModelError {}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Config(errors) => write!(f, "invalid model configuration: {errors}"),
            ModelError::Binding(err) => write!(f, "{err}"),
            ModelError::Addressable(err) => write!(f, "{err}"),
            ModelError::Estimate(err) => write!(f, "{err}"),
            ModelError::Objective(err) => write!(f, "{err}"),
            ModelError::NonFiniteState { process, year: Some(year) } => {
                write!(f, "process '{process}' produced non-finite numbers in year {year}")
            }
            ModelError::NonFiniteState { process, year: None } => {
                write!(f, "process '{process}' produced non-finite numbers during initialisation")
            }
        }
    }
}

impl From<ConfigErrors> for ModelError {
    fn from(errors: ConfigErrors) -> Self {
        ModelError::Config(errors)
    }
}

impl From<BindingError> for ModelError {
    fn from(err: BindingError) -> Self {
        ModelError::Binding(err)
    }
}

impl From<AddressableError> for ModelError {
    fn from(err: AddressableError) -> Self {
        ModelError::Addressable(err)
    }
}

impl From<EstimateError> for ModelError {
    fn from(err: EstimateError) -> Self {
        ModelError::Estimate(err)
    }
}

impl From<ObjectiveError> for ModelError {
    fn from(err: ObjectiveError) -> Self {
        ModelError::Objective(err)
    }
}
