//! Errors for the addressable registry.
//!
//! Every variant here is an internal consistency failure: configuration
//! never reaches the registry directly, so a bad label means a domain object
//! or the estimate set was wired incorrectly. Callers propagate these and
//! stop; they are never turned into user diagnostics.
use std::fmt;

/// Result alias for registry operations.
pub type AddrResult<T> = Result<T, AddressableError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressableError {
    /// A second slot was registered under an existing label.
    DuplicateLabel { label: String },

    /// No slot is registered under this label.
    UnknownLabel { label: String },

    /// The owner of the slot has been dropped.
    Expired { label: String },
}

impl AddressableError {
    pub fn label(&self) -> &str {
        match self {
            AddressableError::DuplicateLabel { label }
            | AddressableError::UnknownLabel { label }
            | AddressableError::Expired { label } => label,
        }
    }
}

impl std::error::Error for AddressableError {}

impl fmt::Display for AddressableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressableError::DuplicateLabel { label } => {
                write!(f, "addressable '{label}' is already registered in this model")
            }
            AddressableError::UnknownLabel { label } => {
                write!(f, "addressable '{label}' is not registered in this model")
            }
            AddressableError::Expired { label } => {
                write!(f, "addressable '{label}' refers to an object that no longer exists")
            }
        }
    }
}
