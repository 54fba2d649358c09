//! Errors for parameter binding and configuration validation.
//!
//! Two layers live here:
//! - [`BindingError`]: raised by a single [`ParameterList`](super::ParameterList)
//!   call (`bind`, `add`, `add_table`, `get`). Each variant carries the
//!   parameter label and, when it is known, the configuration [`Location`].
//! - [`ConfigError`] / [`Diagnostics`] / [`ConfigErrors`]: the aggregated,
//!   user-facing report built during a validation pass. A pass pushes every
//!   problem it finds into a [`Diagnostics`] sink and only fails once, at the
//!   end, so a user sees all problems from one run.
//!
//! ## Conventions
//! - Line numbers are 1-based, as reported by the configuration loader.
//! - `DuplicateBinding`, `UnknownParameter` raised from `get`, and
//!   `TargetExpired` signal programming errors in the owning domain object
//!   ([`BindingError::is_programming_error`]). All other variants describe
//!   bad configuration input.
use std::fmt;

use crate::parameters::binder::Cardinality;

/// Result alias for binder operations that may produce [`BindingError`].
pub type BindResult<T> = Result<T, BindingError>;

/// Originating configuration position of a parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32) -> Location {
        Location { file: file.into(), line }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Failure of an individual binder call.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingError {
    // ---- Configuration input ----
    /// No parameter with this label was bound on the owning object.
    UnknownParameter { label: String, location: Option<Location> },

    /// A scalar parameter received a number of tokens other than one.
    WrongArity { label: String, cardinality: Cardinality, count: usize, location: Location },

    /// Plain values given to a table parameter, or a table given to a
    /// scalar or sequence parameter.
    CardinalityConflict { label: String, expected: Cardinality, supplied: Cardinality, location: Location },

    /// A token could not be converted into the bound target's type.
    InvalidToken { label: String, token: String, expected: &'static str, location: Location },

    /// A table row does not have one token per column.
    RaggedTable { label: String, row: usize, expected: usize, actual: usize, location: Location },

    /// A table with this label was already supplied.
    DuplicateTable { label: String, location: Location },

    // ---- Programming errors ----
    /// The label was bound twice on the same parameter list.
    DuplicateBinding { label: String },

    /// The domain object owning the bound target no longer exists.
    TargetExpired { label: String },
}

impl BindingError {
    /// Label of the offending parameter.
    pub fn label(&self) -> &str {
        match self {
            BindingError::UnknownParameter { label, .. }
            | BindingError::WrongArity { label, .. }
            | BindingError::CardinalityConflict { label, .. }
            | BindingError::InvalidToken { label, .. }
            | BindingError::RaggedTable { label, .. }
            | BindingError::DuplicateTable { label, .. }
            | BindingError::DuplicateBinding { label }
            | BindingError::TargetExpired { label } => label,
        }
    }

    /// Configuration location, when the failure is tied to one.
    pub fn location(&self) -> Option<&Location> {
        match self {
            BindingError::UnknownParameter { location, .. } => location.as_ref(),
            BindingError::WrongArity { location, .. }
            | BindingError::CardinalityConflict { location, .. }
            | BindingError::InvalidToken { location, .. }
            | BindingError::RaggedTable { location, .. }
            | BindingError::DuplicateTable { location, .. } => Some(location),
            BindingError::DuplicateBinding { .. } | BindingError::TargetExpired { .. } => None,
        }
    }

    /// Whether the failure is a defect in the owning domain object rather
    /// than bad configuration input.
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            BindingError::DuplicateBinding { .. }
                | BindingError::TargetExpired { .. }
                | BindingError::UnknownParameter { location: None, .. }
        )
    }
}

impl std::error::Error for BindingError {}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // ---- Configuration input ----
            BindingError::UnknownParameter { label, location: Some(location) } => {
                write!(f, "{location}: parameter '{label}' is not supported here")
            }
            BindingError::UnknownParameter { label, location: None } => {
                write!(f, "parameter '{label}' has not been bound")
            }
            BindingError::WrongArity { label, cardinality, count, location } => {
                write!(
                    f,
                    "{location}: parameter '{label}' is a {cardinality} and expects exactly one value; got {count}"
                )
            }
            BindingError::CardinalityConflict { label, expected, supplied, location } => {
                write!(f, "{location}: parameter '{label}' is a {expected} but was supplied as a {supplied}")
            }
            BindingError::InvalidToken { label, token, expected, location } => {
                write!(
                    f,
                    "{location}: value '{token}' for parameter '{label}' could not be converted to {expected}"
                )
            }
            BindingError::RaggedTable { label, row, expected, actual, location } => {
                write!(
                    f,
                    "{location}: row {row} of table '{label}' has {actual} values but the table has {expected} columns"
                )
            }
            BindingError::DuplicateTable { label, location } => {
                write!(f, "{location}: table '{label}' has already been defined")
            }

            // ---- Programming errors ----
            BindingError::DuplicateBinding { label } => {
                write!(f, "parameter '{label}' has already been bound")
            }
            BindingError::TargetExpired { label } => {
                write!(f, "target for parameter '{label}' no longer exists")
            }
        }
    }
}

/// One user-facing configuration problem found during validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    pub label: String,
    pub location: Option<Location>,
    pub message: String,
}

impl ConfigError {
    pub fn new(label: impl Into<String>, location: Option<Location>, message: impl Into<String>) -> Self {
        ConfigError { label: label.into(), location, message: message.into() }
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}: {}: {}", self.label, self.message),
            None => write!(f, "{}: {}", self.label, self.message),
        }
    }
}

impl From<BindingError> for ConfigError {
    fn from(err: BindingError) -> Self {
        ConfigError {
            label: err.label().to_string(),
            location: err.location().cloned(),
            message: err.to_string(),
        }
    }
}

/// Every problem found by one validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigErrors(pub Vec<ConfigError>);

impl ConfigErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfigError> {
        self.0.iter()
    }
}

impl std::error::Error for ConfigErrors {}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} configuration error(s):", self.0.len())?;
        for err in &self.0 {
            writeln!(f, "  {err}")?;
        }
        Ok(())
    }
}

/// Sink that collects configuration errors across a validation pass.
///
/// Validation code never returns early on user errors; it pushes into the
/// sink and keeps going. Call [`Diagnostics::into_result`] once the pass is
/// complete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    errors: Vec<ConfigError>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    pub fn push(&mut self, error: impl Into<ConfigError>) {
        self.errors.push(error.into());
    }

    /// Record a problem for `label` at an optional location.
    pub fn error(
        &mut self, label: impl Into<String>, location: Option<Location>, message: impl Into<String>,
    ) {
        self.errors.push(ConfigError::new(label, location, message));
    }

    /// Record `result`'s error, if any, and hand back the success value.
    pub fn collect<T, E: Into<ConfigError>>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(err.into());
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    /// Close the pass: `Ok(())` if nothing was recorded, otherwise every
    /// recorded error at once.
    pub fn into_result(self) -> Result<(), ConfigErrors> {
        if self.errors.is_empty() { Ok(()) } else { Err(ConfigErrors(self.errors)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Rendering of labels and locations in binding and config errors.
    // - Aggregation behavior of `Diagnostics`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Ensure a token conversion failure cites file, line, label and token.
    //
    // Expect
    // ------
    // - The rendered message contains every piece of context.
    fn invalid_token_message_cites_location_and_label() {
        // Arrange
        let err = BindingError::InvalidToken {
            label: "u_max".to_string(),
            token: "abc".to_string(),
            expected: "a real number",
            location: Location::new("model.csl2", 14),
        };

        // Act
        let text = err.to_string();

        // Assert
        assert!(text.starts_with("model.csl2:14:"), "got {text}");
        assert!(text.contains("u_max") && text.contains("abc"), "got {text}");
    }

    #[test]
    // Purpose
    // -------
    // Verify that `Diagnostics` keeps every pushed error and fails once.
    //
    // Given
    // -----
    // - Two unrelated problems pushed into one sink.
    //
    // Expect
    // ------
    // - `into_result` returns both errors, in push order.
    fn diagnostics_aggregates_all_errors() {
        // Arrange
        let mut diagnostics = Diagnostics::new();
        diagnostics.error("categories", None, "missing");
        diagnostics.push(BindingError::UnknownParameter {
            label: "catchh".to_string(),
            location: Some(Location::new("model.csl2", 3)),
        });

        // Act
        let result = diagnostics.into_result();

        // Assert
        let errors = result.expect_err("two problems were recorded");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.0[0].label, "categories");
        assert_eq!(errors.0[1].location, Some(Location::new("model.csl2", 3)));
    }

    #[test]
    fn empty_diagnostics_is_ok() {
        assert!(Diagnostics::new().into_result().is_ok());
    }
}
