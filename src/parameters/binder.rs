//! Parameter binder: labels → typed, domain-owned targets.
//!
//! Purpose
//! -------
//! Let each domain object declare, at construction time, which labels it
//! accepts from configuration and where the parsed values land. The object
//! owns its targets as [`Bound<T>`] fields; its [`ParameterList`] keeps a
//! weak handle per label plus the raw tokens and provenance needed for
//! diagnostics.
//!
//! Key behaviors
//! -------------
//! - [`ParameterList::bind`] takes one tagged [`Binding`] (scalar, optional
//!   scalar with default, or sequence) and reports the [`Cardinality`] it
//!   registered. Optional scalars write their default into the target
//!   immediately.
//! - [`ParameterList::add`] converts raw tokens into the target's type and
//!   records the originating file and line, even when conversion fails.
//! - [`ParameterList::add_table`] stores a [`Table`] after checking that
//!   every row matches the column count.
//! - [`ParameterList::check_required`] reports every required parameter the
//!   configuration never supplied.
//!
//! Invariants & assumptions
//! ------------------------
//! - The binder guarantees each parameter is internally well formed. Cross
//!   field rules (equal lengths, ranges) belong to the owning object's
//!   validation pass.
//! - Sequence assignment is all-or-nothing: if any token fails to convert
//!   the target keeps its previous contents.
//! - Re-binding a label is a programming error in the owning object.
use std::{
    cell::RefCell,
    collections::BTreeMap,
    fmt,
    rc::Weak,
};

use crate::parameters::{
    bound::Bound,
    errors::{BindResult, BindingError, Diagnostics, Location},
    table::Table,
    tokens::FromToken,
};

/// Shape of a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    Scalar,
    Sequence,
    Table,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Scalar => write!(f, "scalar"),
            Cardinality::Sequence => write!(f, "sequence"),
            Cardinality::Table => write!(f, "table"),
        }
    }
}

enum TargetFailure {
    Expired,
    Token { token: String, expected: &'static str },
}

/// Type-erased write access to one bound target.
trait BindTarget {
    fn assign(&self, values: &[String]) -> Result<(), TargetFailure>;

    /// Number of elements currently held, `None` once the owner is gone.
    fn len(&self) -> Option<usize>;
}

struct ScalarTarget<T> {
    target: Weak<RefCell<T>>,
}

impl<T: FromToken> BindTarget for ScalarTarget<T> {
    fn assign(&self, values: &[String]) -> Result<(), TargetFailure> {
        let target = self.target.upgrade().ok_or(TargetFailure::Expired)?;
        let token = values.first().map(String::as_str).unwrap_or_default();
        let value = T::from_token(token)
            .ok_or_else(|| TargetFailure::Token { token: token.to_string(), expected: T::EXPECTED })?;
        *target.borrow_mut() = value;
        Ok(())
    }

    fn len(&self) -> Option<usize> {
        self.target.upgrade().map(|_| 1)
    }
}

struct SequenceTarget<T> {
    target: Weak<RefCell<Vec<T>>>,
}

impl<T: FromToken> BindTarget for SequenceTarget<T> {
    fn assign(&self, values: &[String]) -> Result<(), TargetFailure> {
        let target = self.target.upgrade().ok_or(TargetFailure::Expired)?;
        let parsed = values
            .iter()
            .map(|token| {
                T::from_token(token)
                    .ok_or_else(|| TargetFailure::Token { token: token.clone(), expected: T::EXPECTED })
            })
            .collect::<Result<Vec<T>, _>>()?;
        *target.borrow_mut() = parsed;
        Ok(())
    }

    fn len(&self) -> Option<usize> {
        self.target.upgrade().map(|t| t.borrow().len())
    }
}

/// A target plus its cardinality-specific binding options.
///
/// Build one with [`Binding::scalar`], [`Binding::scalar_or`] or
/// [`Binding::sequence`] and hand it to [`ParameterList::bind`].
pub struct Binding {
    cardinality: Cardinality,
    target: Box<dyn BindTarget>,
    optional: bool,
    default: Option<String>,
}

impl Binding {
    /// Required scalar.
    pub fn scalar<T: FromToken + 'static>(target: &Bound<T>) -> Binding {
        Binding {
            cardinality: Cardinality::Scalar,
            target: Box::new(ScalarTarget { target: target.downgrade() }),
            optional: false,
            default: None,
        }
    }

    /// Optional scalar; `default` is written into `target` right away.
    pub fn scalar_or<T: FromToken + fmt::Display + 'static>(target: &Bound<T>, default: T) -> Binding {
        let rendered = default.to_string();
        target.set(default);
        Binding {
            cardinality: Cardinality::Scalar,
            target: Box::new(ScalarTarget { target: target.downgrade() }),
            optional: true,
            default: Some(rendered),
        }
    }

    /// Ordered sequence; `optional` allows it to stay empty.
    pub fn sequence<T: FromToken + 'static>(target: &Bound<Vec<T>>, optional: bool) -> Binding {
        Binding {
            cardinality: Cardinality::Sequence,
            target: Box::new(SequenceTarget { target: target.downgrade() }),
            optional,
            default: None,
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }
}

/// Binder-side record of one parameter.
pub struct Parameter {
    label: String,
    description: String,
    cardinality: Cardinality,
    optional: bool,
    default: Option<String>,
    values: Vec<String>,
    location: Option<Location>,
    target: Option<Box<dyn BindTarget>>,
    table: Option<Table>,
}

impl Parameter {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Rendered default value (optional scalars only).
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Raw tokens from the last `add`, empty if never supplied.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Where the value was supplied; `None` until configuration provides it.
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn has_been_defined(&self) -> bool {
        self.location.is_some()
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("label", &self.label)
            .field("cardinality", &self.cardinality)
            .field("optional", &self.optional)
            .field("default", &self.default)
            .field("values", &self.values)
            .field("location", &self.location)
            .finish()
    }
}

/// All parameters one domain object accepts from configuration.
#[derive(Debug, Default)]
pub struct ParameterList {
    parameters: BTreeMap<String, Parameter>,
}

impl ParameterList {
    pub fn new() -> ParameterList {
        ParameterList::default()
    }

    /// Register `binding` under `label`.
    ///
    /// # Errors
    /// - [`BindingError::DuplicateBinding`] if `label` is already bound.
    pub fn bind(&mut self, label: &str, binding: Binding, description: &str) -> BindResult<Cardinality> {
        if self.parameters.contains_key(label) {
            return Err(BindingError::DuplicateBinding { label: label.to_string() });
        }
        let cardinality = binding.cardinality;
        self.parameters.insert(
            label.to_string(),
            Parameter {
                label: label.to_string(),
                description: description.to_string(),
                cardinality,
                optional: binding.optional,
                default: binding.default,
                values: Vec::new(),
                location: None,
                target: Some(binding.target),
                table: None,
            },
        );
        Ok(cardinality)
    }

    /// Declare a table the owner expects; `optional` allows it to be absent.
    pub fn bind_table(&mut self, label: &str, description: &str, optional: bool) -> BindResult<Cardinality> {
        if self.parameters.contains_key(label) {
            return Err(BindingError::DuplicateBinding { label: label.to_string() });
        }
        self.parameters.insert(
            label.to_string(),
            Parameter {
                label: label.to_string(),
                description: description.to_string(),
                cardinality: Cardinality::Table,
                optional,
                default: None,
                values: Vec::new(),
                location: None,
                target: None,
                table: None,
            },
        );
        Ok(Cardinality::Table)
    }

    /// Parse `values` into the target bound under `label`.
    ///
    /// Provenance is recorded before conversion so a failed conversion still
    /// leaves the parameter pointing at the offending line.
    ///
    /// # Errors
    /// - [`BindingError::UnknownParameter`] when `label` was never bound.
    /// - [`BindingError::WrongArity`] when a scalar receives other than one
    ///   token.
    /// - [`BindingError::CardinalityConflict`] when a table label receives
    ///   plain values.
    /// - [`BindingError::InvalidToken`] for the first token that does not
    ///   convert.
    /// - [`BindingError::TargetExpired`] if the owner dropped the target.
    pub fn add<S: AsRef<str>>(&mut self, label: &str, values: &[S], file: &str, line: u32) -> BindResult<()> {
        let location = Location::new(file, line);
        let Some(parameter) = self.parameters.get_mut(label) else {
            return Err(BindingError::UnknownParameter {
                label: label.to_string(),
                location: Some(location),
            });
        };
        parameter.values = values.iter().map(|v| v.as_ref().to_string()).collect();
        parameter.location = Some(location.clone());

        let count = parameter.values.len();
        match parameter.cardinality {
            Cardinality::Scalar if count != 1 => {
                return Err(BindingError::WrongArity {
                    label: label.to_string(),
                    cardinality: Cardinality::Scalar,
                    count,
                    location,
                });
            }
            Cardinality::Table => {
                return Err(BindingError::CardinalityConflict {
                    label: label.to_string(),
                    expected: Cardinality::Table,
                    supplied: Cardinality::Sequence,
                    location,
                });
            }
            _ => {}
        }

        if let Some(target) = &parameter.target {
            target.assign(&parameter.values).map_err(|failure| match failure {
                TargetFailure::Expired => BindingError::TargetExpired { label: label.to_string() },
                TargetFailure::Token { token, expected } => BindingError::InvalidToken {
                    label: label.to_string(),
                    token,
                    expected,
                    location,
                },
            })?;
        }
        Ok(())
    }

    /// Store a table parameter built from `columns` and `rows`.
    ///
    /// A label that was not declared with [`ParameterList::bind_table`] is
    /// created on the fly as an optional table.
    ///
    /// # Errors
    /// - [`BindingError::RaggedTable`] for the first row (1-based) whose
    ///   width differs from `columns.len()`; nothing is stored.
    /// - [`BindingError::DuplicateTable`] if the table was already supplied.
    /// - [`BindingError::CardinalityConflict`] if `label` is bound as a
    ///   non-table.
    pub fn add_table(
        &mut self, label: &str, columns: Vec<String>, rows: Vec<Vec<String>>, file: &str, line: u32,
    ) -> BindResult<()> {
        let location = Location::new(file, line);
        if let Some(existing) = self.parameters.get(label) {
            if existing.cardinality != Cardinality::Table {
                return Err(BindingError::CardinalityConflict {
                    label: label.to_string(),
                    expected: existing.cardinality,
                    supplied: Cardinality::Table,
                    location,
                });
            }
            if existing.table.is_some() {
                return Err(BindingError::DuplicateTable { label: label.to_string(), location });
            }
        }

        let expected = columns.len();
        let mut table = Table::new(label, columns);
        for (index, row) in rows.into_iter().enumerate() {
            if let Err(row) = table.add_row(row) {
                return Err(BindingError::RaggedTable {
                    label: label.to_string(),
                    row: index + 1,
                    expected,
                    actual: row.len(),
                    location,
                });
            }
        }

        let parameter = self.parameters.entry(label.to_string()).or_insert_with(|| Parameter {
            label: label.to_string(),
            description: String::new(),
            cardinality: Cardinality::Table,
            optional: true,
            default: None,
            values: Vec::new(),
            location: None,
            target: None,
            table: None,
        });
        parameter.location = Some(location);
        parameter.table = Some(table);
        Ok(())
    }

    /// Parameter record for `label`.
    ///
    /// Asking for a label the owner never bound is a programming error; the
    /// returned [`BindingError::UnknownParameter`] carries no location.
    pub fn get(&self, label: &str) -> BindResult<&Parameter> {
        self.parameters
            .get(label)
            .ok_or_else(|| BindingError::UnknownParameter { label: label.to_string(), location: None })
    }

    /// Table supplied under `label`, if any.
    pub fn table(&self, label: &str) -> Option<&Table> {
        self.parameters.get(label).and_then(|p| p.table.as_ref())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.parameters.contains_key(label)
    }

    /// `true` once configuration has supplied `label`.
    pub fn is_defined(&self, label: &str) -> bool {
        self.parameters.get(label).is_some_and(Parameter::has_been_defined)
    }

    /// Location of `label` for error messages: `"file:line: label"`, or just
    /// the label when no configuration line supplied it.
    pub fn location_of(&self, label: &str) -> Option<Location> {
        self.parameters.get(label).and_then(|p| p.location.clone())
    }

    pub fn location(&self, label: &str) -> String {
        match self.location_of(label) {
            Some(location) => format!("{location}: {label}"),
            None => label.to_string(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Report every required parameter that configuration left unset.
    ///
    /// A required sequence that was supplied with zero tokens is reported
    /// too, at the line that supplied it.
    pub fn check_required(&self, diagnostics: &mut Diagnostics) {
        for parameter in self.parameters.values().filter(|p| !p.optional) {
            match parameter.cardinality {
                Cardinality::Table if parameter.table.is_none() => {
                    diagnostics.error(&parameter.label, None, "table is required but was not supplied");
                }
                Cardinality::Scalar | Cardinality::Sequence if parameter.location.is_none() => {
                    diagnostics.error(&parameter.label, None, "parameter is required but was not supplied");
                }
                Cardinality::Sequence => {
                    let empty = parameter.target.as_ref().and_then(|t| t.len()) == Some(0);
                    if empty {
                        diagnostics.error(
                            &parameter.label,
                            parameter.location.clone(),
                            "at least one value is required",
                        );
                    }
                }
                _ => {}
            }
        }
    }
}
