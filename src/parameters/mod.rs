//! parameters — typed configuration binding with provenance.
//!
//! Purpose
//! -------
//! Populate strongly typed fields scattered across domain objects from raw
//! configuration tokens, with cardinality checks, defaults and file/line
//! provenance for every value.
//!
//! Key behaviors
//! -------------
//! - [`Bound<T>`]: the shared handle a domain object keeps for each field
//!   configuration may write.
//! - [`ParameterList`]: per-object catalog of [`Binding`]s; `add` parses
//!   tokens into targets, `add_table` stores [`Table`]s.
//! - [`Diagnostics`]: the aggregate sink used by validation passes so all
//!   configuration errors surface together.
//!
//! Conventions
//! -----------
//! - User-facing failures are [`BindingError`] or [`ConfigError`] values
//!   that always carry the parameter label and, once known, its
//!   [`Location`].
//! - Token parsing is defined per type by [`FromToken`].

pub mod binder;
pub mod bound;
pub mod errors;
pub mod table;
pub mod tokens;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::binder::{Binding, Cardinality, Parameter, ParameterList};
pub use self::bound::Bound;
pub use self::errors::{BindResult, BindingError, ConfigError, ConfigErrors, Diagnostics, Location};
pub use self::table::Table;
pub use self::tokens::FromToken;
