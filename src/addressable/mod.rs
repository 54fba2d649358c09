//! addressable — label-based access to numeric slots owned by domain objects.
//!
//! Domain objects are unrelated types. Each one registers the `f64` fields
//! an optimizer or report may touch in the model's [`Addressables`]; the
//! registry stores only [`NumericSlot`] capabilities keyed by label.

pub mod errors;
pub mod registry;
pub mod slot;

pub use self::errors::{AddrResult, AddressableError};
pub use self::registry::{AddressableHandle, Addressables};
pub use self::slot::{ElementSlot, NumericSlot, ScalarSlot};
