//! model — the model contract and an age-structured population model.
//!
//! Purpose
//! -------
//! Define what the calibration layer needs from a model ([`Model`]) and
//! provide a small configurable implementation ([`PopulationModel`]) whose
//! processes, selectivities and observations are populated from
//! [`ConfigBlock`]s and exposed as addressables.
//!
//! Key behaviors
//! -------------
//! - Components bind their fields into a
//!   [`ParameterList`](crate::parameters::ParameterList), validate across
//!   fields, resolve labels at build time and register addressables.
//! - The annual cycle runs processes in configured order over a
//!   categories × ages [`Partition`].
//! - Catch shortfalls trigger penalties; abundance indices add log-normal
//!   likelihoods.
//!
//! Conventions
//! -----------
//! - Block kinds: `model`, `selectivity`, `process`, `observation`,
//!   `penalty`, `estimate`. Concrete types are chosen by each block's
//!   `type` line, matched case-insensitively.

pub mod config;
pub mod errors;
pub mod estimate_block;
pub mod observation;
pub mod partition;
pub mod population;
pub mod processes;
pub mod selectivity;
pub mod settings;
pub mod traits;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::config::{ConfigBlock, ConfigLine, ConfigTable};
pub use self::errors::{ModelError, ModelResult};
pub use self::observation::AbundanceObservation;
pub use self::partition::Partition;
pub use self::population::PopulationModel;
pub use self::selectivity::Selectivity;
pub use self::settings::ModelSettings;
pub use self::traits::{Component, Model, Phase, Process};
