//! Population processes run by the annual cycle.
//!
//! Each process is a [`Process`] built from one `process` block; the
//! block's `type` line picks the implementation through [`create`].

pub mod ageing;
pub mod mortality;
pub mod recruitment;

pub use self::ageing::Ageing;
pub use self::mortality::{DEFAULT_U_MAX, MortalityConstant, MortalityEvent, MortalityInitialisationEvent};
pub use self::recruitment::RecruitmentConstant;

use crate::{model::traits::Process, parameters::BindResult};

/// Block kind and addressable prefix.
pub const KIND: &str = "process";

/// Process of `type_name`, or `None` for an unknown type.
pub fn create(label: &str, type_name: &str) -> BindResult<Option<Box<dyn Process>>> {
    let process: Box<dyn Process> = match type_name {
        "recruitment_constant" => Box::new(RecruitmentConstant::new(label)?),
        "mortality_constant" => Box::new(MortalityConstant::new(label)?),
        "mortality_event" => Box::new(MortalityEvent::new(label)?),
        "mortality_initialisation_event" => Box::new(MortalityInitialisationEvent::new(label)?),
        "ageing" => Box::new(Ageing::new(label)?),
        _ => return Ok(None),
    };
    Ok(Some(process))
}
