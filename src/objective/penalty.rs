//! Penalties triggered by processes while the model runs.
//!
//! A penalty is declared once in configuration with a multiplier. During a
//! run, a process that cannot do what it was asked (for example, take a
//! catch larger than `u_max` of the vulnerable biomass) calls
//! [`Penalties::trigger`] with what it wanted and what it could do. Each
//! trigger becomes one objective contribution. Triggers are cleared at the
//! start of every full iteration.
use std::collections::BTreeMap;

use tracing::warn;

use crate::{
    numerics::zero_fun,
    objective::{
        errors::{ObjResult, ObjectiveError},
        function::{Contribution, ContributionKind, ScoreSource},
    },
};

/// Declared penalty.
#[derive(Debug, Clone, PartialEq)]
pub struct Penalty {
    label: String,
    multiplier: f64,
    log_scale: bool,
}

impl Penalty {
    pub fn new(label: impl Into<String>, multiplier: f64, log_scale: bool) -> Penalty {
        Penalty { label: label.into(), multiplier, log_scale }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn log_scale(&self) -> bool {
        self.log_scale
    }

    /// `multiplier * (requested - available)^2`, or the same on log scale.
    pub fn score(&self, requested: f64, available: f64) -> f64 {
        let gap = if self.log_scale {
            zero_fun(requested).ln() - zero_fun(available).ln()
        } else {
            requested - available
        };
        self.multiplier * gap * gap
    }
}

/// One recorded trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct PenaltyTrigger {
    pub penalty: String,
    pub source: String,
    pub requested: f64,
    pub available: f64,
    pub score: f64,
}

/// Declared penalties plus the triggers recorded in the current run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Penalties {
    declared: BTreeMap<String, Penalty>,
    triggers: Vec<PenaltyTrigger>,
}

impl Penalties {
    pub fn new() -> Penalties {
        Penalties::default()
    }

    /// Declare a penalty; returns `false` if the label already exists.
    pub fn declare(&mut self, penalty: Penalty) -> bool {
        if self.declared.contains_key(penalty.label()) {
            return false;
        }
        self.declared.insert(penalty.label().to_string(), penalty);
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.declared.contains_key(label)
    }

    pub fn get(&self, label: &str) -> Option<&Penalty> {
        self.declared.get(label)
    }

    /// Record that `source` wanted `requested` but only `available` was
    /// possible.
    ///
    /// # Errors
    /// - [`ObjectiveError::UnknownPenalty`] if `penalty` was never declared.
    pub fn trigger(
        &mut self, penalty: &str, source: &str, requested: f64, available: f64,
    ) -> ObjResult<()> {
        let declared = self.declared.get(penalty).ok_or_else(|| ObjectiveError::UnknownPenalty {
            label: penalty.to_string(),
            source: source.to_string(),
        })?;
        let score = declared.score(requested, available);
        warn!(penalty, source, requested, available, score, "penalty triggered");
        self.triggers.push(PenaltyTrigger {
            penalty: penalty.to_string(),
            source: source.to_string(),
            requested,
            available,
            score,
        });
        Ok(())
    }

    pub fn triggers(&self) -> &[PenaltyTrigger] {
        &self.triggers
    }

    pub fn clear_triggers(&mut self) {
        self.triggers.clear();
    }
}

impl ScoreSource for Penalties {
    fn contributions(&self, sink: &mut Vec<Contribution>) -> ObjResult<()> {
        sink.extend(self.triggers.iter().map(|t| {
            Contribution::new(
                ContributionKind::Penalty,
                format!("{}:{}", t.penalty, t.source),
                t.score,
            )
        }));
        Ok(())
    }
}
