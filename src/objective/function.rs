//! Objective function: one score from many named contributions.
//!
//! Purpose
//! -------
//! Collect every prior, penalty and likelihood term the model produces for
//! its current state and reduce them to the single scalar an optimizer
//! minimizes.
//!
//! Key behaviors
//! -------------
//! - [`ScoreSource`]: anything that can list its current contributions
//!   (the estimate set, the model's penalties and observations).
//! - [`ObjectiveFunction`]: the contract the optimizer adapter consumes.
//! - [`Objective`]: default implementation; sums all contributions and
//!   keeps the last breakdown for reporting.
//!
//! Invariants & assumptions
//! ------------------------
//! - Scores are rebuilt from scratch on each call; nothing carries over
//!   between calls, so two calls with no state change in between agree.
//! - Every contribution must be finite; otherwise the call fails with
//!   [`ObjectiveError::NonFiniteContribution`].
use std::fmt;

use crate::objective::errors::{ObjResult, ObjectiveError};

/// Family a contribution belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContributionKind {
    Prior,
    Bounds,
    Penalty,
    Likelihood,
}

impl fmt::Display for ContributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContributionKind::Prior => write!(f, "prior"),
            ContributionKind::Bounds => write!(f, "bounds"),
            ContributionKind::Penalty => write!(f, "penalty"),
            ContributionKind::Likelihood => write!(f, "likelihood"),
        }
    }
}

/// One named term of the objective.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub kind: ContributionKind,
    pub label: String,
    pub value: f64,
}

impl Contribution {
    pub fn new(kind: ContributionKind, label: impl Into<String>, value: f64) -> Contribution {
        Contribution { kind, label: label.into(), value }
    }
}

/// Producer of objective contributions for the current model state.
pub trait ScoreSource {
    /// Append this source's contributions to `sink`.
    fn contributions(&self, sink: &mut Vec<Contribution>) -> ObjResult<()>;
}

/// Contract the optimizer adapter relies on.
///
/// `calculate_score` must be a pure function of the state visible through
/// `sources` (and whatever the implementation reads directly); `score`
/// returns the value computed by the most recent call.
pub trait ObjectiveFunction {
    fn calculate_score(&mut self, sources: &[&dyn ScoreSource]) -> ObjResult<f64>;

    fn score(&self) -> f64;
}

/// Sum of every contribution from every source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Objective {
    contributions: Vec<Contribution>,
    score: f64,
}

impl Objective {
    pub fn new() -> Objective {
        Objective::default()
    }

    /// Breakdown from the last `calculate_score` call.
    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    /// Total of one contribution family from the last call.
    pub fn total(&self, kind: ContributionKind) -> f64 {
        self.contributions.iter().filter(|c| c.kind == kind).map(|c| c.value).sum()
    }
}

impl ObjectiveFunction for Objective {
    fn calculate_score(&mut self, sources: &[&dyn ScoreSource]) -> ObjResult<f64> {
        self.contributions.clear();
        self.score = 0.0;
        for source in sources {
            source.contributions(&mut self.contributions)?;
        }
        if let Some(bad) = self.contributions.iter().find(|c| !c.value.is_finite()) {
            return Err(ObjectiveError::NonFiniteContribution {
                label: bad.label.clone(),
                value: bad.value,
            });
        }
        self.score = self.contributions.iter().map(|c| c.value).sum();
        Ok(self.score)
    }

    fn score(&self) -> f64 {
        self.score
    }
}
