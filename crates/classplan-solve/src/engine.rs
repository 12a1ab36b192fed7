//! The solve capability interface.

use std::time::Duration;

use classplan_model::Model;

use crate::outcome::SolveOutcome;

/// How an engine orders the values of a branching variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueOrdering {
    /// Try the value with the highest static objective gain first. Falls
    /// back to ascending for variables without objective-linked
    /// indicators.
    #[default]
    ObjectiveGain,
    /// Plain ascending domain order.
    Ascending,
    /// A per-variable shuffle from a seeded generator; the same seed
    /// reproduces the same search.
    Shuffled { seed: u64 },
}

/// Caller-supplied limits and strategy for one solve call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveOptions {
    /// Wall-clock budget. On expiry the engine reports FEASIBLE with its
    /// incumbent or UNKNOWN without one, never partial values.
    pub time_limit: Option<Duration>,
    /// Search-node budget, same expiry semantics as the time limit.
    pub node_limit: Option<u64>,
    pub ordering: ValueOrdering,
}

/// A constraint/optimization engine the model can be delegated to.
///
/// The model side never relaxes or repairs anything: whatever status the
/// engine reports is the verdict for the run. Implementations must return
/// a value for every declared variable whenever they claim a solution.
pub trait SolveEngine {
    fn solve(&self, model: &Model, options: &SolveOptions) -> SolveOutcome;
}
