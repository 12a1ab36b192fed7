//! Engine results: status, values and search statistics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Verdict of one solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    /// A solution was found and proven best.
    Optimal,
    /// A solution was found, but a limit ended the search before proof.
    Feasible,
    /// The constraint set admits no assignment.
    Infeasible,
    /// A limit ended the search before any solution was found.
    Unknown,
}

impl SolveStatus {
    /// True if the outcome carries a full value assignment.
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Counters from one search run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Nodes entered, including pruned and conflicting ones.
    pub nodes: u64,
    /// Nodes abandoned on conflict or bound.
    pub backtracks: u64,
    pub elapsed_ms: u64,
}

/// Everything an engine hands back from one solve call.
///
/// `values` holds one concrete value per declared variable, in declaration
/// order, exactly when [`SolveStatus::has_solution`] is true. No partial
/// assignments exist on the other paths.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub values: Option<Vec<i32>>,
    pub objective: Option<i64>,
    pub stats: SearchStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solution_statuses() {
        assert!(SolveStatus::Optimal.has_solution());
        assert!(SolveStatus::Feasible.has_solution());
        assert!(!SolveStatus::Infeasible.has_solution());
        assert!(!SolveStatus::Unknown.has_solution());
    }

    #[test]
    fn status_display_matches_wire_names() {
        assert_eq!(SolveStatus::Infeasible.to_string(), "INFEASIBLE");
        assert_eq!(SolveStatus::Unknown.to_string(), "UNKNOWN");
    }
}
