//! Classplan - cohort class, language and science-track assignment
//!
//! Assigns a fixed cohort of students to classes, foreign-language tracks
//! and paired natural-science tracks. Hard organizational rules must hold;
//! stated preferences are honored as closely as class sizes and pairing
//! balance allow.
//!
//! # Example
//!
//! ```
//! use classplan::prelude::*;
//!
//! let roster = Roster::new(vec![
//!     StudentRecord {
//!         id: StudentId(1),
//!         gender: Gender::Female,
//!         languages: LanguageRanking::from_priorities([1, 2, 3, 4, 5]).unwrap(),
//!         sciences: ScienceRanking::from_priorities([1, 2, 3]).unwrap(),
//!         schoolmate: None,
//!         test_score: 71.0,
//!     },
//! ]).unwrap();
//!
//! let planner = Planner::new(PlanConfig::default());
//! let plan = planner.plan(&roster).unwrap();
//! assert_eq!(plan.placements.len(), 1);
//! ```

pub mod plan;
pub mod report;

pub use plan::{Plan, PlanError, Planner};
pub use report::{ReportError, RunReport};

// Domain and configuration surface, re-exported for callers.
pub use classplan_config::{
    CohortConfig, ConfigError, PlanConfig, RuleConfig, TerminationConfig, WeightConfig,
};
pub use classplan_core::{
    CohortError, Gender, LanguageId, LanguageRanking, PairCensus, Placement, Roster,
    ScienceId, SciencePair, ScienceRanking, StudentId, StudentRecord,
};
pub use classplan_solve::{
    BranchBoundSolver, SearchStats, SolveEngine, SolveOptions, SolveStatus, ValueOrdering,
};

pub mod prelude {
    pub use super::{Plan, PlanConfig, PlanError, Planner, RunReport};
    pub use super::{
        Gender, LanguageRanking, Placement, Roster, ScienceRanking, StudentId, StudentRecord,
    };
    pub use super::{BranchBoundSolver, SolveEngine, SolveOptions, SolveStatus};
}
