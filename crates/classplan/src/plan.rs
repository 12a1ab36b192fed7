//! The run pipeline: validate, analyze, build, solve, decode.

use thiserror::Error;
use tracing::{info, warn};

use classplan_config::{ConfigError, PlanConfig};
use classplan_core::{
    ClassId, CohortError, PairCensus, Placement, Roster, SciencePair, StudentId, StudentRecord,
};
use classplan_model::{apply_preference_objective, AssignmentModel, ModelError};
use classplan_solve::{
    BranchBoundSolver, SearchStats, SolveEngine, SolveOptions, SolveStatus, ValueOrdering,
};

/// A solved assignment: one placement per student plus the run facts a
/// report needs for reproducibility.
#[derive(Debug, Clone)]
pub struct Plan {
    pub placements: Vec<Placement>,
    /// Total objective value of the assignment.
    pub objective: i64,
    /// The science pair gating the privileged class this run.
    pub best_pair: SciencePair,
    /// OPTIMAL, or FEASIBLE when a limit ended the search early.
    pub status: SolveStatus,
    pub stats: SearchStats,
    /// Per-pair co-preference counts from the analysis step.
    pub pair_census: Vec<(SciencePair, u32)>,
}

impl Plan {
    /// Head counts per class, ascending by class id. Classes that ended up
    /// empty are omitted.
    pub fn class_sizes(&self) -> Vec<(ClassId, usize)> {
        let mut sizes: Vec<(ClassId, usize)> = Vec::new();
        for placement in &self.placements {
            match sizes.iter_mut().find(|(class, _)| *class == placement.class) {
                Some((_, count)) => *count += 1,
                None => sizes.push((placement.class, 1)),
            }
        }
        sizes.sort_unstable_by_key(|(class, _)| *class);
        sizes
    }

    /// The placement of one student, if present.
    pub fn placement_for(&self, student: StudentId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.student == student)
    }
}

/// Terminal outcomes of a run that produce no plan.
///
/// The three kinds of the error taxonomy stay distinguishable: input
/// validation, proven infeasibility, and an unresolved search. None of
/// them carries partial placement data.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Validation(#[from] CohortError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// The hard constraint set admits no assignment.
    #[error("no assignment satisfies the hard constraint families")]
    Infeasible { stats: SearchStats },

    /// A limit ended the search before any verdict.
    #[error("search ended without a verdict")]
    Unresolved { stats: SearchStats },
}

/// Runs the assignment pipeline for one cohort.
///
/// Each call builds a fresh model from the immutable roster snapshot;
/// nothing is shared between runs. The solve call is a single synchronous
/// delegation to the engine.
pub struct Planner {
    config: PlanConfig,
    options: SolveOptions,
}

impl Planner {
    /// Creates a planner; solve limits and ordering derive from the
    /// configuration's termination section and random seed.
    pub fn new(config: PlanConfig) -> Self {
        let options = SolveOptions {
            time_limit: config.time_limit(),
            node_limit: config.termination.as_ref().and_then(|t| t.node_limit),
            ordering: match config.random_seed {
                Some(seed) => ValueOrdering::Shuffled { seed },
                None => ValueOrdering::ObjectiveGain,
            },
        };
        Self { config, options }
    }

    /// Overrides the derived solve options.
    pub fn with_solve_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Validates raw records into a roster and plans it.
    pub fn plan_records(&self, records: Vec<StudentRecord>) -> Result<Plan, PlanError> {
        let roster = Roster::new(records)?;
        self.plan(&roster)
    }

    /// Plans a validated roster with the default engine.
    pub fn plan(&self, roster: &Roster) -> Result<Plan, PlanError> {
        self.plan_with(roster, &BranchBoundSolver::new())
    }

    /// Plans a validated roster, delegating the search to `engine`.
    pub fn plan_with(&self, roster: &Roster, engine: &dyn SolveEngine) -> Result<Plan, PlanError> {
        self.config.validate()?;

        let census = PairCensus::scan(roster);
        let best_pair = census.best_pair();
        info!(
            event = "pair_analysis",
            students = roster.len(),
            pair_lo = best_pair.lo().0,
            pair_hi = best_pair.hi().0,
        );

        let mut assignment = AssignmentModel::build(roster, best_pair, &self.config)?;
        apply_preference_objective(&mut assignment, roster, &self.config.weights);
        info!(
            event = "model_built",
            vars = assignment.model().num_vars(),
            constraints = assignment.model().constraints().len(),
        );

        let outcome = engine.solve(assignment.model(), &self.options);
        match outcome.status {
            SolveStatus::Optimal | SolveStatus::Feasible => {
                let Some(values) = outcome.values else {
                    // An engine claiming a solution must deliver values.
                    warn!(event = "engine_contract_violation", status = %outcome.status);
                    return Err(PlanError::Unresolved {
                        stats: outcome.stats,
                    });
                };
                let objective = outcome
                    .objective
                    .unwrap_or_else(|| assignment.model().objective().evaluate(&values));
                let placements = assignment.decode(&values);
                info!(
                    event = "plan_ready",
                    status = %outcome.status,
                    objective,
                    placements = placements.len(),
                );
                Ok(Plan {
                    placements,
                    objective,
                    best_pair,
                    status: outcome.status,
                    stats: outcome.stats,
                    pair_census: census.counts().to_vec(),
                })
            }
            SolveStatus::Infeasible => {
                warn!(event = "no_solution", status = %outcome.status);
                Err(PlanError::Infeasible {
                    stats: outcome.stats,
                })
            }
            SolveStatus::Unknown => {
                warn!(event = "no_verdict", status = %outcome.status);
                Err(PlanError::Unresolved {
                    stats: outcome.stats,
                })
            }
        }
    }
}
