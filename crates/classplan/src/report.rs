//! Serializable record of one run.
//!
//! Mirrors what the operators file away next to the assignment sheet: the
//! placements, the objective, the chosen pair, the search counters and the
//! full configuration, enough to reproduce the run.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use classplan_config::PlanConfig;
use classplan_core::Placement;
use classplan_solve::{SearchStats, SolveStatus};

use crate::plan::Plan;

/// Errors raised while rendering or writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One pair's co-preference count, flattened for serialization.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PairCount {
    pub lo: u8,
    pub hi: u8,
    pub students: u32,
}

/// The persistent record of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub objective: i64,
    pub status: SolveStatus,
    /// `[class, head count]` rows, ascending by class.
    pub class_sizes: Vec<(u8, usize)>,
    pub best_pair: (u8, u8),
    pub stats: SearchStats,
    pub config: PlanConfig,
    pub pair_census: Vec<PairCount>,
    pub placements: Vec<Placement>,
}

impl RunReport {
    /// Assembles the report for a solved plan.
    pub fn new(plan: &Plan, config: &PlanConfig) -> Self {
        Self {
            objective: plan.objective,
            status: plan.status,
            class_sizes: plan
                .class_sizes()
                .into_iter()
                .map(|(class, count)| (class.0, count))
                .collect(),
            best_pair: (plan.best_pair.lo().0, plan.best_pair.hi().0),
            stats: plan.stats,
            config: config.clone(),
            pair_census: plan
                .pair_census
                .iter()
                .map(|(pair, students)| PairCount {
                    lo: pair.lo().0,
                    hi: pair.hi().0,
                    students: *students,
                })
                .collect(),
            placements: plan.placements.clone(),
        }
    }

    /// Renders the report as TOML.
    pub fn to_toml_string(&self) -> Result<String, ReportError> {
        Ok(toml::to_string(self)?)
    }

    /// Writes the TOML rendering to a file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}
