//! Classplan Model - Constraint encoding for cohort assignment
//!
//! This crate turns a validated roster and a chosen science pair into a
//! solver-ready model:
//! - Integer decision variables (class, language, two science slots per
//!   student) over small contiguous domains
//! - A closed constraint vocabulary of equalities, disequalities, counting
//!   bounds and reified indicators
//! - The nine hard-constraint families of the assignment problem
//! - A stratified linear objective over preference indicators
//!
//! The encoding is engine-agnostic: any engine that understands the
//! vocabulary in [`constraint`] can solve the model.

pub mod builder;
pub mod constraint;
pub mod error;
pub mod model;
pub mod objective;
pub mod var;

pub use builder::{AssignmentModel, StudentVars};
pub use constraint::{family, Constraint, ConstraintKind};
pub use error::ModelError;
pub use model::{LinearObjective, Model};
pub use objective::apply_preference_objective;
pub use var::{VarDef, VarId};
