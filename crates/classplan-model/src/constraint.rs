//! The constraint vocabulary posted to a solve engine.
//!
//! Every hard rule of the assignment problem is expressed with these few
//! shapes; an engine that filters all of them correctly solves any model
//! this crate builds.

use crate::var::VarId;

/// Names of the constraint families, used in diagnostics and logs so an
/// infeasible run can name the rules involved.
pub mod family {
    pub const CLASS_CAPACITY: &str = "class_capacity";
    pub const LANGUAGE_CAPACITY: &str = "language_capacity";
    pub const SCIENCE_CAPACITY: &str = "science_capacity";
    pub const SLOT_DISTINCTNESS: &str = "slot_distinctness";
    pub const SCHOOLMATE: &str = "schoolmate";
    pub const PRIVILEGED_PAIR: &str = "privileged_pair";
    pub const GENDER_COHESION: &str = "gender_cohesion";
    pub const FORCED_LANGUAGE: &str = "forced_language";
    pub const LANGUAGE_CLASS_COUPLING: &str = "language_class_coupling";
    /// Indicator-to-variable channeling links shared across families.
    pub const CHANNEL: &str = "channel";
}

/// One constraint shape over declared variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    /// `x == y`
    EqVar(VarId, VarId),

    /// `x != y`
    NeVar(VarId, VarId),

    /// `x == value`
    EqConst(VarId, i32),

    /// Sum of 0/1 variables is at most `bound`.
    SumLe { terms: Vec<VarId>, bound: i64 },

    /// Sum of 0/1 variables equals the 0/1 variable `target`.
    SumEqVar { terms: Vec<VarId>, target: VarId },

    /// `lit == 1` exactly when `var == value` (full reification).
    IffEq { lit: VarId, var: VarId, value: i32 },

    /// `lit == 1` exactly when every operand is 1.
    IffAnd { lit: VarId, operands: Vec<VarId> },
}

/// A posted constraint, tagged with the family it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub family: &'static str,
    pub kind: ConstraintKind,
}
