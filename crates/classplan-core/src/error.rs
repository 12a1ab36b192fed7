//! Error types for the classplan domain model.

use thiserror::Error;

use crate::ids::{ScienceId, StudentId};

/// Errors raised while validating cohort input data.
///
/// Every variant is terminal for the run: no model is built from a roster
/// that fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CohortError {
    /// A preference ranking does not list every identifier exactly once.
    #[error("ranking {values:?} is not a permutation of 1..={expected}")]
    NotAPermutation { values: Vec<u8>, expected: u8 },

    /// Two records carry the same student id.
    #[error("duplicate student id {0}")]
    DuplicateStudent(StudentId),

    /// A schoolmate link points at an id missing from the roster.
    #[error("student {student} names unknown schoolmate {schoolmate}")]
    UnknownSchoolmate {
        student: StudentId,
        schoolmate: StudentId,
    },

    /// A schoolmate link points back at its own record.
    #[error("student {0} names themselves as schoolmate")]
    SelfSchoolmate(StudentId),

    /// The roster holds no students.
    #[error("roster holds no students")]
    EmptyRoster,

    /// A science pair was requested from a single subject.
    #[error("science subjects {0} and {0} do not form a pair")]
    DegeneratePair(ScienceId),
}

/// Result type alias for classplan domain operations.
pub type Result<T> = std::result::Result<T, CohortError>;
