//! Classplan Core - Domain types for cohort class assignment
//!
//! This crate provides the fundamental types for classplan:
//! - Identifier newtypes for students, classes, languages and sciences
//! - Validated student records with permutation-checked preference rankings
//! - The roster snapshot handed to model construction
//! - The preference-pair census that selects the jointly preferred
//!   science pair for the privileged class

pub mod error;
pub mod ids;
pub mod pairing;
pub mod placement;
pub mod roster;
pub mod student;

pub use error::{CohortError, Result};
pub use ids::{ClassId, LanguageId, ScienceId, StudentId, LANGUAGE_COUNT, SCIENCE_COUNT};
pub use pairing::{PairCensus, SciencePair};
pub use placement::Placement;
pub use roster::Roster;
pub use student::{Gender, LanguageRanking, ScienceRanking, StudentRecord};
