//! The validated cohort snapshot handed to model construction.

use std::collections::HashMap;

use crate::error::{CohortError, Result};
use crate::ids::StudentId;
use crate::student::StudentRecord;

/// An immutable, validated collection of student records.
///
/// Construction checks the structural invariants the model builder relies
/// on: ids are unique, schoolmate links resolve to a roster member and
/// never point back at their own record. Preference rankings are already
/// validated by their own constructors.
///
/// The record order is preserved; model variables are declared in roster
/// order, which keeps runs reproducible for an unchanged input.
#[derive(Debug, Clone)]
pub struct Roster {
    students: Vec<StudentRecord>,
    index: HashMap<StudentId, usize>,
}

impl Roster {
    /// Validates and wraps a set of student records.
    pub fn new(students: Vec<StudentRecord>) -> Result<Self> {
        if students.is_empty() {
            return Err(CohortError::EmptyRoster);
        }

        let mut index = HashMap::with_capacity(students.len());
        for (position, record) in students.iter().enumerate() {
            if index.insert(record.id, position).is_some() {
                return Err(CohortError::DuplicateStudent(record.id));
            }
        }
        for record in &students {
            if let Some(mate) = record.schoolmate {
                if mate == record.id {
                    return Err(CohortError::SelfSchoolmate(record.id));
                }
                if !index.contains_key(&mate) {
                    return Err(CohortError::UnknownSchoolmate {
                        student: record.id,
                        schoolmate: mate,
                    });
                }
            }
        }

        Ok(Self { students, index })
    }

    /// All records in declaration order.
    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    /// Number of students.
    pub fn len(&self) -> usize {
        self.students.len()
    }

    /// True if the roster holds no students. Unreachable through [`Roster::new`].
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Looks up a record by id.
    pub fn get(&self, id: StudentId) -> Option<&StudentRecord> {
        self.index.get(&id).map(|&position| &self.students[position])
    }

    /// Position of a student in declaration order.
    pub fn position_of(&self, id: StudentId) -> Option<usize> {
        self.index.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{LanguageId, ScienceId};
    use crate::student::{Gender, LanguageRanking, ScienceRanking};

    fn record(id: u32, schoolmate: Option<u32>) -> StudentRecord {
        StudentRecord {
            id: StudentId(id),
            gender: Gender::Female,
            languages: LanguageRanking::new([1, 2, 3, 4, 5].map(LanguageId)).unwrap(),
            sciences: ScienceRanking::new([1, 2, 3].map(ScienceId)).unwrap(),
            schoolmate: schoolmate.map(StudentId),
            test_score: 0.0,
        }
    }

    #[test]
    fn accepts_valid_roster() {
        let roster = Roster::new(vec![record(1, Some(2)), record(2, None)]).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.position_of(StudentId(2)), Some(1));
        assert!(roster.get(StudentId(3)).is_none());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Roster::new(vec![record(7, None), record(7, None)]).unwrap_err();
        assert_eq!(err, CohortError::DuplicateStudent(StudentId(7)));
    }

    #[test]
    fn rejects_unknown_schoolmate() {
        let err = Roster::new(vec![record(1, Some(9))]).unwrap_err();
        assert_eq!(
            err,
            CohortError::UnknownSchoolmate {
                student: StudentId(1),
                schoolmate: StudentId(9),
            }
        );
    }

    #[test]
    fn rejects_self_schoolmate() {
        let err = Roster::new(vec![record(1, Some(1))]).unwrap_err();
        assert_eq!(err, CohortError::SelfSchoolmate(StudentId(1)));
    }

    #[test]
    fn rejects_empty_roster() {
        assert_eq!(Roster::new(vec![]).unwrap_err(), CohortError::EmptyRoster);
    }
}
