//! Student records and their preference rankings.

use crate::error::{CohortError, Result};
use crate::ids::{LanguageId, ScienceId, StudentId, LANGUAGE_COUNT, SCIENCE_COUNT};

/// Gender attribute of a student.
///
/// Used by exactly one hard constraint: the configured subgroup is kept
/// together in a single class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Gender {
    Female,
    Male,
}

/// A student's language preferences as a rank-ordered list.
///
/// Index 0 holds the most preferred language. The list must be a
/// permutation of all five language identifiers; anything else is a
/// validation failure, never repaired here.
///
/// # Examples
///
/// ```
/// use classplan_core::{LanguageId, LanguageRanking};
///
/// let ranking = LanguageRanking::new(
///     [3, 1, 2, 5, 4].map(LanguageId),
/// ).unwrap();
/// assert_eq!(ranking.top(), LanguageId(3));
/// assert_eq!(ranking.at_rank(2), Some(LanguageId(1)));
///
/// // The spreadsheet form lists a priority per language instead;
/// // priority 1 for language 2 means language 2 is the top choice.
/// let same = LanguageRanking::from_priorities([2, 3, 1, 5, 4]).unwrap();
/// assert_eq!(same.top(), LanguageId(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "[LanguageId; 5]", into = "[LanguageId; 5]")
)]
pub struct LanguageRanking([LanguageId; LANGUAGE_COUNT]);

impl LanguageRanking {
    /// Creates a ranking from a by-rank list (most preferred first).
    pub fn new(by_rank: [LanguageId; LANGUAGE_COUNT]) -> Result<Self> {
        check_permutation(&by_rank.map(|l| l.0), LANGUAGE_COUNT as u8)?;
        Ok(Self(by_rank))
    }

    /// Creates a ranking from the spreadsheet form: one priority value per
    /// language in canonical language order (language 1 first).
    pub fn from_priorities(priorities: [u8; LANGUAGE_COUNT]) -> Result<Self> {
        Ok(Self(invert_priorities(priorities)?.map(LanguageId)))
    }

    /// The most preferred language.
    pub fn top(&self) -> LanguageId {
        self.0[0]
    }

    /// The language at the given rank (1 = most preferred), if in range.
    pub fn at_rank(&self, rank: u8) -> Option<LanguageId> {
        (1..=LANGUAGE_COUNT as u8)
            .contains(&rank)
            .then(|| self.0[rank as usize - 1])
    }

    /// The full by-rank list, most preferred first.
    pub fn by_rank(&self) -> &[LanguageId; LANGUAGE_COUNT] {
        &self.0
    }
}

impl TryFrom<[LanguageId; LANGUAGE_COUNT]> for LanguageRanking {
    type Error = CohortError;

    fn try_from(by_rank: [LanguageId; LANGUAGE_COUNT]) -> Result<Self> {
        Self::new(by_rank)
    }
}

impl From<LanguageRanking> for [LanguageId; LANGUAGE_COUNT] {
    fn from(ranking: LanguageRanking) -> Self {
        ranking.0
    }
}

/// A student's science preferences as a rank-ordered list.
///
/// Same permutation invariant as [`LanguageRanking`], over the three
/// science subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "[ScienceId; 3]", into = "[ScienceId; 3]")
)]
pub struct ScienceRanking([ScienceId; SCIENCE_COUNT]);

impl ScienceRanking {
    /// Creates a ranking from a by-rank list (most preferred first).
    pub fn new(by_rank: [ScienceId; SCIENCE_COUNT]) -> Result<Self> {
        check_permutation(&by_rank.map(|s| s.0), SCIENCE_COUNT as u8)?;
        Ok(Self(by_rank))
    }

    /// Creates a ranking from the spreadsheet form: one priority value per
    /// subject in canonical subject order.
    pub fn from_priorities(priorities: [u8; SCIENCE_COUNT]) -> Result<Self> {
        Ok(Self(invert_priorities(priorities)?.map(ScienceId)))
    }

    /// The most preferred subject.
    pub fn top(&self) -> ScienceId {
        self.0[0]
    }

    /// The subject at the given rank (1 = most preferred), if in range.
    pub fn at_rank(&self, rank: u8) -> Option<ScienceId> {
        (1..=SCIENCE_COUNT as u8)
            .contains(&rank)
            .then(|| self.0[rank as usize - 1])
    }

    /// The full by-rank list, most preferred first.
    pub fn by_rank(&self) -> &[ScienceId; SCIENCE_COUNT] {
        &self.0
    }
}

impl TryFrom<[ScienceId; SCIENCE_COUNT]> for ScienceRanking {
    type Error = CohortError;

    fn try_from(by_rank: [ScienceId; SCIENCE_COUNT]) -> Result<Self> {
        Self::new(by_rank)
    }
}

impl From<ScienceRanking> for [ScienceId; SCIENCE_COUNT] {
    fn from(ranking: ScienceRanking) -> Self {
        ranking.0
    }
}

/// One validated student record.
///
/// Records are immutable input to model construction. The `test_score` is
/// carried through for reporting; no constraint or objective term reads it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StudentRecord {
    pub id: StudentId,
    pub gender: Gender,
    pub languages: LanguageRanking,
    pub sciences: ScienceRanking,
    /// Another student this one wants to share a class with, if declared.
    pub schoolmate: Option<StudentId>,
    pub test_score: f64,
}

/// Checks that `values` is a permutation of `1..=expected`.
fn check_permutation(values: &[u8], expected: u8) -> Result<()> {
    let mut seen = [false; 8];
    let ok = values.len() == expected as usize
        && values.iter().all(|&v| {
            if v == 0 || v > expected || seen[v as usize] {
                false
            } else {
                seen[v as usize] = true;
                true
            }
        });
    if ok {
        Ok(())
    } else {
        Err(CohortError::NotAPermutation {
            values: values.to_vec(),
            expected,
        })
    }
}

/// Inverts a priority-per-identifier list into a by-rank identifier list.
fn invert_priorities<const N: usize>(priorities: [u8; N]) -> Result<[u8; N]> {
    check_permutation(&priorities, N as u8)?;
    let mut by_rank = [0u8; N];
    for (index, &priority) in priorities.iter().enumerate() {
        by_rank[priority as usize - 1] = index as u8 + 1;
    }
    Ok(by_rank)
}
