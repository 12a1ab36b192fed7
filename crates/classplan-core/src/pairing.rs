//! Preference-pair analysis over a roster.
//!
//! Scans every unordered pair of science subjects and counts how many
//! students rank one of them first and the other second. The pair with the
//! greatest count becomes the eligibility gate for the privileged class.

use crate::error::{CohortError, Result};
use crate::ids::{ScienceId, SCIENCE_COUNT};
use crate::roster::Roster;

/// An unordered pair of distinct science subjects.
///
/// Stored with the lower identifier first so that two pairs built in
/// either order compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SciencePair {
    lo: ScienceId,
    hi: ScienceId,
}

impl SciencePair {
    /// Creates a pair from two distinct subjects, in either order.
    pub fn new(a: ScienceId, b: ScienceId) -> Result<Self> {
        if a == b {
            return Err(CohortError::DegeneratePair(a));
        }
        let (lo, hi) = if a.0 <= b.0 { (a, b) } else { (b, a) };
        Ok(Self { lo, hi })
    }

    /// The lower subject identifier.
    pub fn lo(&self) -> ScienceId {
        self.lo
    }

    /// The higher subject identifier.
    pub fn hi(&self) -> ScienceId {
        self.hi
    }

    /// True if `{a, b}` equals this pair, in either order.
    pub fn matches(&self, a: ScienceId, b: ScienceId) -> bool {
        (self.lo == a && self.hi == b) || (self.lo == b && self.hi == a)
    }
}

/// Enumerates all unordered subject pairs in canonical order:
/// (1,2), (1,3), (2,3).
pub fn canonical_pairs() -> impl Iterator<Item = SciencePair> {
    let n = SCIENCE_COUNT as u8;
    (1..=n).flat_map(move |a| {
        (a + 1..=n).map(move |b| SciencePair {
            lo: ScienceId(a),
            hi: ScienceId(b),
        })
    })
}

/// Per-pair co-preference counts over a roster.
///
/// A student contributes to the pair formed by their first and second
/// ranked subjects, and to no other pair.
///
/// # Examples
///
/// ```
/// use classplan_core::{
///     Gender, LanguageRanking, PairCensus, Roster, ScienceId,
///     ScienceRanking, StudentId, StudentRecord,
/// };
/// use classplan_core::LanguageId;
///
/// let student = |id: u32, sciences: [u8; 3]| StudentRecord {
///     id: StudentId(id),
///     gender: Gender::Female,
///     languages: LanguageRanking::new([1, 2, 3, 4, 5].map(LanguageId)).unwrap(),
///     sciences: ScienceRanking::new(sciences.map(ScienceId)).unwrap(),
///     schoolmate: None,
///     test_score: 0.0,
/// };
/// let roster = Roster::new(vec![
///     student(1, [1, 2, 3]),
///     student(2, [2, 1, 3]),
///     student(3, [1, 3, 2]),
/// ]).unwrap();
///
/// let census = PairCensus::scan(&roster);
/// let best = census.best_pair();
/// assert_eq!((best.lo(), best.hi()), (ScienceId(1), ScienceId(2)));
/// ```
#[derive(Debug, Clone)]
pub struct PairCensus {
    counts: Vec<(SciencePair, u32)>,
}

impl PairCensus {
    /// Counts first/second co-preferences for every unordered pair.
    pub fn scan(roster: &Roster) -> Self {
        debug_assert!(SCIENCE_COUNT >= 2, "pair analysis needs two subjects");
        let counts = canonical_pairs()
            .map(|pair| {
                let count = roster
                    .students()
                    .iter()
                    .filter(|s| {
                        let ranks = s.sciences.by_rank();
                        pair.matches(ranks[0], ranks[1])
                    })
                    .count() as u32;
                (pair, count)
            })
            .collect();
        Self { counts }
    }

    /// The pair with the greatest count.
    ///
    /// Ties keep the first pair in canonical enumeration order; this is a
    /// policy decision, not an inferred preference between equal pairs.
    pub fn best_pair(&self) -> SciencePair {
        let mut best = self.counts[0];
        for &entry in &self.counts[1..] {
            if entry.1 > best.1 {
                best = entry;
            }
        }
        best.0
    }

    /// All pairs with their counts, in canonical order.
    pub fn counts(&self) -> &[(SciencePair, u32)] {
        &self.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{LanguageId, StudentId};
    use crate::student::{Gender, LanguageRanking, ScienceRanking, StudentRecord};

    fn student(id: u32, sciences: [u8; 3]) -> StudentRecord {
        StudentRecord {
            id: StudentId(id),
            gender: Gender::Female,
            languages: LanguageRanking::new([1, 2, 3, 4, 5].map(LanguageId)).unwrap(),
            sciences: ScienceRanking::new(sciences.map(ScienceId)).unwrap(),
            schoolmate: None,
            test_score: 0.0,
        }
    }

    #[test]
    fn pair_order_is_normalized() {
        let a = SciencePair::new(ScienceId(3), ScienceId(1)).unwrap();
        let b = SciencePair::new(ScienceId(1), ScienceId(3)).unwrap();
        assert_eq!(a, b);
        assert!(a.matches(ScienceId(3), ScienceId(1)));
        assert!(!a.matches(ScienceId(1), ScienceId(2)));
    }

    #[test]
    fn degenerate_pair_is_rejected() {
        assert!(SciencePair::new(ScienceId(2), ScienceId(2)).is_err());
    }

    #[test]
    fn counts_both_orders() {
        let roster = Roster::new(vec![
            student(1, [1, 2, 3]),
            student(2, [2, 1, 3]),
            student(3, [3, 1, 2]),
        ])
        .unwrap();
        let census = PairCensus::scan(&roster);
        // {1,2} twice (both orders), {1,3} once, {2,3} never.
        assert_eq!(census.counts()[0].1, 2);
        assert_eq!(census.counts()[1].1, 1);
        assert_eq!(census.counts()[2].1, 0);
        assert_eq!(
            census.best_pair(),
            SciencePair::new(ScienceId(1), ScienceId(2)).unwrap()
        );
    }

    #[test]
    fn tie_keeps_canonical_order() {
        let roster = Roster::new(vec![
            student(1, [1, 2, 3]),
            student(2, [1, 3, 2]),
        ])
        .unwrap();
        let census = PairCensus::scan(&roster);
        // {1,2} and {1,3} both count one; the earlier pair wins.
        assert_eq!(
            census.best_pair(),
            SciencePair::new(ScienceId(1), ScienceId(2)).unwrap()
        );
    }

    #[test]
    fn census_covers_every_pair() {
        let roster = Roster::new(vec![student(1, [1, 2, 3])]).unwrap();
        let census = PairCensus::scan(&roster);
        assert_eq!(census.counts().len(), 3);
        let pairs: Vec<SciencePair> = canonical_pairs().collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(census.counts()[1].0, pairs[1]);
    }

    #[test]
    fn idempotent_over_unchanged_roster() {
        let roster = Roster::new(vec![
            student(1, [2, 3, 1]),
            student(2, [3, 2, 1]),
            student(3, [2, 3, 1]),
        ])
        .unwrap();
        let first = PairCensus::scan(&roster).best_pair();
        let second = PairCensus::scan(&roster).best_pair();
        assert_eq!(first, second);
        assert_eq!(first, SciencePair::new(ScienceId(2), ScienceId(3)).unwrap());
    }
}
