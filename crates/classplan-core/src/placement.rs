//! The per-student outcome of a solved assignment.

use crate::ids::{ClassId, LanguageId, ScienceId, StudentId};

/// Resolved values for one student: class, language and the unordered
/// science pair (kept in slot order as decoded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub student: StudentId,
    pub class: ClassId,
    pub language: LanguageId,
    pub sciences: [ScienceId; 2],
}

impl Placement {
    /// True if the student's science set equals `{a, b}` in either order.
    pub fn has_science_pair(&self, a: ScienceId, b: ScienceId) -> bool {
        (self.sciences[0] == a && self.sciences[1] == b)
            || (self.sciences[0] == b && self.sciences[1] == a)
    }
}
