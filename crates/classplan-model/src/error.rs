//! Error types for model construction.

use thiserror::Error;

/// Errors raised while declaring variables or posting constraints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A variable was declared with an empty or unsupported domain.
    ///
    /// Domains are contiguous integer ranges within `0..=63` so engines
    /// can hold them in a single machine word.
    #[error("variable {name} has invalid domain {lb}..={ub}")]
    InvalidDomain { name: String, lb: i32, ub: i32 },
}
