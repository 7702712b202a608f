//! Error taxonomy for the DAG core.
//!
//! Mirrors the failure kinds an `sc-consensus-ghostdag` caller expects to see:
//! structural violations are surfaced as tagged values, never as panics, so a
//! consumer driving the visualization can present them without the process
//! going down.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DagError>;

/// Failure kinds surfaced by [`crate::Dag`] and its collaborators.
///
/// Every variant leaves the DAG unchanged except [`DagError::AncestorMissingConsensus`],
/// which indicates a bug: the half-built block is discarded rather than inserted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DagError {
    /// Empty parents when genesis already exists, a duplicated parent, or a
    /// parent that names the block itself.
    #[error("invalid parents for block {name:?}: {reason}")]
    InvalidParents {
        /// Name of the block being inserted, if known at the time of failure.
        name: Option<String>,
        /// Human-readable reason (duplicate, self-reference, empty-after-genesis).
        reason: String,
    },

    /// A referenced parent is not present in the store.
    #[error("unknown parent block: {0:?}")]
    UnknownParent(String),

    /// The caller supplied an explicit name that already exists.
    #[error("duplicate block name: {0:?}")]
    DuplicateName(String),

    /// `k` was negative at construction time.
    #[error("invalid k parameter: {0} (must be >= 0)")]
    InvalidK(i64),

    /// A parent lacks computed GHOSTDAG fields. This is always a bug in the
    /// append-only insertion order, never a user-facing condition.
    #[error("ancestor {0:?} is missing computed GHOSTDAG consensus data")]
    AncestorMissingConsensus(String),
}
