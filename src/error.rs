//! Error types for group allocation.

use thiserror::Error;

/// Errors raised while sizing, apportioning or filling groups.
///
/// All of them are local to a single call; a failed call never hands back
/// partially filled groups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// Desired group size or population shape cannot produce groups.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A role pool ran dry before its quota for a group was met.
    #[error(
        "Insufficient supply for role '{role}': group {group} needs {required}, only {available} left"
    )]
    InsufficientRoleSupply {
        role: String,
        group: usize,
        required: usize,
        available: usize,
    },

    /// Final sizes or counts disagree with the computed targets.
    #[error("Allocation invariant violated: {0}")]
    AllocationInvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, AllocationError>;
