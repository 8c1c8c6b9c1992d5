//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// lifecycle conflicts, resource exhaustion). Infrastructure concerns belong
/// elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. blank SKU, non-positive quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An operation was attempted while the aggregate's status or blocked
    /// flag forbids it.
    #[error("state conflict: {0}")]
    StateConflict(String),

    /// A referenced aggregate was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A removal asked for more quantity than an item currently holds.
    #[error("insufficient quantity: {0}")]
    InsufficientQuantity(String),

    /// A location cannot admit the requested totals within its ceilings.
    #[error("insufficient capacity: {0}")]
    InsufficientCapacity(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn state_conflict(msg: impl Into<String>) -> Self {
        Self::StateConflict(msg.into())
    }

    pub fn insufficient_quantity(msg: impl Into<String>) -> Self {
        Self::InsufficientQuantity(msg.into())
    }

    pub fn insufficient_capacity(msg: impl Into<String>) -> Self {
        Self::InsufficientCapacity(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
