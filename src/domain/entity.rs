//! Domain Layer - Core Error Types
//!
//! The `Entity` contract itself lives in the `entity-table` crate; this
//! module defines the error vocabulary shared by the store, the selectors
//! and the remote contract.

use serde::{Deserialize, Serialize};

pub use entity_table::Entity;

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
///
/// `InvalidReference` marks a broken store invariant (an ordered list points
/// at a missing entity) and is a defect, not a recoverable condition: debug
/// builds fail loudly. `RemoteRejected` is always recoverable and always
/// reported to the caller after rollback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainError {
    NotFound(String),
    InvalidReference(String),
    OutOfRangeIndex(String),
    RemoteRejected(String),
    Internal(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::InvalidReference(msg) => write!(f, "Invalid reference: {}", msg),
            DomainError::OutOfRangeIndex(msg) => write!(f, "Index out of range: {}", msg),
            DomainError::RemoteRejected(msg) => write!(f, "Remote rejected: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

/// Validate a caller-supplied position. Negative positions are rejected;
/// anything else converts to an index that downstream sequence operations
/// clamp to append.
pub fn index_from_position(position: i32) -> DomainResult<usize> {
    if position < 0 {
        return Err(DomainError::OutOfRangeIndex(format!(
            "negative position {}",
            position
        )));
    }
    Ok(position as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_position_rejected() {
        assert!(matches!(
            index_from_position(-1),
            Err(DomainError::OutOfRangeIndex(_))
        ));
        assert_eq!(index_from_position(0).unwrap(), 0);
        assert_eq!(index_from_position(7).unwrap(), 7);
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::RemoteRejected("create card".to_string());
        assert_eq!(err.to_string(), "Remote rejected: create card");
    }
}
