//! Errors surfaced by storage ports

use calibration_domain::DomainError;
use thiserror::Error;

/// Errors that can occur inside a repository or ledger adapter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The record changed since the caller read it (compare-and-set lost)
    #[error("version conflict on {entity} {id}: expected {expected}, found {actual}")]
    VersionConflict {
        entity: &'static str,
        id: String,
        expected: u64,
        actual: u64,
    },

    /// A write violated a rule the store enforces atomically
    #[error("Rejected write: {0}")]
    Rejected(DomainError),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }
}
