//! Error type shared by the calibration use cases

use crate::ports::store_error::StoreError;
use calibration_domain::{DomainError, ErrorKind};
use thiserror::Error;

/// Errors returned by every calibration operation.
///
/// Rule violations carry their [`DomainError`]; anything the storage layer
/// could not explain in domain terms is an infrastructure fault.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl CalibrationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalibrationError::Domain(e) => e.kind(),
            CalibrationError::Store(_) => ErrorKind::Internal,
        }
    }
}

impl From<StoreError> for CalibrationError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { entity, id } => {
                CalibrationError::Domain(DomainError::NotFound { entity, id })
            }
            StoreError::Rejected(e) => CalibrationError::Domain(e),
            other => CalibrationError::Store(other),
        }
    }
}
