//! Domain error types
//!
//! Every rule violation maps onto one [`ErrorKind`] of the calibration error
//! taxonomy so callers can surface a precise, typed failure.

use super::ids::{EvaluationId, SessionId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error taxonomy shared by every calibration operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Out-of-range score, empty justification or message, malformed input
    ValidationError,
    /// Actor lacks the role required for the operation
    Forbidden,
    /// Action against a scheduled or concluded session
    SessionNotActive,
    /// Vote or resolve against an evaluation whose consensus is final
    EvaluationAlreadyResolved,
    /// Unknown session, evaluation, employee, cycle or participant
    NotFound,
    /// Storage backend failure
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::SessionNotActive => "SESSION_NOT_ACTIVE",
            ErrorKind::EvaluationAlreadyResolved => "EVALUATION_ALREADY_RESOLVED",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{actor} may not {action}")]
    Forbidden { actor: UserId, action: &'static str },

    #[error("{0} is not active")]
    SessionNotActive(SessionId),

    #[error("{0} is already resolved")]
    EvaluationAlreadyResolved(EvaluationId),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Map this error onto the calibration error taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) => ErrorKind::ValidationError,
            DomainError::Forbidden { .. } => ErrorKind::Forbidden,
            DomainError::SessionNotActive(_) => ErrorKind::SessionNotActive,
            DomainError::EvaluationAlreadyResolved(_) => ErrorKind::EvaluationAlreadyResolved,
            DomainError::NotFound { .. } => ErrorKind::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DomainError::SessionNotActive(SessionId::new(4));
        assert_eq!(error.to_string(), "session#4 is not active");

        let error = DomainError::not_found("employee", 9);
        assert_eq!(error.to_string(), "employee 9 not found");

        let error = DomainError::Forbidden {
            actor: UserId::new(3),
            action: "resolve consensus",
        };
        assert_eq!(error.to_string(), "user#3 may not resolve consensus");
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            DomainError::validation("empty").kind(),
            ErrorKind::ValidationError
        );
        assert_eq!(
            DomainError::EvaluationAlreadyResolved(EvaluationId::new(1)).kind(),
            ErrorKind::EvaluationAlreadyResolved
        );
        assert_eq!(ErrorKind::SessionNotActive.to_string(), "SESSION_NOT_ACTIVE");
    }
}
