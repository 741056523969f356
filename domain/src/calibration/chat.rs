//! Session chat messages

use crate::core::error::DomainError;
use crate::core::ids::{MessageId, SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One message in a session's permanent discussion log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub session_id: SessionId,
    pub sender_id: UserId,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A validated message awaiting an id and timestamp from the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub session_id: SessionId,
    pub sender_id: UserId,
    pub message: String,
}

impl MessageDraft {
    pub fn new(
        session_id: SessionId,
        sender_id: UserId,
        message: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(DomainError::validation("message cannot be empty"));
        }
        Ok(Self {
            session_id,
            sender_id,
            message,
        })
    }

    pub fn into_message(self, id: MessageId, created_at: DateTime<Utc>) -> ChatMessage {
        ChatMessage {
            id,
            session_id: self.session_id,
            sender_id: self.sender_id,
            message: self.message,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_message_rejected() {
        let err = MessageDraft::new(SessionId::new(1), UserId::new(1), "  ").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ValidationError);
    }

    #[test]
    fn test_message_kept_verbatim() {
        let draft = MessageDraft::new(SessionId::new(1), UserId::new(1), " Shall we start? ").unwrap();
        assert_eq!(draft.message, " Shall we start? ");
    }
}
