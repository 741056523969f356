//! Chat log port

use super::store_error::StoreError;
use async_trait::async_trait;
use calibration_domain::{ChatMessage, MessageDraft, SessionId};

/// Append-only message store scoped to a session. No edit, no delete.
#[async_trait]
pub trait ChatLog: Send + Sync {
    /// Rejected with `SessionNotActive` unless the session is active at write time
    async fn append_message(&self, draft: MessageDraft) -> Result<ChatMessage, StoreError>;

    /// Messages of one session, ordered by `created_at` ascending
    async fn messages(&self, session_id: SessionId) -> Result<Vec<ChatMessage>, StoreError>;
}
