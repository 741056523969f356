//! Chat use case: the discussion log of a session

use super::error::CalibrationError;
use super::shared::{load_active_session, load_session, publish};
use crate::ports::chat_log::ChatLog;
use crate::ports::event_broadcaster::EventBroadcaster;
use crate::ports::session_repository::SessionRepository;
use calibration_domain::{Actor, CalibrationEvent, ChatMessage, MessageDraft, SessionId};
use std::sync::Arc;
use tracing::debug;

pub struct ChatUseCase {
    sessions: Arc<dyn SessionRepository>,
    chat: Arc<dyn ChatLog>,
    broadcaster: Arc<dyn EventBroadcaster>,
}

impl ChatUseCase {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        chat: Arc<dyn ChatLog>,
        broadcaster: Arc<dyn EventBroadcaster>,
    ) -> Self {
        Self {
            sessions,
            chat,
            broadcaster,
        }
    }

    pub async fn post(
        &self,
        session_id: SessionId,
        message: impl Into<String>,
        actor: &Actor,
    ) -> Result<ChatMessage, CalibrationError> {
        let draft = MessageDraft::new(session_id, actor.id, message)?;
        load_active_session(self.sessions.as_ref(), session_id).await?;

        let message = self.chat.append_message(draft).await?;
        debug!(session_id = %session_id, sender_id = %actor.id, message_id = %message.id, "Message posted");

        publish(
            self.broadcaster.as_ref(),
            CalibrationEvent::new_message(session_id),
        );
        Ok(message)
    }

    /// Messages oldest first
    pub async fn list(&self, session_id: SessionId) -> Result<Vec<ChatMessage>, CalibrationError> {
        load_session(self.sessions.as_ref(), session_id).await?;
        Ok(self.chat.messages(session_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CalibrationPolicy;
    use crate::use_cases::session_manager::{CreateSessionInput, SessionManager};
    use crate::use_cases::testing::{CYCLE, FakeStore, RecordingBroadcaster, cycle_start, hr, peer};
    use calibration_domain::{ErrorKind, EventKind};
    use chrono::Duration;

    #[tokio::test]
    async fn test_post_and_list() {
        let store = FakeStore::seeded();
        let events = Arc::new(RecordingBroadcaster::default());
        let sessions = SessionManager::new(store.clone(), store.clone(), CalibrationPolicy::default());
        let chat = ChatUseCase::new(store.clone(), store.clone(), events.clone());

        let input = CreateSessionInput::new(CYCLE, cycle_start() + Duration::days(1));
        let id = sessions.create_session(input, &hr()).await.unwrap().session.id;

        let err = chat.post(id, "Too early", &hr()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SessionNotActive);

        sessions.join(id, &hr()).await.unwrap();
        chat.post(id, "Let's start with sales", &hr()).await.unwrap();
        chat.post(id, "Agreed", &peer()).await.unwrap();

        let err = chat.post(id, "   ", &peer()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);

        let messages = chat.list(id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message, "Let's start with sales");
        assert!(messages[0].created_at <= messages[1].created_at);

        let kinds: Vec<_> = events.events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::NewMessage, EventKind::NewMessage]);
    }

    #[tokio::test]
    async fn test_list_unknown_session() {
        let store = FakeStore::seeded();
        let chat = ChatUseCase::new(
            store.clone(),
            store.clone(),
            Arc::new(RecordingBroadcaster::default()),
        );
        let err = chat.list(SessionId::new(5)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
