//! Shared utilities for use cases.
//!
//! Session lookups, the membership and facilitator gates, and best-effort event publishing
//! used across the session, voting, resolution, placement and chat use cases.

use super::error::CalibrationError;
use crate::ports::event_broadcaster::EventBroadcaster;
use crate::ports::session_repository::SessionRepository;
use calibration_domain::{
    Actor, CalibrationEvent, CalibrationSession, DomainError, Participant, SessionId,
};
use tracing::{debug, warn};

/// Load a session or fail with `NotFound`.
pub(crate) async fn load_session(
    sessions: &dyn SessionRepository,
    id: SessionId,
) -> Result<CalibrationSession, CalibrationError> {
    sessions
        .session(id)
        .await?
        .ok_or_else(|| DomainError::not_found("session", id).into())
}

/// Load a session that must currently be active.
pub(crate) async fn load_active_session(
    sessions: &dyn SessionRepository,
    id: SessionId,
) -> Result<CalibrationSession, CalibrationError> {
    let session = load_session(sessions, id).await?;
    session.ensure_active()?;
    Ok(session)
}

/// Require the caller to hold the facilitator role in `session_id`.
///
/// The check reads the caller's own participant row; a global role does not
/// stand in for it.
pub(crate) async fn require_facilitator(
    sessions: &dyn SessionRepository,
    session_id: SessionId,
    actor: &Actor,
    action: &'static str,
) -> Result<Participant, CalibrationError> {
    match sessions.participant(session_id, actor.id).await? {
        Some(participant) if participant.is_facilitator() => Ok(participant),
        _ => Err(DomainError::Forbidden {
            actor: actor.id,
            action,
        }
        .into()),
    }
}

/// Require the caller to hold a participant row (any role) in `session_id`.
pub(crate) async fn require_participant(
    sessions: &dyn SessionRepository,
    session_id: SessionId,
    actor: &Actor,
    action: &'static str,
) -> Result<Participant, CalibrationError> {
    sessions
        .participant(session_id, actor.id)
        .await?
        .ok_or_else(|| {
            DomainError::Forbidden {
                actor: actor.id,
                action,
            }
            .into()
        })
}

/// Publish after a durable write. Failures are logged, never returned.
pub(crate) fn publish(broadcaster: &dyn EventBroadcaster, event: CalibrationEvent) {
    let kind = event.kind;
    let channel = event.channel();
    match broadcaster.publish(event) {
        Ok(receivers) => debug!(%kind, %channel, receivers, "Event published"),
        Err(e) => warn!(%kind, %channel, error = %e, "Failed to publish event"),
    }
}
