//! Change notifications for connected clients
//!
//! An event only says *that* something changed and where; receivers re-read
//! the ledgers for the authoritative state instead of trusting the payload.

use crate::core::ids::{EmployeeId, EvaluationId, SessionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four kinds of change a session channel carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    NewVote,
    ConsensusReached,
    PositionChanged,
    NewMessage,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::NewVote => "new-vote",
            EventKind::ConsensusReached => "consensus-reached",
            EventKind::PositionChanged => "position-changed",
            EventKind::NewMessage => "new-message",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing key for subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventChannel {
    /// Everything happening inside one session
    Session(SessionId),
    /// Direct placements made outside any session
    Grid,
}

impl fmt::Display for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventChannel::Session(id) => write!(f, "{}", id),
            EventChannel::Grid => write!(f, "grid"),
        }
    }
}

/// `{kind, sessionId, evaluationId?, employeeId?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationEvent {
    pub kind: EventKind,
    pub session_id: Option<SessionId>,
    pub evaluation_id: Option<EvaluationId>,
    pub employee_id: Option<EmployeeId>,
}

impl CalibrationEvent {
    pub fn new_vote(session_id: SessionId, evaluation_id: EvaluationId) -> Self {
        Self {
            kind: EventKind::NewVote,
            session_id: Some(session_id),
            evaluation_id: Some(evaluation_id),
            employee_id: None,
        }
    }

    pub fn consensus_reached(
        session_id: SessionId,
        evaluation_id: EvaluationId,
        employee_id: EmployeeId,
    ) -> Self {
        Self {
            kind: EventKind::ConsensusReached,
            session_id: Some(session_id),
            evaluation_id: Some(evaluation_id),
            employee_id: Some(employee_id),
        }
    }

    pub fn position_changed(session_id: Option<SessionId>, employee_id: EmployeeId) -> Self {
        Self {
            kind: EventKind::PositionChanged,
            session_id,
            evaluation_id: None,
            employee_id: Some(employee_id),
        }
    }

    pub fn new_message(session_id: SessionId) -> Self {
        Self {
            kind: EventKind::NewMessage,
            session_id: Some(session_id),
            evaluation_id: None,
            employee_id: None,
        }
    }

    /// The channel this event is published on
    pub fn channel(&self) -> EventChannel {
        match self.session_id {
            Some(id) => EventChannel::Session(id),
            None => EventChannel::Grid,
        }
    }
}
