//! Calibration session entity and lifecycle
//!
//! ```text
//! scheduled ──join──▶ active ──conclude──▶ concluded
//! ```
//!
//! `concluded` is terminal. Votes, resolutions and chat are only accepted
//! while a session is `active`.

use crate::core::error::DomainError;
use crate::core::ids::{CycleId, DepartmentId, SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a calibration session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Active,
    Concluded,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Active => "active",
            SessionStatus::Concluded => "concluded",
        }
    }

    /// Whether `self -> next` is a legal lifecycle transition
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Scheduled, SessionStatus::Active)
                | (SessionStatus::Active, SessionStatus::Concluded)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Concluded)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(SessionStatus::Scheduled),
            "active" => Ok(SessionStatus::Active),
            "concluded" => Ok(SessionStatus::Concluded),
            _ => Err(format!(
                "Unknown session status: {}. Valid: scheduled, active, concluded",
                s
            )),
        }
    }
}

/// A scheduled, multi-participant meeting for reconciling scores (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSession {
    pub id: SessionId,
    /// The evaluation cycle this session calibrates
    pub cycle_id: CycleId,
    /// Restricts the session to one department's evaluations when set
    pub department_id: Option<DepartmentId>,
    /// The user who scheduled the session
    pub facilitator_id: UserId,
    pub scheduled_for: DateTime<Utc>,
    pub status: SessionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub concluded_at: Option<DateTime<Utc>>,
    /// Closing notes recorded by the facilitator
    pub notes: Option<String>,
    /// Optimistic concurrency counter, bumped on every status change
    pub version: u64,
}

impl CalibrationSession {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Fail with `SessionNotActive` unless the session accepts votes,
    /// resolutions and messages
    pub fn ensure_active(&self) -> Result<(), DomainError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(DomainError::SessionNotActive(self.id))
        }
    }

    /// Move to `active` (first join). Returns `false` when already active.
    pub fn activate(&mut self, at: DateTime<Utc>) -> Result<bool, DomainError> {
        match self.status {
            SessionStatus::Active => Ok(false),
            SessionStatus::Scheduled => {
                self.status = SessionStatus::Active;
                self.started_at = Some(at);
                self.version += 1;
                Ok(true)
            }
            SessionStatus::Concluded => Err(DomainError::SessionNotActive(self.id)),
        }
    }

    /// Move to the terminal `concluded` state
    pub fn conclude(&mut self, at: DateTime<Utc>, notes: Option<String>) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.status = SessionStatus::Concluded;
        self.concluded_at = Some(at);
        self.notes = notes.filter(|n| !n.trim().is_empty());
        self.version += 1;
        Ok(())
    }
}

/// Data needed to schedule a new session; the store assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub cycle_id: CycleId,
    pub department_id: Option<DepartmentId>,
    pub facilitator_id: UserId,
    pub scheduled_for: DateTime<Utc>,
}

impl NewSession {
    pub fn into_session(self, id: SessionId) -> CalibrationSession {
        CalibrationSession {
            id,
            cycle_id: self.cycle_id,
            department_id: self.department_id,
            facilitator_id: self.facilitator_id,
            scheduled_for: self.scheduled_for,
            status: SessionStatus::Scheduled,
            started_at: None,
            concluded_at: None,
            notes: None,
            version: 0,
        }
    }
}

/// Filter for listing sessions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionFilter {
    pub cycle_id: Option<CycleId>,
    pub status: Option<SessionStatus>,
}

impl SessionFilter {
    pub fn matches(&self, session: &CalibrationSession) -> bool {
        self.cycle_id.is_none_or(|c| c == session.cycle_id)
            && self.status.is_none_or(|s| s == session.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduled() -> CalibrationSession {
        NewSession {
            cycle_id: CycleId::new(1),
            department_id: None,
            facilitator_id: UserId::new(10),
            scheduled_for: Utc::now(),
        }
        .into_session(SessionId::new(1))
    }

    #[test]
    fn test_lifecycle_transitions() {
        assert!(SessionStatus::Scheduled.can_transition_to(SessionStatus::Active));
        assert!(SessionStatus::Active.can_transition_to(SessionStatus::Concluded));
        assert!(!SessionStatus::Concluded.can_transition_to(SessionStatus::Active));
        assert!(!SessionStatus::Scheduled.can_transition_to(SessionStatus::Concluded));
    }

    #[test]
    fn test_activate_once() {
        let mut session = scheduled();
        assert!(session.activate(Utc::now()).unwrap());
        assert_eq!(session.version, 1);
        assert!(!session.activate(Utc::now()).unwrap());
        assert_eq!(session.version, 1);
    }

    #[test]
    fn test_conclude_requires_active() {
        let mut session = scheduled();
        assert_eq!(
            session.conclude(Utc::now(), None),
            Err(DomainError::SessionNotActive(SessionId::new(1)))
        );

        session.activate(Utc::now()).unwrap();
        session
            .conclude(Utc::now(), Some("All boxes agreed".to_string()))
            .unwrap();
        assert_eq!(session.status, SessionStatus::Concluded);
        assert!(session.ensure_active().is_err());
        assert!(session.activate(Utc::now()).is_err());
    }

    #[test]
    fn test_blank_notes_dropped() {
        let mut session = scheduled();
        session.activate(Utc::now()).unwrap();
        session.conclude(Utc::now(), Some("  ".to_string())).unwrap();
        assert!(session.notes.is_none());
    }

    #[test]
    fn test_filter() {
        let session = scheduled();
        assert!(SessionFilter::default().matches(&session));
        let filter = SessionFilter {
            cycle_id: Some(CycleId::new(2)),
            status: None,
        };
        assert!(!filter.matches(&session));
        let filter = SessionFilter {
            cycle_id: None,
            status: Some(SessionStatus::Scheduled),
        };
        assert!(filter.matches(&session));
    }
}
