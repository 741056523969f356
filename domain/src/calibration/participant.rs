//! Session participants and the facilitator uniqueness policy

use crate::core::ids::{SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a user holds inside one calibration session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    /// May resolve consensus and conclude the session
    Facilitator,
    #[default]
    Voter,
}

impl ParticipantRole {
    pub fn is_facilitator(&self) -> bool {
        matches!(self, ParticipantRole::Facilitator)
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantRole::Facilitator => write!(f, "facilitator"),
            ParticipantRole::Voter => write!(f, "voter"),
        }
    }
}

impl FromStr for ParticipantRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "facilitator" => Ok(ParticipantRole::Facilitator),
            "voter" | "participant" => Ok(ParticipantRole::Voter),
            _ => Err(format!(
                "Unknown participant role: {}. Valid: facilitator, voter",
                s
            )),
        }
    }
}

/// How many facilitators a session may have
///
/// The data model allows several; deployments choose whether to allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilitatorPolicy {
    /// At most one facilitator per session
    #[default]
    Single,
    /// Any number of facilitators
    Multiple,
}

impl FacilitatorPolicy {
    /// Check whether another facilitator may be added given the current count
    pub fn allows_another(&self, current_facilitators: usize) -> bool {
        match self {
            FacilitatorPolicy::Single => current_facilitators == 0,
            FacilitatorPolicy::Multiple => true,
        }
    }
}

impl FromStr for FacilitatorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(FacilitatorPolicy::Single),
            "multiple" => Ok(FacilitatorPolicy::Multiple),
            _ => Err(format!(
                "Unknown facilitator policy: {}. Valid: single, multiple",
                s
            )),
        }
    }
}

/// Membership of one user in one session (Entity)
///
/// Rows are never removed: leaving only flips `is_online`, so the record of
/// who attended survives the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub role: ParticipantRole,
    /// Connection presence; informational only
    pub is_online: bool,
    pub joined_at: Option<DateTime<Utc>>,
    pub left_at: Option<DateTime<Utc>>,
}

impl Participant {
    /// A participant registered ahead of time who has not connected yet
    pub fn invited(session_id: SessionId, user_id: UserId, role: ParticipantRole) -> Self {
        Self {
            session_id,
            user_id,
            role,
            is_online: false,
            joined_at: None,
            left_at: None,
        }
    }

    pub fn mark_online(&mut self, at: DateTime<Utc>) {
        self.is_online = true;
        self.joined_at = Some(at);
    }

    pub fn mark_offline(&mut self, at: DateTime<Utc>) {
        self.is_online = false;
        self.left_at = Some(at);
    }

    pub fn is_facilitator(&self) -> bool {
        self.role.is_facilitator()
    }
}
