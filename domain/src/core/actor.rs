//! Authenticated actor context
//!
//! Every operation receives the caller explicitly; nothing reads a
//! "current user" from ambient state.

use super::ids::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Organisation-wide role of an authenticated user
///
/// This is distinct from the per-session [`ParticipantRole`](crate::ParticipantRole):
/// being an admin does not make someone the facilitator of a given session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Admin,
    Hr,
    Manager,
    #[default]
    Employee,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Admin => "admin",
            ActorRole::Hr => "hr",
            ActorRole::Manager => "manager",
            ActorRole::Employee => "employee",
        }
    }

    /// Admins and HR may act on any employee
    pub fn has_global_authority(&self) -> bool {
        matches!(self, ActorRole::Admin | ActorRole::Hr)
    }

    /// Roles allowed to schedule calibration sessions
    pub fn can_schedule_sessions(&self) -> bool {
        !matches!(self, ActorRole::Employee)
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(ActorRole::Admin),
            "hr" | "rh" => Ok(ActorRole::Hr),
            "manager" | "gestor" => Ok(ActorRole::Manager),
            "employee" | "colaborador" => Ok(ActorRole::Employee),
            _ => Err(format!(
                "Unknown role: {}. Valid: admin, hr, manager, employee",
                s
            )),
        }
    }
}

/// An already-authenticated caller `{id, role}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: UserId, role: ActorRole) -> Self {
        Self { id, role }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("HR".parse::<ActorRole>().unwrap(), ActorRole::Hr);
        assert_eq!("gestor".parse::<ActorRole>().unwrap(), ActorRole::Manager);
        assert!("ceo".parse::<ActorRole>().is_err());
    }

    #[test]
    fn test_authority() {
        assert!(ActorRole::Admin.has_global_authority());
        assert!(!ActorRole::Manager.has_global_authority());
        assert!(ActorRole::Manager.can_schedule_sessions());
        assert!(!ActorRole::Employee.can_schedule_sessions());
    }
}
