//! Identifier value objects
//!
//! Every entity is addressed by a strongly typed numeric id so that a
//! session id can never be passed where an evaluation id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            /// Accepts both the bare number (`12`) and the display form (`session#12`).
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s
                    .trim()
                    .strip_prefix(concat!($prefix, "#"))
                    .unwrap_or(s.trim());
                digits
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| format!("invalid {} id: {}", $prefix, s))
            }
        }
    };
}

entity_id!(
    /// Calibration session identifier
    SessionId,
    "session"
);
entity_id!(
    /// Evaluation identifier (one per employee per cycle)
    EvaluationId,
    "evaluation"
);
entity_id!(
    /// Employee identifier, as known to the employee directory
    EmployeeId,
    "employee"
);
entity_id!(
    /// Authenticated user identifier
    UserId,
    "user"
);
entity_id!(
    /// Evaluation cycle identifier
    CycleId,
    "cycle"
);
entity_id!(VoteId, "vote");
entity_id!(HistoryEntryId, "history");
entity_id!(MessageId, "message");
entity_id!(DepartmentId, "department");
