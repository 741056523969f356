//! A validated repositioning command
//!
//! The drag-and-drop gesture of a grid UI reduces to this: move one employee
//! to one cell, with a reason. Applying it yields the new current position and
//! the single history record describing the move.

use super::history::{HistoryChange, HistoryDraft};
use super::position::PositionRecord;
use super::quadrant::Quadrant;
use crate::core::ids::{EmployeeId, SessionId, UserId};
use crate::core::justification::Justification;
use crate::core::score::Rating;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct PositionMove {
    pub employee_id: EmployeeId,
    pub session_id: Option<SessionId>,
    pub performance: Rating,
    pub potential: Rating,
    pub justification: Justification,
    pub moved_by: UserId,
}

impl PositionMove {
    /// Move to a cell, taking the band midpoints as the new ratings
    pub fn to_quadrant(
        employee_id: EmployeeId,
        target: Quadrant,
        justification: Justification,
        moved_by: UserId,
        session_id: Option<SessionId>,
    ) -> Self {
        let (performance, potential) = target.representative_ratings();
        Self {
            employee_id,
            session_id,
            performance,
            potential,
            justification,
            moved_by,
        }
    }

    pub fn target(&self) -> Quadrant {
        super::quadrant::quadrant_for(self.performance, self.potential)
    }

    /// Compute the next position and its history record from the current one
    ///
    /// Repeating an identical move still produces a record: every action is
    /// audited even when the ratings do not change.
    pub fn apply(
        self,
        current: Option<&PositionRecord>,
        at: DateTime<Utc>,
    ) -> (PositionRecord, HistoryDraft) {
        let next = PositionRecord::moved(
            current,
            self.employee_id,
            self.performance,
            self.potential,
            self.justification.clone(),
            self.moved_by,
            at,
        );
        let draft = HistoryDraft {
            employee_id: self.employee_id,
            session_id: self.session_id,
            change: HistoryChange::position(current, &next),
            justification: self.justification,
            changed_by: self.moved_by,
        };
        (next, draft)
    }
}
