//! Position Engine use case
//!
//! Moves employees on the nine-box grid, either inside an active session or
//! directly. Every move is justified and recorded, including a repeat of
//! the same move.

use super::error::CalibrationError;
use super::shared::{load_active_session, publish};
use crate::config::CalibrationPolicy;
use crate::ports::directory::{EmployeeDirectory, EmployeeProfile};
use crate::ports::event_broadcaster::EventBroadcaster;
use crate::ports::position_repository::PositionRepository;
use crate::ports::session_repository::SessionRepository;
use calibration_domain::{
    Actor, CalibrationEvent, DomainError, EmployeeId, HistoryEntry, Justification, PositionMove,
    PositionRecord, Quadrant, SessionId,
};
use std::sync::Arc;
use tracing::info;

/// Input for a grid move
#[derive(Debug, Clone)]
pub struct RepositionInput {
    pub employee_id: EmployeeId,
    pub target: Quadrant,
    pub justification: String,
    /// `None` for a direct placement outside any session
    pub session_id: Option<SessionId>,
}

pub struct PositionEngine {
    sessions: Arc<dyn SessionRepository>,
    positions: Arc<dyn PositionRepository>,
    directory: Arc<dyn EmployeeDirectory>,
    broadcaster: Arc<dyn EventBroadcaster>,
    policy: CalibrationPolicy,
}

impl PositionEngine {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        positions: Arc<dyn PositionRepository>,
        directory: Arc<dyn EmployeeDirectory>,
        broadcaster: Arc<dyn EventBroadcaster>,
        policy: CalibrationPolicy,
    ) -> Self {
        Self {
            sessions,
            positions,
            directory,
            broadcaster,
            policy,
        }
    }

    /// Place `employee_id` in `target`, taking the band midpoints as the new
    /// performance and potential ratings.
    pub async fn reposition(
        &self,
        input: RepositionInput,
        actor: &Actor,
    ) -> Result<HistoryEntry, CalibrationError> {
        let justification =
            Justification::with_min_len(input.justification, self.policy.min_justification_len)?;

        let employee = self
            .directory
            .employee(input.employee_id)
            .await?
            .ok_or_else(|| DomainError::not_found("employee", input.employee_id))?;
        self.check_authority(&employee, actor)?;

        if let Some(session_id) = input.session_id {
            load_active_session(self.sessions.as_ref(), session_id).await?;
        }

        let movement = PositionMove::to_quadrant(
            employee.id,
            input.target,
            justification,
            actor.id,
            input.session_id,
        );
        let (record, entry) = self.positions.apply_move(movement).await?;
        info!(
            employee_id = %record.employee_id,
            session_id = ?input.session_id,
            from = ?record.previous_quadrant.map(|q| q.id()),
            to = record.quadrant().id(),
            "Employee repositioned"
        );

        publish(
            self.broadcaster.as_ref(),
            CalibrationEvent::position_changed(input.session_id, record.employee_id),
        );
        Ok(entry)
    }

    pub async fn position(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Option<PositionRecord>, CalibrationError> {
        Ok(self.positions.position(employee_id).await?)
    }

    fn check_authority(&self, employee: &EmployeeProfile, actor: &Actor) -> Result<(), DomainError> {
        if !self.policy.placement_authority
            || actor.role.has_global_authority()
            || employee.is_managed_by(actor.id)
        {
            return Ok(());
        }
        Err(DomainError::Forbidden {
            actor: actor.id,
            action: "reposition this employee",
        })
    }
}
