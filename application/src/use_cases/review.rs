//! Review & history queries
//!
//! Read-only views assembled from the ledgers: the evaluations a session
//! works through (with their discrepancy reports), audit trails, the grid
//! distribution and placement statistics. Discrepancies are recomputed on
//! every read and never stored.

use super::error::CalibrationError;
use super::shared::load_session;
use crate::config::CalibrationPolicy;
use crate::ports::directory::{EmployeeDirectory, EmployeeProfile};
use crate::ports::evaluation_repository::EvaluationRepository;
use crate::ports::history_store::HistoryStore;
use crate::ports::position_repository::PositionRepository;
use crate::ports::session_repository::SessionRepository;
use calibration_domain::{
    DiscrepancyReport, DomainError, EmployeeId, Evaluation, GridDistribution, HistoryEntry,
    PlacementStats, SessionId, analyze,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// One evaluation as shown during a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReview {
    pub evaluation: Evaluation,
    pub employee: Option<EmployeeProfile>,
    pub discrepancy: DiscrepancyReport,
}

pub struct ReviewUseCase {
    sessions: Arc<dyn SessionRepository>,
    evaluations: Arc<dyn EvaluationRepository>,
    positions: Arc<dyn PositionRepository>,
    history: Arc<dyn HistoryStore>,
    directory: Arc<dyn EmployeeDirectory>,
    policy: CalibrationPolicy,
}

impl ReviewUseCase {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        evaluations: Arc<dyn EvaluationRepository>,
        positions: Arc<dyn PositionRepository>,
        history: Arc<dyn HistoryStore>,
        directory: Arc<dyn EmployeeDirectory>,
        policy: CalibrationPolicy,
    ) -> Self {
        Self {
            sessions,
            evaluations,
            positions,
            history,
            directory,
            policy,
        }
    }

    /// Evaluations of the session's cycle, restricted to its department when
    /// it has one, ordered by evaluation id.
    pub async fn evaluations_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<EvaluationReview>, CalibrationError> {
        let session = load_session(self.sessions.as_ref(), session_id).await?;
        let employees: HashMap<EmployeeId, EmployeeProfile> = self
            .directory
            .employees()
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();

        let mut reviews: Vec<EvaluationReview> = self
            .evaluations
            .evaluations_for_cycle(session.cycle_id)
            .await?
            .into_iter()
            .filter_map(|evaluation| {
                let employee = employees.get(&evaluation.employee_id).cloned();
                if let Some(department) = session.department_id
                    && employee.as_ref().and_then(|e| e.department_id) != Some(department)
                {
                    return None;
                }
                let discrepancy = analyze(&evaluation, self.policy.discrepancy_threshold);
                Some(EvaluationReview {
                    evaluation,
                    employee,
                    discrepancy,
                })
            })
            .collect();
        reviews.sort_by_key(|r| r.evaluation.id);
        Ok(reviews)
    }

    /// Audit trail of one employee, oldest first
    pub async fn history(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<HistoryEntry>, CalibrationError> {
        if self.directory.employee(employee_id).await?.is_none() {
            return Err(DomainError::not_found("employee", employee_id).into());
        }
        let mut entries = self.history.history_for_employee(employee_id).await?;
        entries.sort_by_key(|e| (e.changed_at, e.id));
        Ok(entries)
    }

    /// Changes recorded inside one session, oldest first
    pub async fn session_history(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<HistoryEntry>, CalibrationError> {
        load_session(self.sessions.as_ref(), session_id).await?;
        let mut entries = self.history.history_for_session(session_id).await?;
        entries.sort_by_key(|e| (e.changed_at, e.id));
        Ok(entries)
    }

    pub async fn grid_distribution(&self) -> Result<GridDistribution, CalibrationError> {
        let positions = self.positions.positions().await?;
        Ok(GridDistribution::from_positions(&positions))
    }

    pub async fn placement_stats(&self) -> Result<PlacementStats, CalibrationError> {
        let entries = self.history.all_history().await?;
        Ok(PlacementStats::from_entries(&entries))
    }
}
