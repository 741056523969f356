//! History store port (read side)
//!
//! History is only ever written as part of a resolution or a move; see
//! [`EvaluationRepository::resolve`](super::evaluation_repository::EvaluationRepository::resolve)
//! and [`PositionRepository::apply_move`](super::position_repository::PositionRepository::apply_move).

use super::store_error::StoreError;
use async_trait::async_trait;
use calibration_domain::{EmployeeId, HistoryEntry, SessionId};

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Entries for one employee in non-decreasing `changed_at` order
    async fn history_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<HistoryEntry>, StoreError>;

    /// Entries recorded inside one session, oldest first
    async fn history_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<HistoryEntry>, StoreError>;

    async fn all_history(&self) -> Result<Vec<HistoryEntry>, StoreError>;
}
