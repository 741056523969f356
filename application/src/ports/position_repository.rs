//! Position store port

use super::store_error::StoreError;
use async_trait::async_trait;
use calibration_domain::{EmployeeId, HistoryEntry, PositionMove, PositionRecord};

#[async_trait]
pub trait PositionRepository: Send + Sync {
    async fn position(&self, employee_id: EmployeeId)
    -> Result<Option<PositionRecord>, StoreError>;

    async fn positions(&self) -> Result<Vec<PositionRecord>, StoreError>;

    /// Load a position produced by the scoring pipeline (no history entry)
    async fn import_position(&self, record: PositionRecord) -> Result<(), StoreError>;

    /// Apply a move against whatever position is current at write time and
    /// append its history entry, atomically. Concurrent moves of the same
    /// employee are all recorded; the last one wins as current position.
    /// A move made inside a session is rejected with `SessionNotActive`
    /// unless that session is active at write time.
    async fn apply_move(
        &self,
        movement: PositionMove,
    ) -> Result<(PositionRecord, HistoryEntry), StoreError>;
}
