//! Scoring ledger port
//!
//! Evaluations arrive from the external scoring pipeline. The only write the
//! engine itself performs is [`EvaluationRepository::resolve`].

use super::store_error::StoreError;
use async_trait::async_trait;
use calibration_domain::{CycleId, Evaluation, EvaluationId, HistoryEntry, Resolution};

#[async_trait]
pub trait EvaluationRepository: Send + Sync {
    async fn evaluation(&self, id: EvaluationId) -> Result<Option<Evaluation>, StoreError>;

    async fn evaluations_for_cycle(&self, cycle_id: CycleId)
    -> Result<Vec<Evaluation>, StoreError>;

    /// Load an evaluation produced by the scoring pipeline
    async fn import_evaluation(&self, evaluation: Evaluation) -> Result<(), StoreError>;

    /// Resolve an evaluation and append its history entry in one atomic step.
    ///
    /// Fails with [`StoreError::VersionConflict`] when the evaluation changed
    /// since `resolution.expected_version` was read, and with
    /// [`StoreError::Rejected`] wrapping `SessionNotActive` when the
    /// resolving session is no longer active at write time. Nothing is
    /// written in either case.
    async fn resolve(&self, resolution: Resolution)
    -> Result<(Evaluation, HistoryEntry), StoreError>;
}
