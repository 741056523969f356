//! Voting ledger port

use super::store_error::StoreError;
use async_trait::async_trait;
use calibration_domain::{EvaluationId, SessionId, Vote, VoteDraft};

/// Append-only log of votes. Appends need no coordination between callers.
#[async_trait]
pub trait VoteLedger: Send + Sync {
    /// Append a vote; rejected with `SessionNotActive` unless the vote's
    /// session is active at write time.
    async fn append_vote(&self, draft: VoteDraft) -> Result<Vote, StoreError>;

    /// All votes on one evaluation within one session, in insertion order
    async fn votes(
        &self,
        session_id: SessionId,
        evaluation_id: EvaluationId,
    ) -> Result<Vec<Vote>, StoreError>;
}
