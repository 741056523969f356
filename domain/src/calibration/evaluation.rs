//! Evaluation entity and its open → resolved state machine

use crate::core::error::DomainError;
use crate::core::ids::{CycleId, EmployeeId, EvaluationId, SessionId, UserId};
use crate::core::justification::Justification;
use crate::core::score::Score;
use crate::placement::history::{HistoryChange, HistoryDraft};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolution state of an evaluation. `Resolved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    #[default]
    Open,
    Resolved,
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationStatus::Open => write!(f, "open"),
            EvaluationStatus::Resolved => write!(f, "resolved"),
        }
    }
}

/// The authoritative outcome fixed by a facilitator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consensus {
    pub score: Score,
    pub justification: Justification,
    pub resolved_by: UserId,
    pub resolved_at: DateTime<Utc>,
    pub session_id: SessionId,
}

/// A request to fix the consensus of one evaluation, guarded by the version
/// the caller read (compare-and-set)
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub evaluation_id: EvaluationId,
    pub expected_version: u64,
    pub consensus: Consensus,
}

impl Resolution {
    /// Resolve `evaluation` and describe the change for the audit trail.
    ///
    /// Leaves `evaluation` untouched on failure.
    pub fn apply(self, evaluation: &mut Evaluation) -> Result<HistoryDraft, DomainError> {
        let old_score = evaluation.consensus_score();
        let draft = HistoryDraft {
            employee_id: evaluation.employee_id,
            session_id: Some(self.consensus.session_id),
            change: HistoryChange::Consensus {
                evaluation_id: evaluation.id,
                old_score,
                new_score: self.consensus.score,
            },
            justification: self.consensus.justification.clone(),
            changed_by: self.consensus.resolved_by,
        };
        evaluation.resolve(self.consensus)?;
        Ok(draft)
    }
}

/// One employee's evaluation for one cycle (Entity)
///
/// Source scores are produced by the external scoring pipeline and are
/// read-only here; only the consensus may be set, and only once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub cycle_id: CycleId,
    pub employee_id: EmployeeId,
    pub self_score: Option<f64>,
    pub manager_score: Option<f64>,
    #[serde(default)]
    pub peer_scores: Vec<f64>,
    #[serde(default)]
    pub status: EvaluationStatus,
    #[serde(default)]
    pub consensus: Option<Consensus>,
    /// Optimistic concurrency counter, bumped on resolution
    #[serde(default)]
    pub version: u64,
}

impl Evaluation {
    /// A fresh, unresolved evaluation as delivered by the scoring pipeline
    pub fn open(
        id: EvaluationId,
        cycle_id: CycleId,
        employee_id: EmployeeId,
        self_score: Option<f64>,
        manager_score: Option<f64>,
        peer_scores: Vec<f64>,
    ) -> Self {
        Self {
            id,
            cycle_id,
            employee_id,
            self_score,
            manager_score,
            peer_scores,
            status: EvaluationStatus::Open,
            consensus: None,
            version: 0,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status == EvaluationStatus::Resolved
    }

    pub fn consensus_score(&self) -> Option<Score> {
        self.consensus.as_ref().map(|c| c.score)
    }

    /// Fail with `EvaluationAlreadyResolved` once consensus is final
    pub fn ensure_open(&self) -> Result<(), DomainError> {
        if self.is_resolved() {
            Err(DomainError::EvaluationAlreadyResolved(self.id))
        } else {
            Ok(())
        }
    }

    /// Apply the single open → resolved transition
    pub fn resolve(&mut self, consensus: Consensus) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.status = EvaluationStatus::Resolved;
        self.consensus = Some(consensus);
        self.version += 1;
        Ok(())
    }

    /// Whether `hasDiscrepancy` holds under the given threshold
    pub fn has_discrepancy(&self, threshold: f64) -> bool {
        super::discrepancy::analyze(self, threshold).has_discrepancy
    }
}
