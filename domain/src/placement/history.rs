//! Permanent audit trail of score and position changes
//!
//! Entries are append-only: never mutated, never deleted. Exactly one entry
//! is written per mutation of a grid position or of a consensus score.

use super::position::PositionRecord;
use super::quadrant::Quadrant;
use crate::core::ids::{EmployeeId, EvaluationId, HistoryEntryId, SessionId, UserId};
use crate::core::justification::Justification;
use crate::core::score::{Rating, Score};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum HistoryChange {
    /// A grid move; `old_*` are absent when the employee had no position yet
    Position {
        old_performance: Option<Rating>,
        new_performance: Rating,
        old_potential: Option<Rating>,
        new_potential: Rating,
        old_quadrant: Option<Quadrant>,
        new_quadrant: Quadrant,
    },
    /// A consensus score fixed by a facilitator
    Consensus {
        evaluation_id: EvaluationId,
        old_score: Option<Score>,
        new_score: Score,
    },
}

impl HistoryChange {
    /// Describe the move from `current` (if any) to `next`
    pub fn position(current: Option<&PositionRecord>, next: &PositionRecord) -> Self {
        HistoryChange::Position {
            old_performance: current.map(|p| p.performance),
            new_performance: next.performance,
            old_potential: current.map(|p| p.potential),
            new_potential: next.potential,
            old_quadrant: current.map(PositionRecord::quadrant),
            new_quadrant: next.quadrant(),
        }
    }

    pub fn is_position(&self) -> bool {
        matches!(self, HistoryChange::Position { .. })
    }

    pub fn is_consensus(&self) -> bool {
        matches!(self, HistoryChange::Consensus { .. })
    }
}

/// An immutable audit record of one change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: HistoryEntryId,
    pub employee_id: EmployeeId,
    /// `None` for direct placements made outside a session
    pub session_id: Option<SessionId>,
    #[serde(flatten)]
    pub change: HistoryChange,
    pub justification: Justification,
    pub changed_by: UserId,
    pub changed_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn is_direct(&self) -> bool {
        self.session_id.is_none()
    }
}

/// A history record awaiting its id and timestamp from the store
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryDraft {
    pub employee_id: EmployeeId,
    pub session_id: Option<SessionId>,
    pub change: HistoryChange,
    pub justification: Justification,
    pub changed_by: UserId,
}

impl HistoryDraft {
    pub fn into_entry(self, id: HistoryEntryId, changed_at: DateTime<Utc>) -> HistoryEntry {
        HistoryEntry {
            id,
            employee_id: self.employee_id,
            session_id: self.session_id,
            change: self.change,
            justification: self.justification,
            changed_by: self.changed_by,
            changed_at,
        }
    }
}

/// Counts over the audit trail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementStats {
    pub total_changes: usize,
    pub session_moves: usize,
    pub direct_moves: usize,
    pub consensus_resolutions: usize,
}

impl PlacementStats {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a HistoryEntry>) -> Self {
        let mut stats = PlacementStats::default();
        for entry in entries {
            stats.total_changes += 1;
            match (&entry.change, entry.session_id) {
                (HistoryChange::Consensus { .. }, _) => stats.consensus_resolutions += 1,
                (HistoryChange::Position { .. }, Some(_)) => stats.session_moves += 1,
                (HistoryChange::Position { .. }, None) => stats.direct_moves += 1,
            }
        }
        stats
    }
}
