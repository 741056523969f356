//! Vote types for calibration sessions
//!
//! The voting ledger is a log, not a map: a voter may vote several times on
//! the same evaluation and every vote is kept.

use crate::core::ids::{EvaluationId, SessionId, UserId, VoteId};
use crate::core::justification::Justification;
use crate::core::score::Score;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether the voter backs or opposes the proposed score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    Approve,
    Reject,
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteType::Approve => write!(f, "approve"),
            VoteType::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for VoteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approve" | "yes" | "+" => Ok(VoteType::Approve),
            "reject" | "no" | "-" => Ok(VoteType::Reject),
            _ => Err(format!("Unknown vote type: {}. Valid: approve, reject", s)),
        }
    }
}

/// A vote cast against one evaluation within one session
///
/// # Example
///
/// ```
/// use calibration_domain::{EvaluationId, Justification, Score, SessionId, UserId, VoteType};
/// use calibration_domain::calibration::vote::VoteDraft;
///
/// let draft = VoteDraft {
///     session_id: SessionId::new(1),
///     evaluation_id: EvaluationId::new(7),
///     voter_id: UserId::new(3),
///     proposed_score: Score::new(4.0).unwrap(),
///     justification: Justification::new("Delivered the migration early").unwrap(),
///     vote_type: VoteType::Approve,
/// };
/// assert!(draft.is_approval());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub session_id: SessionId,
    pub evaluation_id: EvaluationId,
    pub voter_id: UserId,
    pub proposed_score: Score,
    pub justification: Justification,
    pub vote_type: VoteType,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn is_approval(&self) -> bool {
        self.vote_type == VoteType::Approve
    }
}

/// A validated vote awaiting an id and timestamp from the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct VoteDraft {
    pub session_id: SessionId,
    pub evaluation_id: EvaluationId,
    pub voter_id: UserId,
    pub proposed_score: Score,
    pub justification: Justification,
    pub vote_type: VoteType,
}

impl VoteDraft {
    pub fn is_approval(&self) -> bool {
        self.vote_type == VoteType::Approve
    }

    pub fn into_vote(self, id: VoteId, created_at: DateTime<Utc>) -> Vote {
        Vote {
            id,
            session_id: self.session_id,
            evaluation_id: self.evaluation_id,
            voter_id: self.voter_id,
            proposed_score: self.proposed_score,
            justification: self.justification,
            vote_type: self.vote_type,
            created_at,
        }
    }
}

/// Display-side aggregation of the votes on one evaluation
///
/// The ledger never aggregates; this is computed by callers that want a
/// summary next to the raw log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteTally {
    pub approve_count: usize,
    pub reject_count: usize,
    pub total_votes: usize,
    /// Mean proposed score across all votes
    pub mean_proposed: Option<f64>,
    /// Mean proposed score across approving votes only
    pub mean_approved: Option<f64>,
    /// Number of distinct voters
    pub distinct_voters: usize,
}

impl VoteTally {
    pub fn from_votes(votes: &[Vote]) -> Self {
        let approve_count = votes.iter().filter(|v| v.is_approval()).count();
        let total_votes = votes.len();

        let all: Vec<f64> = votes.iter().map(|v| v.proposed_score.value()).collect();
        let approved: Vec<f64> = votes
            .iter()
            .filter(|v| v.is_approval())
            .map(|v| v.proposed_score.value())
            .collect();

        let mut voters: Vec<UserId> = votes.iter().map(|v| v.voter_id).collect();
        voters.sort();
        voters.dedup();

        Self {
            approve_count,
            reject_count: total_votes - approve_count,
            total_votes,
            mean_proposed: super::discrepancy::average(&all),
            mean_approved: super::discrepancy::average(&approved),
            distinct_voters: voters.len(),
        }
    }

    /// Check if every vote went the same way
    pub fn is_unanimous(&self) -> bool {
        self.total_votes > 0
            && (self.approve_count == self.total_votes || self.reject_count == self.total_votes)
    }

    /// Get the approval ratio (0.0 to 1.0)
    pub fn approval_ratio(&self) -> f64 {
        if self.total_votes == 0 {
            0.0
        } else {
            self.approve_count as f64 / self.total_votes as f64
        }
    }

    /// Generate a visual vote summary (e.g., "[●●○]")
    pub fn summary(votes: &[Vote]) -> String {
        let mut summary = String::from("[");
        for vote in votes {
            summary.push(if vote.is_approval() { '●' } else { '○' });
        }
        summary.push(']');
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(id: u64, voter: u64, score: f64, vote_type: VoteType) -> Vote {
        VoteDraft {
            session_id: SessionId::new(1),
            evaluation_id: EvaluationId::new(1),
            voter_id: UserId::new(voter),
            proposed_score: Score::new(score).unwrap(),
            justification: Justification::new("reason").unwrap(),
            vote_type,
        }
        .into_vote(VoteId::new(id), Utc::now())
    }

    #[test]
    fn test_vote_type_parsing() {
        assert_eq!("Approve".parse::<VoteType>().unwrap(), VoteType::Approve);
        assert_eq!("no".parse::<VoteType>().unwrap(), VoteType::Reject);
        assert!("abstain".parse::<VoteType>().is_err());
    }

    #[test]
    fn test_tally_counts_and_means() {
        let votes = vec![
            vote(1, 10, 4.0, VoteType::Approve),
            vote(2, 11, 3.0, VoteType::Approve),
            vote(3, 12, 2.0, VoteType::Reject),
        ];
        let tally = VoteTally::from_votes(&votes);

        assert_eq!(tally.approve_count, 2);
        assert_eq!(tally.reject_count, 1);
        assert_eq!(tally.mean_proposed, Some(3.0));
        assert_eq!(tally.mean_approved, Some(3.5));
        assert!(!tally.is_unanimous());
    }

    #[test]
    fn test_tally_keeps_repeat_voters() {
        let votes = vec![
            vote(1, 10, 4.0, VoteType::Approve),
            vote(2, 10, 4.5, VoteType::Approve),
        ];
        let tally = VoteTally::from_votes(&votes);
        assert_eq!(tally.total_votes, 2);
        assert_eq!(tally.distinct_voters, 1);
        assert!(tally.is_unanimous());
        assert_eq!(tally.approval_ratio(), 1.0);
    }

    #[test]
    fn test_empty_tally() {
        let tally = VoteTally::from_votes(&[]);
        assert_eq!(tally.total_votes, 0);
        assert!(tally.mean_proposed.is_none());
        assert!(!tally.is_unanimous());
        assert_eq!(tally.approval_ratio(), 0.0);
    }

    #[test]
    fn test_summary() {
        let votes = vec![
            vote(1, 1, 3.0, VoteType::Approve),
            vote(2, 2, 3.0, VoteType::Approve),
            vote(3, 3, 3.0, VoteType::Reject),
        ];
        assert_eq!(VoteTally::summary(&votes), "[●●○]");
    }
}
