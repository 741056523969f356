//! Consensus Resolver use case
//!
//! The single gate through which an evaluation's consensus is fixed.
//! `open --resolve--> resolved` is terminal and only the session facilitator
//! may take it. Two facilitators racing on the same evaluation are settled
//! by the store's version compare-and-set: one wins, the other sees
//! `EVALUATION_ALREADY_RESOLVED`.

use super::error::CalibrationError;
use super::shared::{load_session, publish, require_facilitator};
use crate::config::CalibrationPolicy;
use crate::ports::evaluation_repository::EvaluationRepository;
use crate::ports::event_broadcaster::EventBroadcaster;
use crate::ports::session_repository::SessionRepository;
use calibration_domain::{
    Actor, CalibrationEvent, Consensus, DomainError, Evaluation, EvaluationId, Justification,
    Resolution, Score, SessionId,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Input for fixing a consensus score
#[derive(Debug, Clone)]
pub struct ResolveInput {
    pub session_id: SessionId,
    pub evaluation_id: EvaluationId,
    pub consensus_score: f64,
    pub justification: String,
}

pub struct ConsensusResolver {
    sessions: Arc<dyn SessionRepository>,
    evaluations: Arc<dyn EvaluationRepository>,
    broadcaster: Arc<dyn EventBroadcaster>,
    policy: CalibrationPolicy,
}

impl ConsensusResolver {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        evaluations: Arc<dyn EvaluationRepository>,
        broadcaster: Arc<dyn EventBroadcaster>,
        policy: CalibrationPolicy,
    ) -> Self {
        Self {
            sessions,
            evaluations,
            broadcaster,
            policy,
        }
    }

    /// Fix the consensus score of one evaluation.
    ///
    /// The evaluation update and its history entry are written together; on
    /// any error neither exists.
    pub async fn resolve(
        &self,
        input: ResolveInput,
        actor: &Actor,
    ) -> Result<Evaluation, CalibrationError> {
        let session = load_session(self.sessions.as_ref(), input.session_id).await?;
        require_facilitator(
            self.sessions.as_ref(),
            session.id,
            actor,
            "resolve a consensus",
        )
        .await?;
        session.ensure_active()?;

        let score = Score::new(input.consensus_score)?;
        let justification =
            Justification::with_min_len(input.justification, self.policy.min_justification_len)?;

        let evaluation = self
            .evaluations
            .evaluation(input.evaluation_id)
            .await?
            .ok_or_else(|| DomainError::not_found("evaluation", input.evaluation_id))?;
        if evaluation.cycle_id != session.cycle_id {
            return Err(DomainError::validation(format!(
                "{} does not belong to the cycle of {}",
                evaluation.id, session.id
            ))
            .into());
        }
        evaluation.ensure_open()?;

        let resolution = Resolution {
            evaluation_id: evaluation.id,
            expected_version: evaluation.version,
            consensus: Consensus {
                score,
                justification,
                resolved_by: actor.id,
                resolved_at: Utc::now(),
                session_id: session.id,
            },
        };

        let (resolved, entry) = match self.evaluations.resolve(resolution).await {
            Ok(result) => result,
            Err(e) if e.is_conflict() => {
                warn!(
                    evaluation_id = %evaluation.id,
                    actor = %actor.id,
                    "Lost consensus race, evaluation already resolved"
                );
                return Err(DomainError::EvaluationAlreadyResolved(evaluation.id).into());
            }
            Err(e) => return Err(e.into()),
        };
        info!(
            session_id = %session.id,
            evaluation_id = %resolved.id,
            employee_id = %resolved.employee_id,
            score = %score,
            history_id = %entry.id,
            "Consensus reached"
        );

        publish(
            self.broadcaster.as_ref(),
            CalibrationEvent::consensus_reached(session.id, resolved.id, resolved.employee_id),
        );
        Ok(resolved)
    }
}
