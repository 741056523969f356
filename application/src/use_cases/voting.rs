//! Voting use case
//!
//! Participants propose a score for one evaluation and say why. Only users
//! with a participant row in the session may vote. The ledger is a plain
//! log: every vote is kept, including several from the same voter.

use super::error::CalibrationError;
use super::shared::{load_active_session, publish, require_participant};
use crate::config::CalibrationPolicy;
use crate::ports::evaluation_repository::EvaluationRepository;
use crate::ports::event_broadcaster::EventBroadcaster;
use crate::ports::session_repository::SessionRepository;
use crate::ports::vote_ledger::VoteLedger;
use calibration_domain::{
    Actor, CalibrationEvent, CalibrationSession, DomainError, Evaluation, EvaluationId,
    Justification, Score, SessionId, Vote, VoteDraft, VoteTally, VoteType,
};
use std::sync::Arc;
use tracing::info;

/// Input for casting a vote
#[derive(Debug, Clone)]
pub struct SubmitVoteInput {
    pub session_id: SessionId,
    pub evaluation_id: EvaluationId,
    pub proposed_score: f64,
    pub justification: String,
    pub vote_type: VoteType,
}

pub struct VotingUseCase {
    sessions: Arc<dyn SessionRepository>,
    evaluations: Arc<dyn EvaluationRepository>,
    votes: Arc<dyn VoteLedger>,
    broadcaster: Arc<dyn EventBroadcaster>,
    policy: CalibrationPolicy,
}

impl VotingUseCase {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        evaluations: Arc<dyn EvaluationRepository>,
        votes: Arc<dyn VoteLedger>,
        broadcaster: Arc<dyn EventBroadcaster>,
        policy: CalibrationPolicy,
    ) -> Self {
        Self {
            sessions,
            evaluations,
            votes,
            broadcaster,
            policy,
        }
    }

    /// Cast a vote as `actor`.
    ///
    /// Every check runs before the append; a rejected vote writes nothing.
    pub async fn submit_vote(
        &self,
        input: SubmitVoteInput,
        actor: &Actor,
    ) -> Result<Vote, CalibrationError> {
        let session = load_active_session(self.sessions.as_ref(), input.session_id).await?;
        require_participant(self.sessions.as_ref(), session.id, actor, "vote").await?;
        let proposed_score = Score::new(input.proposed_score)?;
        let justification =
            Justification::with_min_len(input.justification, self.policy.min_justification_len)?;

        let evaluation = self.evaluation_in(&session, input.evaluation_id).await?;
        evaluation.ensure_open()?;

        let vote = self
            .votes
            .append_vote(VoteDraft {
                session_id: session.id,
                evaluation_id: evaluation.id,
                voter_id: actor.id,
                proposed_score,
                justification,
                vote_type: input.vote_type,
            })
            .await?;
        info!(
            session_id = %vote.session_id,
            evaluation_id = %vote.evaluation_id,
            voter_id = %vote.voter_id,
            score = %vote.proposed_score,
            vote_type = %vote.vote_type,
            "Vote recorded"
        );

        publish(
            self.broadcaster.as_ref(),
            CalibrationEvent::new_vote(vote.session_id, vote.evaluation_id),
        );
        Ok(vote)
    }

    /// All votes on one evaluation in one session, in insertion order
    pub async fn list_votes(
        &self,
        session_id: SessionId,
        evaluation_id: EvaluationId,
    ) -> Result<Vec<Vote>, CalibrationError> {
        Ok(self.votes.votes(session_id, evaluation_id).await?)
    }

    pub async fn tally(
        &self,
        session_id: SessionId,
        evaluation_id: EvaluationId,
    ) -> Result<VoteTally, CalibrationError> {
        let votes = self.list_votes(session_id, evaluation_id).await?;
        Ok(VoteTally::from_votes(&votes))
    }

    async fn evaluation_in(
        &self,
        session: &CalibrationSession,
        evaluation_id: EvaluationId,
    ) -> Result<Evaluation, CalibrationError> {
        let evaluation = self
            .evaluations
            .evaluation(evaluation_id)
            .await?
            .ok_or_else(|| DomainError::not_found("evaluation", evaluation_id))?;
        if evaluation.cycle_id != session.cycle_id {
            return Err(DomainError::validation(format!(
                "{evaluation_id} does not belong to the cycle of {}",
                session.id
            ))
            .into());
        }
        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::session_manager::{CreateSessionInput, SessionManager};
    use crate::use_cases::testing::{
        CYCLE, FakeStore, FailingBroadcaster, RecordingBroadcaster, cycle_start, hr, manager,
        peer,
    };
    use calibration_domain::{CycleId, ErrorKind, EventKind};
    use chrono::Duration;

    struct Fixture {
        store: Arc<FakeStore>,
        events: Arc<RecordingBroadcaster>,
        sessions: SessionManager,
        voting: VotingUseCase,
    }

    fn fixture() -> Fixture {
        let store = FakeStore::seeded();
        let events = Arc::new(RecordingBroadcaster::default());
        Fixture {
            sessions: SessionManager::new(store.clone(), store.clone(), CalibrationPolicy::default()),
            voting: VotingUseCase::new(
                store.clone(),
                store.clone(),
                store.clone(),
                events.clone(),
                CalibrationPolicy::default(),
            ),
            store,
            events,
        }
    }

    async fn active_session(fx: &Fixture) -> SessionId {
        let input = CreateSessionInput::new(CYCLE, cycle_start() + Duration::days(7))
            .with_participants([peer().id, manager().id]);
        let id = fx.sessions.create_session(input, &hr()).await.unwrap().session.id;
        fx.sessions.join(id, &hr()).await.unwrap();
        id
    }

    fn vote(session_id: SessionId, score: f64, justification: &str) -> SubmitVoteInput {
        SubmitVoteInput {
            session_id,
            evaluation_id: EvaluationId::new(100),
            proposed_score: score,
            justification: justification.to_string(),
            vote_type: VoteType::Approve,
        }
    }

    #[tokio::test]
    async fn test_submit_vote_records_and_broadcasts() {
        let fx = fixture();
        let id = active_session(&fx).await;

        let cast = fx
            .voting
            .submit_vote(vote(id, 3.5, "Delivered the Q2 launch"), &peer())
            .await
            .unwrap();
        assert_eq!(cast.voter_id, peer().id);
        assert_eq!(cast.proposed_score.value(), 3.5);

        let events = fx.events.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::NewVote);
        assert_eq!(events[0].evaluation_id, Some(EvaluationId::new(100)));
    }

    #[tokio::test]
    async fn test_invalid_votes_write_nothing() {
        let fx = fixture();
        let id = active_session(&fx).await;

        for (score, justification) in [(0.5, "reason"), (5.5, "reason"), (3.0, "   ")] {
            let err = fx
                .voting
                .submit_vote(vote(id, score, justification), &peer())
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValidationError);
        }
        assert_eq!(fx.store.vote_count(), 0);
        assert!(fx.events.events().is_empty());
    }

    #[tokio::test]
    async fn test_vote_needs_active_session() {
        let fx = fixture();
        let input = CreateSessionInput::new(CYCLE, cycle_start() + Duration::days(7));
        let id = fx.sessions.create_session(input, &hr()).await.unwrap().session.id;

        let err = fx
            .voting
            .submit_vote(vote(id, 3.0, "reason"), &peer())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SessionNotActive);

        fx.sessions.join(id, &hr()).await.unwrap();
        fx.sessions.conclude(id, None, &hr()).await.unwrap();
        let err = fx
            .voting
            .submit_vote(vote(id, 3.0, "reason"), &peer())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SessionNotActive);
    }

    #[tokio::test]
    async fn test_non_member_cannot_vote() {
        let fx = fixture();
        let id = active_session(&fx).await;
        let outsider = Actor::new(
            calibration_domain::UserId::new(77),
            calibration_domain::ActorRole::Hr,
        );

        let err = fx
            .voting
            .submit_vote(vote(id, 3.0, "reason"), &outsider)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(fx.store.vote_count(), 0);
        assert!(fx.events.events().is_empty());

        // Joining creates the row and lets the same user vote
        fx.sessions.join(id, &outsider).await.unwrap();
        fx.voting
            .submit_vote(vote(id, 3.0, "reason"), &outsider)
            .await
            .unwrap();
        assert_eq!(fx.store.vote_count(), 1);
    }

    #[tokio::test]
    async fn test_vote_on_resolved_evaluation() {
        let fx = fixture();
        let id = active_session(&fx).await;
        let mut evaluation = Evaluation::open(
            EvaluationId::new(300),
            CYCLE,
            calibration_domain::EmployeeId::new(100),
            None,
            None,
            vec![],
        );
        evaluation.status = calibration_domain::EvaluationStatus::Resolved;
        fx.store.insert_evaluation(evaluation);

        let mut input = vote(id, 3.0, "reason");
        input.evaluation_id = EvaluationId::new(300);
        let err = fx.voting.submit_vote(input, &peer()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EvaluationAlreadyResolved);
    }

    #[tokio::test]
    async fn test_vote_outside_session_cycle() {
        let fx = fixture();
        let id = active_session(&fx).await;
        fx.store.insert_evaluation(Evaluation::open(
            EvaluationId::new(301),
            CycleId::new(2),
            calibration_domain::EmployeeId::new(100),
            None,
            None,
            vec![],
        ));

        let mut input = vote(id, 3.0, "reason");
        input.evaluation_id = EvaluationId::new(301);
        let err = fx.voting.submit_vote(input, &peer()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);

        let mut input = vote(id, 3.0, "reason");
        input.evaluation_id = EvaluationId::new(999);
        let err = fx.voting.submit_vote(input, &peer()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_concurrent_votes_both_recorded() {
        let fx = fixture();
        let id = active_session(&fx).await;

        let (peer_actor, manager_actor) = (peer(), manager());
        let (a, b) = tokio::join!(
            fx.voting.submit_vote(vote(id, 3.0, "Solid year"), &peer_actor),
            fx.voting.submit_vote(vote(id, 4.0, "Led the migration"), &manager_actor)
        );
        assert!(a.is_ok());
        assert!(b.is_ok());

        let votes = fx.voting.list_votes(id, EvaluationId::new(100)).await.unwrap();
        assert_eq!(votes.len(), 2);
        let tally = fx.voting.tally(id, EvaluationId::new(100)).await.unwrap();
        assert_eq!(tally.approve_count, 2);
        assert_eq!(tally.mean_proposed, Some(3.5));
    }

    #[tokio::test]
    async fn test_repeat_votes_are_kept() {
        let fx = fixture();
        let id = active_session(&fx).await;
        fx.voting
            .submit_vote(vote(id, 3.0, "first take"), &peer())
            .await
            .unwrap();
        let mut second = vote(id, 2.0, "changed my mind");
        second.vote_type = VoteType::Reject;
        fx.voting.submit_vote(second, &peer()).await.unwrap();

        let votes = fx.voting.list_votes(id, EvaluationId::new(100)).await.unwrap();
        assert_eq!(votes.len(), 2);
        assert_eq!(votes[0].justification.as_str(), "first take");
        let tally = fx.voting.tally(id, EvaluationId::new(100)).await.unwrap();
        assert_eq!(tally.distinct_voters, 1);
        assert_eq!(tally.reject_count, 1);
    }

    #[tokio::test]
    async fn test_broadcast_failure_keeps_vote() {
        let fx = fixture();
        let id = active_session(&fx).await;
        let voting = VotingUseCase::new(
            fx.store.clone(),
            fx.store.clone(),
            fx.store.clone(),
            Arc::new(FailingBroadcaster),
            CalibrationPolicy::default(),
        );

        voting
            .submit_vote(vote(id, 3.0, "reason"), &peer())
            .await
            .unwrap();
        assert_eq!(fx.store.vote_count(), 1);
    }
}
