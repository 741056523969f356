//! Session Manager use case
//!
//! Lifecycle and membership of calibration sessions:
//!
//! ```text
//! create ──▶ scheduled ──first join──▶ active ──conclude──▶ concluded
//! ```
//!
//! Status changes are compare-and-set writes on the session version, so two
//! users joining at the same moment activate the session exactly once.

use super::error::CalibrationError;
use super::shared::{load_session, require_facilitator};
use crate::config::CalibrationPolicy;
use crate::ports::directory::CycleRegistry;
use crate::ports::session_repository::SessionRepository;
use calibration_domain::{
    Actor, CalibrationSession, CycleId, DepartmentId, DomainError, NewSession, Participant,
    ParticipantRole, SessionFilter, SessionId, UserId,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Input for scheduling a session
#[derive(Debug, Clone)]
pub struct CreateSessionInput {
    pub cycle_id: CycleId,
    pub scheduled_for: DateTime<Utc>,
    /// Restrict the session to one department's evaluations
    pub department_id: Option<DepartmentId>,
    /// Users pre-registered as voters
    pub participant_ids: Vec<UserId>,
}

impl CreateSessionInput {
    pub fn new(cycle_id: CycleId, scheduled_for: DateTime<Utc>) -> Self {
        Self {
            cycle_id,
            scheduled_for,
            department_id: None,
            participant_ids: Vec::new(),
        }
    }

    pub fn with_department(mut self, department_id: DepartmentId) -> Self {
        self.department_id = Some(department_id);
        self
    }

    pub fn with_participants(mut self, ids: impl IntoIterator<Item = UserId>) -> Self {
        self.participant_ids.extend(ids);
        self
    }
}

/// A session together with its membership
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionDetails {
    pub session: CalibrationSession,
    pub participants: Vec<Participant>,
}

impl SessionDetails {
    pub fn online_count(&self) -> usize {
        self.participants.iter().filter(|p| p.is_online).count()
    }

    pub fn facilitators(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_facilitator())
    }
}

pub struct SessionManager {
    sessions: Arc<dyn SessionRepository>,
    cycles: Arc<dyn CycleRegistry>,
    policy: CalibrationPolicy,
}

impl SessionManager {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        cycles: Arc<dyn CycleRegistry>,
        policy: CalibrationPolicy,
    ) -> Self {
        Self {
            sessions,
            cycles,
            policy,
        }
    }

    /// Schedule a session. The creator becomes its facilitator.
    pub async fn create_session(
        &self,
        input: CreateSessionInput,
        actor: &Actor,
    ) -> Result<SessionDetails, CalibrationError> {
        if !actor.role.can_schedule_sessions() {
            return Err(DomainError::Forbidden {
                actor: actor.id,
                action: "schedule a calibration session",
            }
            .into());
        }

        let cycle = self
            .cycles
            .cycle(input.cycle_id)
            .await?
            .ok_or_else(|| DomainError::not_found("cycle", input.cycle_id))?;
        if !cycle.covers(input.scheduled_for) {
            return Err(DomainError::validation(format!(
                "{} is outside the {} cycle window",
                input.scheduled_for.format("%Y-%m-%d %H:%M"),
                cycle.name
            ))
            .into());
        }

        let draft = NewSession {
            cycle_id: input.cycle_id,
            department_id: input.department_id,
            facilitator_id: actor.id,
            scheduled_for: input.scheduled_for,
        };

        // Session id is assigned by the store; placeholders are rewritten there.
        let placeholder = SessionId::new(0);
        let mut members = vec![Participant::invited(
            placeholder,
            actor.id,
            ParticipantRole::Facilitator,
        )];
        for user_id in input.participant_ids {
            if members.iter().all(|p| p.user_id != user_id) {
                members.push(Participant::invited(
                    placeholder,
                    user_id,
                    ParticipantRole::Voter,
                ));
            }
        }

        let (session, participants) = self.sessions.create_session(draft, members).await?;
        info!(
            session_id = %session.id,
            cycle_id = %session.cycle_id,
            participants = participants.len(),
            "Calibration session scheduled"
        );
        Ok(SessionDetails {
            session,
            participants,
        })
    }

    /// Register a user in a session, or change their role. Facilitator only.
    pub async fn add_participant(
        &self,
        session_id: SessionId,
        user_id: UserId,
        role: ParticipantRole,
        actor: &Actor,
    ) -> Result<Participant, CalibrationError> {
        let session = load_session(self.sessions.as_ref(), session_id).await?;
        require_facilitator(self.sessions.as_ref(), session_id, actor, "add participants").await?;
        if session.status.is_terminal() {
            return Err(DomainError::SessionNotActive(session_id).into());
        }

        let participant = match self.sessions.participant(session_id, user_id).await? {
            Some(mut existing) => {
                existing.role = role;
                existing
            }
            None => Participant::invited(session_id, user_id, role),
        };
        let participant = self
            .sessions
            .upsert_participant(participant, self.policy.facilitator_policy)
            .await?;
        info!(session_id = %session_id, user_id = %user_id, role = %role, "Participant added");
        Ok(participant)
    }

    /// Connect a user. The first join activates a scheduled session.
    pub async fn join(
        &self,
        session_id: SessionId,
        actor: &Actor,
    ) -> Result<Participant, CalibrationError> {
        self.activate(session_id).await?;

        let now = Utc::now();
        let mut participant = self
            .sessions
            .participant(session_id, actor.id)
            .await?
            .unwrap_or_else(|| Participant::invited(session_id, actor.id, ParticipantRole::Voter));
        participant.mark_online(now);
        let participant = self
            .sessions
            .upsert_participant(participant, self.policy.facilitator_policy)
            .await?;
        info!(session_id = %session_id, user_id = %actor.id, "Participant joined");
        Ok(participant)
    }

    /// Flag a user offline. The membership row stays.
    pub async fn leave(
        &self,
        session_id: SessionId,
        actor: &Actor,
    ) -> Result<Participant, CalibrationError> {
        let mut participant = self
            .sessions
            .participant(session_id, actor.id)
            .await?
            .ok_or_else(|| DomainError::not_found("participant", actor.id))?;
        participant.mark_offline(Utc::now());
        let participant = self
            .sessions
            .upsert_participant(participant, self.policy.facilitator_policy)
            .await?;
        info!(session_id = %session_id, user_id = %actor.id, "Participant left");
        Ok(participant)
    }

    /// End the session. Facilitator only; later votes and resolutions fail.
    pub async fn conclude(
        &self,
        session_id: SessionId,
        notes: Option<String>,
        actor: &Actor,
    ) -> Result<CalibrationSession, CalibrationError> {
        load_session(self.sessions.as_ref(), session_id).await?;
        require_facilitator(self.sessions.as_ref(), session_id, actor, "conclude the session")
            .await?;

        loop {
            let mut session = load_session(self.sessions.as_ref(), session_id).await?;
            let expected = session.version;
            session.conclude(Utc::now(), notes.clone())?;
            match self.sessions.save_session(&session, expected).await {
                Ok(()) => {
                    info!(session_id = %session_id, "Calibration session concluded");
                    return Ok(session);
                }
                Err(e) if e.is_conflict() => {
                    debug!(session_id = %session_id, "Session changed while concluding, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub async fn details(&self, session_id: SessionId) -> Result<SessionDetails, CalibrationError> {
        let session = load_session(self.sessions.as_ref(), session_id).await?;
        let participants = self.sessions.participants(session_id).await?;
        Ok(SessionDetails {
            session,
            participants,
        })
    }

    /// Sessions matching `filter`, most recently scheduled first
    pub async fn list(
        &self,
        filter: &SessionFilter,
    ) -> Result<Vec<CalibrationSession>, CalibrationError> {
        Ok(self.sessions.sessions(filter).await?)
    }

    /// Compare-and-set the session into `active`, retrying on conflict.
    async fn activate(&self, session_id: SessionId) -> Result<(), CalibrationError> {
        loop {
            let mut session = load_session(self.sessions.as_ref(), session_id).await?;
            let expected = session.version;
            if !session.activate(Utc::now())? {
                return Ok(());
            }
            match self.sessions.save_session(&session, expected).await {
                Ok(()) => {
                    info!(session_id = %session_id, "Calibration session activated");
                    return Ok(());
                }
                Err(e) if e.is_conflict() => {
                    debug!(session_id = %session_id, "Concurrent activation, re-reading session");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::testing::{CYCLE, FakeStore, SALES, cycle_start, hr, manager, peer};
    use calibration_domain::{ErrorKind, FacilitatorPolicy, SessionStatus};
    use chrono::Duration;

    fn manager_for(store: &Arc<FakeStore>, policy: CalibrationPolicy) -> SessionManager {
        SessionManager::new(store.clone(), store.clone(), policy)
    }

    async fn scheduled(manager_uc: &SessionManager) -> SessionDetails {
        let input = CreateSessionInput::new(CYCLE, cycle_start() + Duration::days(30))
            .with_department(SALES)
            .with_participants([manager().id, peer().id]);
        manager_uc.create_session(input, &hr()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_session_registers_members() {
        let store = FakeStore::seeded();
        let uc = manager_for(&store, CalibrationPolicy::default());
        let details = scheduled(&uc).await;

        assert_eq!(details.session.status, SessionStatus::Scheduled);
        assert_eq!(details.session.facilitator_id, hr().id);
        assert_eq!(details.participants.len(), 3);
        assert_eq!(details.facilitators().count(), 1);
        assert_eq!(details.online_count(), 0);
    }

    #[tokio::test]
    async fn test_create_session_rules() {
        let store = FakeStore::seeded();
        let uc = manager_for(&store, CalibrationPolicy::default());

        let input = CreateSessionInput::new(CYCLE, cycle_start() + Duration::days(1));
        let err = uc.create_session(input.clone(), &peer()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = uc
            .create_session(CreateSessionInput::new(CycleId::new(99), cycle_start()), &hr())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let late = CreateSessionInput::new(CYCLE, cycle_start() + Duration::days(400));
        let err = uc.create_session(late, &hr()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn test_first_join_activates() {
        let store = FakeStore::seeded();
        let uc = manager_for(&store, CalibrationPolicy::default());
        let id = scheduled(&uc).await.session.id;

        let participant = uc.join(id, &peer()).await.unwrap();
        assert!(participant.is_online);
        assert_eq!(participant.role, ParticipantRole::Voter);

        let session = uc.details(id).await.unwrap().session;
        assert_eq!(session.status, SessionStatus::Active);
        assert!(session.started_at.is_some());
        assert_eq!(session.version, 1);
    }

    #[tokio::test]
    async fn test_concurrent_joins_activate_once() {
        let store = FakeStore::seeded();
        let uc = manager_for(&store, CalibrationPolicy::default());
        let id = scheduled(&uc).await.session.id;

        let (hr_actor, manager_actor, peer_actor) = (hr(), manager(), peer());
        let (a, b, c) = tokio::join!(
            uc.join(id, &hr_actor),
            uc.join(id, &manager_actor),
            uc.join(id, &peer_actor)
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());

        let details = uc.details(id).await.unwrap();
        assert_eq!(details.session.version, 1);
        assert_eq!(details.online_count(), 3);
    }

    #[tokio::test]
    async fn test_facilitator_keeps_role_on_join() {
        let store = FakeStore::seeded();
        let uc = manager_for(&store, CalibrationPolicy::default());
        let id = scheduled(&uc).await.session.id;

        let participant = uc.join(id, &hr()).await.unwrap();
        assert!(participant.is_facilitator());
    }

    #[tokio::test]
    async fn test_leave_keeps_row() {
        let store = FakeStore::seeded();
        let uc = manager_for(&store, CalibrationPolicy::default());
        let id = scheduled(&uc).await.session.id;
        uc.join(id, &peer()).await.unwrap();

        let participant = uc.leave(id, &peer()).await.unwrap();
        assert!(!participant.is_online);
        assert!(participant.left_at.is_some());
        assert_eq!(uc.details(id).await.unwrap().participants.len(), 3);
    }

    #[tokio::test]
    async fn test_conclude_requires_facilitator() {
        let store = FakeStore::seeded();
        let uc = manager_for(&store, CalibrationPolicy::default());
        let id = scheduled(&uc).await.session.id;
        uc.join(id, &peer()).await.unwrap();

        let err = uc.conclude(id, None, &peer()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let session = uc
            .conclude(id, Some("All cases reviewed".to_string()), &hr())
            .await
            .unwrap();
        assert_eq!(session.status, SessionStatus::Concluded);
        assert_eq!(session.notes.as_deref(), Some("All cases reviewed"));

        let err = uc.join(id, &manager()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SessionNotActive);
    }

    #[tokio::test]
    async fn test_conclude_scheduled_session_fails() {
        let store = FakeStore::seeded();
        let uc = manager_for(&store, CalibrationPolicy::default());
        let id = scheduled(&uc).await.session.id;

        let err = uc.conclude(id, None, &hr()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SessionNotActive);
    }

    #[tokio::test]
    async fn test_facilitator_policy() {
        let store = FakeStore::seeded();
        let single = manager_for(&store, CalibrationPolicy::default());
        let id = scheduled(&single).await.session.id;

        let err = single
            .add_participant(id, manager().id, ParticipantRole::Facilitator, &hr())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);

        let err = single
            .add_participant(id, UserId::new(50), ParticipantRole::Voter, &peer())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let multiple = manager_for(
            &store,
            CalibrationPolicy::default().with_facilitator_policy(FacilitatorPolicy::Multiple),
        );
        let promoted = multiple
            .add_participant(id, manager().id, ParticipantRole::Facilitator, &hr())
            .await
            .unwrap();
        assert!(promoted.is_facilitator());
        assert_eq!(multiple.details(id).await.unwrap().facilitators().count(), 2);
    }

    #[tokio::test]
    async fn test_list_orders_by_schedule_desc() {
        let store = FakeStore::seeded();
        let uc = manager_for(&store, CalibrationPolicy::default());
        for day in [10, 40, 20] {
            let input = CreateSessionInput::new(CYCLE, cycle_start() + Duration::days(day));
            uc.create_session(input, &manager()).await.unwrap();
        }

        let sessions = uc.list(&SessionFilter::default()).await.unwrap();
        let days: Vec<i64> = sessions
            .iter()
            .map(|s| (s.scheduled_for - cycle_start()).num_days())
            .collect();
        assert_eq!(days, vec![40, 20, 10]);

        let filter = SessionFilter {
            status: Some(SessionStatus::Active),
            ..Default::default()
        };
        assert!(uc.list(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = FakeStore::seeded();
        let uc = manager_for(&store, CalibrationPolicy::default());
        let err = uc.join(SessionId::new(404), &peer()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
