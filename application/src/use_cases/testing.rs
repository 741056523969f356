//! In-memory fakes shared by the use case tests

use crate::ports::chat_log::ChatLog;
use crate::ports::directory::{CycleRegistry, EmployeeDirectory, EmployeeProfile, EvaluationCycle};
use crate::ports::evaluation_repository::EvaluationRepository;
use crate::ports::event_broadcaster::{BroadcastError, EventBroadcaster, EventSubscription};
use crate::ports::history_store::HistoryStore;
use crate::ports::position_repository::PositionRepository;
use crate::ports::session_repository::SessionRepository;
use crate::ports::store_error::StoreError;
use crate::ports::vote_ledger::VoteLedger;
use async_trait::async_trait;
use calibration_domain::{
    Actor, ActorRole, CalibrationEvent, CalibrationSession, ChatMessage, CycleId, DepartmentId,
    DomainError, EmployeeId, EvaluationId, Evaluation, EventChannel, FacilitatorPolicy,
    HistoryDraft, HistoryEntry, HistoryEntryId, MessageDraft, MessageId, NewSession, Participant,
    PositionMove, PositionRecord, Resolution, SessionFilter, SessionId, UserId, Vote, VoteDraft,
    VoteId,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

pub(crate) const CYCLE: CycleId = CycleId::new(1);
pub(crate) const SALES: DepartmentId = DepartmentId::new(10);
pub(crate) const ENGINEERING: DepartmentId = DepartmentId::new(20);

pub(crate) fn hr() -> Actor {
    Actor::new(UserId::new(1), ActorRole::Hr)
}

pub(crate) fn manager() -> Actor {
    Actor::new(UserId::new(2), ActorRole::Manager)
}

pub(crate) fn peer() -> Actor {
    Actor::new(UserId::new(3), ActorRole::Employee)
}

pub(crate) fn cycle_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

#[derive(Default)]
struct State {
    next_id: u64,
    last_history_at: Option<DateTime<Utc>>,
    sessions: HashMap<SessionId, CalibrationSession>,
    participants: Vec<Participant>,
    evaluations: HashMap<EvaluationId, Evaluation>,
    positions: HashMap<EmployeeId, PositionRecord>,
    history: Vec<HistoryEntry>,
    votes: Vec<Vote>,
    messages: Vec<ChatMessage>,
    employees: Vec<EmployeeProfile>,
    cycles: Vec<EvaluationCycle>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn ensure_session_active(&self, id: SessionId) -> Result<(), StoreError> {
        self.sessions
            .get(&id)
            .ok_or_else(|| StoreError::not_found("session", id))?
            .ensure_active()
            .map_err(StoreError::Rejected)
    }

    fn append_history(&mut self, draft: HistoryDraft) -> HistoryEntry {
        let now = Utc::now();
        let at = self.last_history_at.map_or(now, |last| last.max(now));
        self.last_history_at = Some(at);
        let id = HistoryEntryId::new(self.next_id());
        let entry = draft.into_entry(id, at);
        self.history.push(entry.clone());
        entry
    }
}

/// Single fake implementing every storage port
#[derive(Default)]
pub(crate) struct FakeStore {
    state: Mutex<State>,
}

impl FakeStore {
    /// Cycle 1 (all of 2026), two employees in sales managed by `manager()`,
    /// one in engineering, one open evaluation per employee.
    pub(crate) fn seeded() -> Arc<Self> {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            state.cycles.push(EvaluationCycle {
                id: CYCLE,
                name: "2026".to_string(),
                starts_at: cycle_start(),
                ends_at: cycle_start() + Duration::days(364),
            });
            for (id, department) in [(100, SALES), (101, SALES), (200, ENGINEERING)] {
                state.employees.push(EmployeeProfile {
                    id: EmployeeId::new(id),
                    name: format!("Employee {id}"),
                    department_id: Some(department),
                    manager_id: (department == SALES).then_some(manager().id),
                });
                state.evaluations.insert(
                    EvaluationId::new(id),
                    Evaluation::open(
                        EvaluationId::new(id),
                        CYCLE,
                        EmployeeId::new(id),
                        Some(4.5),
                        Some(2.0),
                        vec![3.0],
                    ),
                );
            }
            state.next_id = 1000;
        }
        Arc::new(store)
    }

    pub(crate) fn insert_evaluation(&self, evaluation: Evaluation) {
        let mut state = self.state.lock().unwrap();
        state.evaluations.insert(evaluation.id, evaluation);
    }

    pub(crate) fn history_len(&self) -> usize {
        self.state.lock().unwrap().history.len()
    }

    pub(crate) fn vote_count(&self) -> usize {
        self.state.lock().unwrap().votes.len()
    }
}

#[async_trait]
impl SessionRepository for FakeStore {
    async fn create_session(
        &self,
        draft: NewSession,
        participants: Vec<Participant>,
    ) -> Result<(CalibrationSession, Vec<Participant>), StoreError> {
        let mut state = self.state.lock().unwrap();
        let session = draft.into_session(SessionId::new(state.next_id()));
        let participants: Vec<Participant> = participants
            .into_iter()
            .map(|mut p| {
                p.session_id = session.id;
                p
            })
            .collect();
        state.sessions.insert(session.id, session.clone());
        state.participants.extend(participants.iter().cloned());
        Ok((session, participants))
    }

    async fn session(&self, id: SessionId) -> Result<Option<CalibrationSession>, StoreError> {
        Ok(self.state.lock().unwrap().sessions.get(&id).cloned())
    }

    async fn sessions(
        &self,
        filter: &SessionFilter,
    ) -> Result<Vec<CalibrationSession>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut sessions: Vec<_> = state
            .sessions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.scheduled_for.cmp(&a.scheduled_for));
        Ok(sessions)
    }

    async fn save_session(
        &self,
        session: &CalibrationSession,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .sessions
            .get_mut(&session.id)
            .ok_or_else(|| StoreError::not_found("session", session.id))?;
        if stored.version != expected_version {
            return Err(StoreError::VersionConflict {
                entity: "session",
                id: session.id.to_string(),
                expected: expected_version,
                actual: stored.version,
            });
        }
        *stored = session.clone();
        Ok(())
    }

    async fn participant(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> Result<Option<Participant>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .participants
            .iter()
            .find(|p| p.session_id == session_id && p.user_id == user_id)
            .cloned())
    }

    async fn participants(&self, session_id: SessionId) -> Result<Vec<Participant>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .participants
            .iter()
            .filter(|p| p.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn upsert_participant(
        &self,
        participant: Participant,
        policy: FacilitatorPolicy,
    ) -> Result<Participant, StoreError> {
        let mut state = self.state.lock().unwrap();
        if participant.is_facilitator() {
            let others = state
                .participants
                .iter()
                .filter(|p| {
                    p.session_id == participant.session_id
                        && p.user_id != participant.user_id
                        && p.is_facilitator()
                })
                .count();
            if !policy.allows_another(others) {
                return Err(StoreError::Rejected(DomainError::validation(
                    "session already has a facilitator",
                )));
            }
        }
        state
            .participants
            .retain(|p| !(p.session_id == participant.session_id && p.user_id == participant.user_id));
        state.participants.push(participant.clone());
        Ok(participant)
    }
}

#[async_trait]
impl EvaluationRepository for FakeStore {
    async fn evaluation(&self, id: EvaluationId) -> Result<Option<Evaluation>, StoreError> {
        Ok(self.state.lock().unwrap().evaluations.get(&id).cloned())
    }

    async fn evaluations_for_cycle(
        &self,
        cycle_id: CycleId,
    ) -> Result<Vec<Evaluation>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut evaluations: Vec<_> = state
            .evaluations
            .values()
            .filter(|e| e.cycle_id == cycle_id)
            .cloned()
            .collect();
        evaluations.sort_by_key(|e| e.id);
        Ok(evaluations)
    }

    async fn import_evaluation(&self, evaluation: Evaluation) -> Result<(), StoreError> {
        self.insert_evaluation(evaluation);
        Ok(())
    }

    async fn resolve(
        &self,
        resolution: Resolution,
    ) -> Result<(Evaluation, HistoryEntry), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.ensure_session_active(resolution.consensus.session_id)?;
        let id = resolution.evaluation_id;
        let mut evaluation = state
            .evaluations
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("evaluation", id))?;
        if evaluation.version != resolution.expected_version {
            return Err(StoreError::VersionConflict {
                entity: "evaluation",
                id: id.to_string(),
                expected: resolution.expected_version,
                actual: evaluation.version,
            });
        }
        let draft = resolution.apply(&mut evaluation).map_err(StoreError::Rejected)?;
        state.evaluations.insert(id, evaluation.clone());
        let entry = state.append_history(draft);
        Ok((evaluation, entry))
    }
}

#[async_trait]
impl PositionRepository for FakeStore {
    async fn position(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Option<PositionRecord>, StoreError> {
        Ok(self.state.lock().unwrap().positions.get(&employee_id).cloned())
    }

    async fn positions(&self) -> Result<Vec<PositionRecord>, StoreError> {
        Ok(self.state.lock().unwrap().positions.values().cloned().collect())
    }

    async fn import_position(&self, record: PositionRecord) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.positions.insert(record.employee_id, record);
        Ok(())
    }

    async fn apply_move(
        &self,
        movement: PositionMove,
    ) -> Result<(PositionRecord, HistoryEntry), StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(session_id) = movement.session_id {
            state.ensure_session_active(session_id)?;
        }
        let employee_id = movement.employee_id;
        let current = state.positions.get(&employee_id).cloned();
        let (next, draft) = movement.apply(current.as_ref(), Utc::now());
        state.positions.insert(employee_id, next.clone());
        let entry = state.append_history(draft);
        Ok((next, entry))
    }
}

#[async_trait]
impl HistoryStore for FakeStore {
    async fn history_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<HistoryEntry>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .history
            .iter()
            .filter(|e| e.employee_id == employee_id)
            .cloned()
            .collect())
    }

    async fn history_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<HistoryEntry>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .history
            .iter()
            .filter(|e| e.session_id == Some(session_id))
            .cloned()
            .collect())
    }

    async fn all_history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self.state.lock().unwrap().history.clone())
    }
}

#[async_trait]
impl VoteLedger for FakeStore {
    async fn append_vote(&self, draft: VoteDraft) -> Result<Vote, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.ensure_session_active(draft.session_id)?;
        let vote = draft.into_vote(VoteId::new(state.next_id()), Utc::now());
        state.votes.push(vote.clone());
        Ok(vote)
    }

    async fn votes(
        &self,
        session_id: SessionId,
        evaluation_id: EvaluationId,
    ) -> Result<Vec<Vote>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .votes
            .iter()
            .filter(|v| v.session_id == session_id && v.evaluation_id == evaluation_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ChatLog for FakeStore {
    async fn append_message(&self, draft: MessageDraft) -> Result<ChatMessage, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.ensure_session_active(draft.session_id)?;
        let message = draft.into_message(MessageId::new(state.next_id()), Utc::now());
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn messages(&self, session_id: SessionId) -> Result<Vec<ChatMessage>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EmployeeDirectory for FakeStore {
    async fn employee(&self, id: EmployeeId) -> Result<Option<EmployeeProfile>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn employees(&self) -> Result<Vec<EmployeeProfile>, StoreError> {
        Ok(self.state.lock().unwrap().employees.clone())
    }
}

#[async_trait]
impl CycleRegistry for FakeStore {
    async fn cycle(&self, id: CycleId) -> Result<Option<EvaluationCycle>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.cycles.iter().find(|c| c.id == id).cloned())
    }
}

/// Broadcaster that remembers every published event
#[derive(Default)]
pub(crate) struct RecordingBroadcaster {
    events: Mutex<Vec<CalibrationEvent>>,
}

impl RecordingBroadcaster {
    pub(crate) fn events(&self) -> Vec<CalibrationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventBroadcaster for RecordingBroadcaster {
    fn publish(&self, event: CalibrationEvent) -> Result<usize, BroadcastError> {
        self.events.lock().unwrap().push(event);
        Ok(1)
    }

    fn subscribe(&self, channel: EventChannel) -> EventSubscription {
        let (_tx, rx) = broadcast::channel(1);
        EventSubscription::new(channel, rx)
    }
}

/// Broadcaster whose every publish fails
pub(crate) struct FailingBroadcaster;

impl EventBroadcaster for FailingBroadcaster {
    fn publish(&self, _event: CalibrationEvent) -> Result<usize, BroadcastError> {
        Err(BroadcastError::Closed)
    }

    fn subscribe(&self, channel: EventChannel) -> EventSubscription {
        let (_tx, rx) = broadcast::channel(1);
        EventSubscription::new(channel, rx)
    }
}
