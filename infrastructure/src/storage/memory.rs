//! In-memory calibration store
//!
//! One [`MemoryStore`] implements every storage port of the application
//! layer. All state sits behind a single `tokio::sync::RwLock`, so each
//! compound write (resolution + history, move + history) is atomic with
//! respect to every other operation. When a [`HistoryJournal`] is attached,
//! the history entry is made durable before the in-memory state changes; a
//! failed journal write leaves the store untouched.
//!
//! The journal append is a blocking file write made while the write guard is
//! held. It is one unsynced `write_all` of a single line, and holding the
//! guard keeps journal order identical to history id order. A journal on slow
//! or networked storage stalls every other store operation for the length of
//! that write.
//!
//! Session-scoped writes (resolutions, votes, messages, in-session moves)
//! re-check the session status under the same write guard, so nothing lands
//! in a session that was concluded after the caller last read it.

use super::journal::HistoryJournal;
use async_trait::async_trait;
use calibration_application::{
    ChatLog, EvaluationRepository, HistoryStore, PositionRepository, SessionRepository,
    StoreError, VoteLedger,
};
use calibration_domain::{
    CalibrationSession, ChatMessage, Consensus, CycleId, EmployeeId, Evaluation,
    EvaluationId, EvaluationStatus, FacilitatorPolicy, HistoryChange, HistoryDraft,
    HistoryEntry, HistoryEntryId, MessageDraft, MessageId, NewSession, Participant,
    PositionMove, PositionRecord, Resolution, SessionFilter, SessionId, UserId, Vote,
    VoteDraft, VoteId,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Default)]
struct Counters {
    session: u64,
    vote: u64,
    message: u64,
    history: u64,
}

#[derive(Default)]
struct State {
    counters: Counters,
    sessions: BTreeMap<SessionId, CalibrationSession>,
    participants: HashMap<SessionId, Vec<Participant>>,
    evaluations: BTreeMap<EvaluationId, Evaluation>,
    positions: BTreeMap<EmployeeId, PositionRecord>,
    votes: Vec<Vote>,
    messages: Vec<ChatMessage>,
    history: Vec<HistoryEntry>,
    last_history_at: Option<DateTime<Utc>>,
}

impl State {
    /// Timestamp for the next history entry; never earlier than the last one
    fn history_clock(&self) -> DateTime<Utc> {
        let now = Utc::now();
        self.last_history_at.map_or(now, |last| last.max(now))
    }

    /// Fail unless `id` names a session that is active right now
    fn ensure_session_active(&self, id: SessionId) -> Result<(), StoreError> {
        self.sessions
            .get(&id)
            .ok_or_else(|| StoreError::not_found("session", id))?
            .ensure_active()
            .map_err(StoreError::Rejected)
    }

    /// Apply a replayed entry to the derived views (positions, consensus).
    fn absorb(&mut self, entry: &HistoryEntry) {
        match &entry.change {
            HistoryChange::Position {
                new_performance,
                new_potential,
                old_quadrant,
                ..
            } => {
                self.positions.insert(
                    entry.employee_id,
                    PositionRecord {
                        employee_id: entry.employee_id,
                        performance: *new_performance,
                        potential: *new_potential,
                        justification: Some(entry.justification.clone()),
                        previous_quadrant: *old_quadrant,
                        updated_by: Some(entry.changed_by),
                        updated_at: Some(entry.changed_at),
                    },
                );
            }
            HistoryChange::Consensus { .. } => {}
        }
        if let Some(session_id) = entry.session_id {
            self.counters.session = self.counters.session.max(session_id.get());
        }
        self.counters.history = self.counters.history.max(entry.id.get());
        self.last_history_at = Some(
            self.last_history_at
                .map_or(entry.changed_at, |last| last.max(entry.changed_at)),
        );
        self.history.push(entry.clone());
    }

    /// The consensus recorded in history for `evaluation_id`, if any
    fn replayed_consensus(&self, evaluation_id: EvaluationId) -> Option<Consensus> {
        self.history.iter().find_map(|entry| match &entry.change {
            HistoryChange::Consensus {
                evaluation_id: id,
                new_score,
                ..
            } if *id == evaluation_id => Some(Consensus {
                score: *new_score,
                justification: entry.justification.clone(),
                resolved_by: entry.changed_by,
                resolved_at: entry.changed_at,
                session_id: entry.session_id?,
            }),
            _ => None,
        })
    }
}

/// Store backing every repository port in one process
pub struct MemoryStore {
    state: RwLock<State>,
    journal: Option<HistoryJournal>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// A volatile store; history is lost on exit
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            journal: None,
        }
    }

    /// A store whose history is persisted to `journal`.
    ///
    /// `replayed` (the journal's existing entries) rebuilds current positions
    /// immediately; resolved consensus is restored as evaluations are
    /// imported. New session and history ids continue after the highest
    /// ones found in the journal.
    pub fn with_journal(journal: HistoryJournal, replayed: Vec<HistoryEntry>) -> Self {
        let mut state = State::default();
        for entry in &replayed {
            state.absorb(entry);
        }
        info!(
            entries = state.history.len(),
            positions = state.positions.len(),
            "Restored history from journal"
        );
        Self {
            state: RwLock::new(state),
            journal: Some(journal),
        }
    }

    /// Blocking; callers hold the state write guard.
    fn persist(&self, entry: &HistoryEntry) -> Result<(), StoreError> {
        if let Some(journal) = &self.journal {
            journal.append(entry).map_err(|e| {
                warn!(history_id = %entry.id, error = %e, "Failed to journal history entry");
                StoreError::Backend(e.to_string())
            })?;
        }
        Ok(())
    }

    /// Allocate, journal and record one history entry
    fn record(&self, state: &mut State, draft: HistoryDraft) -> Result<HistoryEntry, StoreError> {
        let entry = draft.into_entry(
            HistoryEntryId::new(state.counters.history + 1),
            state.history_clock(),
        );
        self.persist(&entry)?;
        state.counters.history += 1;
        state.last_history_at = Some(entry.changed_at);
        state.history.push(entry.clone());
        Ok(entry)
    }
}

fn facilitator_conflict(
    existing: &[Participant],
    incoming: &Participant,
    policy: FacilitatorPolicy,
) -> bool {
    if !incoming.is_facilitator() {
        return false;
    }
    let others = existing
        .iter()
        .filter(|p| p.user_id != incoming.user_id && p.is_facilitator())
        .count();
    !policy.allows_another(others)
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn create_session(
        &self,
        draft: NewSession,
        participants: Vec<Participant>,
    ) -> Result<(CalibrationSession, Vec<Participant>), StoreError> {
        let mut state = self.state.write().await;
        state.counters.session += 1;
        let session = draft.into_session(SessionId::new(state.counters.session));

        let mut members: Vec<Participant> = Vec::with_capacity(participants.len());
        for mut participant in participants {
            participant.session_id = session.id;
            if members.iter().any(|p| p.user_id == participant.user_id) {
                continue;
            }
            members.push(participant);
        }

        state.sessions.insert(session.id, session.clone());
        state.participants.insert(session.id, members.clone());
        debug!(session_id = %session.id, "Session stored");
        Ok((session, members))
    }

    async fn session(&self, id: SessionId) -> Result<Option<CalibrationSession>, StoreError> {
        Ok(self.state.read().await.sessions.get(&id).cloned())
    }

    async fn sessions(
        &self,
        filter: &SessionFilter,
    ) -> Result<Vec<CalibrationSession>, StoreError> {
        let state = self.state.read().await;
        let mut sessions: Vec<CalibrationSession> = state
            .sessions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| {
            b.scheduled_for
                .cmp(&a.scheduled_for)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(sessions)
    }

    async fn save_session(
        &self,
        session: &CalibrationSession,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
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
        let state = self.state.read().await;
        Ok(state
            .participants
            .get(&session_id)
            .and_then(|members| members.iter().find(|p| p.user_id == user_id))
            .cloned())
    }

    async fn participants(&self, session_id: SessionId) -> Result<Vec<Participant>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .participants
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn upsert_participant(
        &self,
        participant: Participant,
        policy: FacilitatorPolicy,
    ) -> Result<Participant, StoreError> {
        let mut state = self.state.write().await;
        if !state.sessions.contains_key(&participant.session_id) {
            return Err(StoreError::not_found("session", participant.session_id));
        }
        let members = state.participants.entry(participant.session_id).or_default();
        if facilitator_conflict(members, &participant, policy) {
            return Err(StoreError::Rejected(calibration_domain::DomainError::validation(
                format!("{} already has a facilitator", participant.session_id),
            )));
        }
        match members.iter_mut().find(|p| p.user_id == participant.user_id) {
            Some(existing) => *existing = participant.clone(),
            None => members.push(participant.clone()),
        }
        Ok(participant)
    }
}

#[async_trait]
impl EvaluationRepository for MemoryStore {
    async fn evaluation(&self, id: EvaluationId) -> Result<Option<Evaluation>, StoreError> {
        Ok(self.state.read().await.evaluations.get(&id).cloned())
    }

    async fn evaluations_for_cycle(
        &self,
        cycle_id: CycleId,
    ) -> Result<Vec<Evaluation>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .evaluations
            .values()
            .filter(|e| e.cycle_id == cycle_id)
            .cloned()
            .collect())
    }

    async fn import_evaluation(&self, mut evaluation: Evaluation) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if evaluation.status == EvaluationStatus::Open
            && let Some(consensus) = state.replayed_consensus(evaluation.id)
        {
            debug!(evaluation_id = %evaluation.id, "Restoring journaled consensus");
            evaluation
                .resolve(consensus)
                .map_err(StoreError::Rejected)?;
        }
        state.evaluations.insert(evaluation.id, evaluation);
        Ok(())
    }

    async fn resolve(
        &self,
        resolution: Resolution,
    ) -> Result<(Evaluation, HistoryEntry), StoreError> {
        let mut state = self.state.write().await;
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

        let draft = resolution
            .apply(&mut evaluation)
            .map_err(StoreError::Rejected)?;
        let entry = self.record(&mut state, draft)?;
        state.evaluations.insert(id, evaluation.clone());
        Ok((evaluation, entry))
    }
}

#[async_trait]
impl PositionRepository for MemoryStore {
    async fn position(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Option<PositionRecord>, StoreError> {
        Ok(self.state.read().await.positions.get(&employee_id).cloned())
    }

    async fn positions(&self) -> Result<Vec<PositionRecord>, StoreError> {
        Ok(self.state.read().await.positions.values().cloned().collect())
    }

    /// Journaled positions take precedence over imported ones
    async fn import_position(&self, record: PositionRecord) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.positions.entry(record.employee_id).or_insert(record);
        Ok(())
    }

    async fn apply_move(
        &self,
        movement: PositionMove,
    ) -> Result<(PositionRecord, HistoryEntry), StoreError> {
        let mut state = self.state.write().await;
        if let Some(session_id) = movement.session_id {
            state.ensure_session_active(session_id)?;
        }
        let employee_id = movement.employee_id;
        let at = state.history_clock();
        let (next, draft) = movement.apply(state.positions.get(&employee_id), at);
        let entry = self.record(&mut state, draft)?;
        state.positions.insert(employee_id, next.clone());
        Ok((next, entry))
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn history_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<HistoryEntry>, StoreError> {
        let state = self.state.read().await;
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
        let state = self.state.read().await;
        Ok(state
            .history
            .iter()
            .filter(|e| e.session_id == Some(session_id))
            .cloned()
            .collect())
    }

    async fn all_history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self.state.read().await.history.clone())
    }
}

#[async_trait]
impl VoteLedger for MemoryStore {
    async fn append_vote(&self, draft: VoteDraft) -> Result<Vote, StoreError> {
        let mut state = self.state.write().await;
        state.ensure_session_active(draft.session_id)?;
        state.counters.vote += 1;
        let vote = draft.into_vote(VoteId::new(state.counters.vote), Utc::now());
        state.votes.push(vote.clone());
        Ok(vote)
    }

    async fn votes(
        &self,
        session_id: SessionId,
        evaluation_id: EvaluationId,
    ) -> Result<Vec<Vote>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .votes
            .iter()
            .filter(|v| v.session_id == session_id && v.evaluation_id == evaluation_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ChatLog for MemoryStore {
    async fn append_message(&self, draft: MessageDraft) -> Result<ChatMessage, StoreError> {
        let mut state = self.state.write().await;
        state.ensure_session_active(draft.session_id)?;
        state.counters.message += 1;
        let created_at = state
            .messages
            .last()
            .map_or_else(Utc::now, |last| last.created_at.max(Utc::now()));
        let message = draft.into_message(MessageId::new(state.counters.message), created_at);
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn messages(&self, session_id: SessionId) -> Result<Vec<ChatMessage>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect())
    }
}
