//! Session repository port
//!
//! Sessions and their participants. Status changes go through
//! [`SessionRepository::save_session`], which is a compare-and-set on the
//! session version so that concurrent first joins activate a session once.

use super::store_error::StoreError;
use async_trait::async_trait;
use calibration_domain::{
    CalibrationSession, FacilitatorPolicy, NewSession, Participant, SessionFilter, SessionId,
    UserId,
};

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session together with its pre-registered participants
    async fn create_session(
        &self,
        draft: NewSession,
        participants: Vec<Participant>,
    ) -> Result<(CalibrationSession, Vec<Participant>), StoreError>;

    async fn session(&self, id: SessionId) -> Result<Option<CalibrationSession>, StoreError>;

    /// Sessions matching `filter`, most recently scheduled first
    async fn sessions(&self, filter: &SessionFilter)
    -> Result<Vec<CalibrationSession>, StoreError>;

    /// Replace the stored session if its version still equals `expected_version`
    async fn save_session(
        &self,
        session: &CalibrationSession,
        expected_version: u64,
    ) -> Result<(), StoreError>;

    async fn participant(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> Result<Option<Participant>, StoreError>;

    async fn participants(&self, session_id: SessionId) -> Result<Vec<Participant>, StoreError>;

    /// Insert or update a participant row, keyed by (session, user).
    ///
    /// When the row makes the user a facilitator, `policy` is checked against
    /// the other facilitators in the same atomic step; a violation is returned
    /// as [`StoreError::Rejected`].
    async fn upsert_participant(
        &self,
        participant: Participant,
        policy: FacilitatorPolicy,
    ) -> Result<Participant, StoreError>;
}
