//! Calibration session domain
//!
//! A calibration session reconciles divergent self, manager and peer scores
//! into one consensus score per evaluation.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  Calibration Session                                            │
//! ├────────────────────────────────────────────────────────────────┤
//! │  scheduled ──first join──▶ active ──facilitator──▶ concluded    │
//! │                              │                                  │
//! │          ┌───────────────────┼───────────────────┐              │
//! │          ▼                   ▼                   ▼              │
//! │     Voting ledger        Chat log        Consensus resolver     │
//! │   (append-only log)   (append-only)    (open ──▶ resolved,      │
//! │                                          exactly once)          │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`discrepancy`] analyzer flags evaluations whose sources disagree so
//! the session knows where to spend its time.

pub mod chat;
pub mod discrepancy;
pub mod evaluation;
pub mod participant;
pub mod session;
pub mod vote;

pub use chat::{ChatMessage, MessageDraft};
pub use discrepancy::{DEFAULT_DISCREPANCY_THRESHOLD, DiscrepancyReport, analyze};
pub use evaluation::{Consensus, Evaluation, EvaluationStatus, Resolution};
pub use participant::{FacilitatorPolicy, Participant, ParticipantRole};
pub use session::{CalibrationSession, NewSession, SessionFilter, SessionStatus};
pub use vote::{Vote, VoteDraft, VoteTally, VoteType};
