//! Domain layer for calibration-room
//!
//! This crate contains the core business logic, entities, and value objects
//! of the calibration consensus engine. It has no dependencies on
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Calibration Session
//!
//! A scheduled meeting where participants vote on proposed scores and a
//! facilitator resolves one consensus score per evaluation, exactly once.
//!
//! ## Direct Placement
//!
//! Moving an employee on the nine-box grid outside a session. Every move is
//! justified and recorded in the same history as session-driven changes.
//!
//! ## Discrepancy
//!
//! A flagged divergence between self, manager and peer scores, recomputed on
//! every read.

pub mod calibration;
pub mod core;
pub mod event;
pub mod placement;

// Re-export commonly used types
pub use calibration::{
    CalibrationSession, ChatMessage, Consensus, DEFAULT_DISCREPANCY_THRESHOLD, DiscrepancyReport,
    Evaluation, EvaluationStatus, FacilitatorPolicy, MessageDraft, NewSession, Participant,
    ParticipantRole, Resolution, SessionFilter, SessionStatus, Vote, VoteDraft, VoteTally, VoteType, analyze,
};
pub use core::{
    actor::{Actor, ActorRole},
    error::{DomainError, ErrorKind},
    ids::{
        CycleId, DepartmentId, EmployeeId, EvaluationId, HistoryEntryId, MessageId, SessionId,
        UserId, VoteId,
    },
    justification::Justification,
    score::{Rating, Score},
};
pub use event::{CalibrationEvent, EventChannel, EventKind};
pub use placement::{
    Band, GridDistribution, HistoryChange, HistoryDraft, HistoryEntry, PlacementStats,
    PositionMove, PositionRecord, Quadrant, quadrant_for,
};
