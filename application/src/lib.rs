//! Application layer for calibration-room
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::CalibrationPolicy;
pub use ports::{
    chat_log::ChatLog,
    directory::{CycleRegistry, EmployeeDirectory, EmployeeProfile, EvaluationCycle},
    evaluation_repository::EvaluationRepository,
    event_broadcaster::{BroadcastError, EventBroadcaster, EventSubscription, NoBroadcast},
    history_store::HistoryStore,
    position_repository::PositionRepository,
    session_repository::SessionRepository,
    store_error::StoreError,
    vote_ledger::VoteLedger,
};
pub use use_cases::chat::ChatUseCase;
pub use use_cases::error::CalibrationError;
pub use use_cases::reposition::{PositionEngine, RepositionInput};
pub use use_cases::resolve_consensus::{ConsensusResolver, ResolveInput};
pub use use_cases::review::{EvaluationReview, ReviewUseCase};
pub use use_cases::session_manager::{CreateSessionInput, SessionDetails, SessionManager};
pub use use_cases::voting::{SubmitVoteInput, VotingUseCase};
