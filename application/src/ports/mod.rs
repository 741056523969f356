//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod chat_log;
pub mod directory;
pub mod evaluation_repository;
pub mod event_broadcaster;
pub mod history_store;
pub mod position_repository;
pub mod session_repository;
pub mod store_error;
pub mod vote_ledger;
