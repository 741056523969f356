//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod chat;
pub mod error;
pub mod reposition;
pub mod resolve_consensus;
pub mod review;
pub mod session_manager;
pub(crate) mod shared;
#[cfg(test)]
pub(crate) mod testing;
pub mod voting;
