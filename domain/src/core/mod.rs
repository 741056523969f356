//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: strongly typed identifiers
//! - [`score::Score`] / [`score::Rating`]: validated 1–5 values
//! - [`justification::Justification`]: non-empty reason for a change
//! - [`actor::Actor`]: the authenticated caller
//! - [`error::DomainError`]: domain-level errors and the error taxonomy

pub mod actor;
pub mod error;
pub mod ids;
pub mod justification;
pub mod score;
pub mod string;
