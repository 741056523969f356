//! Nine-box placement domain
//!
//! Direct placement lets an evaluator move an employee on the performance ×
//! potential grid outside a session. Each move is justified and lands in the
//! same audit trail as session-driven changes.

pub mod history;
pub mod movement;
pub mod position;
pub mod quadrant;

pub use history::{HistoryChange, HistoryDraft, HistoryEntry, PlacementStats};
pub use movement::PositionMove;
pub use position::{GridDistribution, PositionRecord};
pub use quadrant::{Band, Quadrant, quadrant_for};
