//! Application-level configuration.
//!
//! - [`CalibrationPolicy`]: rule knobs for sessions, votes and placements

pub mod policy;

pub use policy::CalibrationPolicy;
