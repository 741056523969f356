//! Infrastructure layer for calibration-room
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod realtime;
pub mod roster;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileCalibrationConfig, FileConfig, FileLoggingConfig,
    FileOutputConfig, FileRealtimeConfig, FileStorageConfig,
};
pub use realtime::{ChannelBroadcaster, DEFAULT_CHANNEL_CAPACITY};
pub use roster::{Roster, RosterError, RosterPosition, RosterUser};
pub use storage::{HistoryJournal, JournalError, MemoryStore};
