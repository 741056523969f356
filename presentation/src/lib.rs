//! Presentation layer for calibration-room
//!
//! This crate contains CLI definitions, console formatting and the
//! interactive calibration room.

pub mod cli;
pub mod config;
pub mod output;
pub mod room;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, OutputFormat};
pub use config::{OutputConfig, RoomConfig};
pub use output::console::ConsoleFormatter;
pub use room::{CalibrationRoom, RoomCommand, RoomServices};
