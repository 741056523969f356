//! Presentation-level configuration
//!
//! Configuration for output formatting and the calibration room REPL.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// REPL configuration for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Print session events as they arrive
    pub show_events: bool,
    /// Path to line-editor history file
    pub history_file: Option<PathBuf>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            show_events: true,
            history_file: None,
        }
    }
}

impl RoomConfig {
    /// Configured history file, or `<data dir>/calibration-room/history.txt`
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file.clone().or_else(|| {
            dirs::data_dir().map(|p| p.join("calibration-room").join("history.txt"))
        })
    }
}
