//! Configuration file loading for calibration-room
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CALIBRATION_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./calibration.toml` or `./.calibration.toml`
//! 4. Global: `~/.config/calibration-room/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileCalibrationConfig, FileConfig, FileLoggingConfig,
    FileOutputConfig, FileRealtimeConfig, FileStorageConfig,
};
pub use loader::ConfigLoader;
