//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

use calibration_application::CalibrationPolicy;
use calibration_domain::{DEFAULT_DISCREPANCY_THRESHOLD, FacilitatorPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("discrepancy_threshold must be a positive number, got {0}")]
    InvalidThreshold(f64),

    #[error("min_justification_len cannot be 0")]
    ZeroJustificationLength,

    #[error("channel_capacity cannot be 0")]
    ZeroChannelCapacity,
}

/// `[calibration]`: rule knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCalibrationConfig {
    /// Largest tolerated gap between score sources
    pub discrepancy_threshold: f64,
    /// `single` or `multiple` facilitators per session
    pub facilitator_policy: FacilitatorPolicy,
    /// Minimum characters in a justification
    pub min_justification_len: usize,
    /// Restrict repositioning to admins, HR and direct managers
    pub placement_authority: bool,
}

impl Default for FileCalibrationConfig {
    fn default() -> Self {
        Self {
            discrepancy_threshold: DEFAULT_DISCREPANCY_THRESHOLD,
            facilitator_policy: FacilitatorPolicy::Single,
            min_justification_len: 1,
            placement_authority: false,
        }
    }
}

impl FileCalibrationConfig {
    pub fn to_policy(&self) -> CalibrationPolicy {
        CalibrationPolicy::default()
            .with_discrepancy_threshold(self.discrepancy_threshold)
            .with_facilitator_policy(self.facilitator_policy)
            .with_min_justification_len(self.min_justification_len)
            .with_placement_authority(self.placement_authority)
    }
}

/// `[realtime]`: event fan-out
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRealtimeConfig {
    /// Events buffered per channel before slow subscribers start skipping
    pub channel_capacity: usize,
}

impl Default for FileRealtimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

/// `[storage]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// JSONL journal backing the history store. In-memory only when unset.
    pub history_journal: Option<PathBuf>,
}

/// `[logging]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for daily rolling log files. Logs go to stderr when unset.
    pub directory: Option<PathBuf>,
}

/// `[output]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Complete configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub calibration: FileCalibrationConfig,
    pub realtime: FileRealtimeConfig,
    pub storage: FileStorageConfig,
    pub logging: FileLoggingConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let threshold = self.calibration.discrepancy_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ConfigValidationError::InvalidThreshold(threshold));
        }

        if self.calibration.min_justification_len == 0 {
            return Err(ConfigValidationError::ZeroJustificationLength);
        }

        if self.realtime.channel_capacity == 0 {
            return Err(ConfigValidationError::ZeroChannelCapacity);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[calibration]
discrepancy_threshold = 1.5
facilitator_policy = "multiple"
min_justification_len = 10
placement_authority = true

[realtime]
channel_capacity = 64

[storage]
history_journal = "data/history.jsonl"

[logging]
directory = "logs"

[output]
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.calibration.discrepancy_threshold, 1.5);
        assert_eq!(
            config.calibration.facilitator_policy,
            FacilitatorPolicy::Multiple
        );
        assert_eq!(config.calibration.min_justification_len, 10);
        assert!(config.calibration.placement_authority);
        assert_eq!(config.realtime.channel_capacity, 64);
        assert_eq!(
            config.storage.history_journal,
            Some(PathBuf::from("data/history.jsonl"))
        );
        assert_eq!(config.logging.directory, Some(PathBuf::from("logs")));
        assert!(!config.output.color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[calibration]
discrepancy_threshold = 0.75
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.calibration.discrepancy_threshold, 0.75);
        // Defaults should apply
        assert_eq!(config.calibration.facilitator_policy, FacilitatorPolicy::Single);
        assert_eq!(config.calibration.min_justification_len, 1);
        assert_eq!(config.realtime.channel_capacity, 256);
        assert!(config.storage.history_journal.is_none());
        assert!(config.output.color);
    }

    #[test]
    fn test_to_policy() {
        let toml_str = r#"
[calibration]
facilitator_policy = "multiple"
placement_authority = true
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let policy = config.calibration.to_policy();
        assert_eq!(policy.facilitator_policy, FacilitatorPolicy::Multiple);
        assert!(policy.placement_authority);
        assert_eq!(policy.discrepancy_threshold, 1.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config: FileConfig = toml::from_str("[calibration]\ndiscrepancy_threshold = 0.0").unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidThreshold(0.0))
        );

        let config: FileConfig = toml::from_str("[calibration]\nmin_justification_len = 0").unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroJustificationLength)
        );

        let config: FileConfig = toml::from_str("[realtime]\nchannel_capacity = 0").unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroChannelCapacity)
        );
    }

    #[test]
    fn test_unknown_facilitator_policy_rejected() {
        let result: Result<FileConfig, _> =
            toml::from_str("[calibration]\nfacilitator_policy = \"rotating\"");
        assert!(result.is_err());
    }
}
