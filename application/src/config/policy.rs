//! Calibration policy: rule knobs applied by the use cases.
//!
//! [`CalibrationPolicy`] gathers the tunable rules of the engine. The
//! infrastructure config loader builds it from `[calibration]`.

use calibration_domain::{DEFAULT_DISCREPANCY_THRESHOLD, FacilitatorPolicy};
use serde::{Deserialize, Serialize};

/// Tunable rules for sessions, votes, resolutions and placements.
///
/// | Field | Used by |
/// |-------|---------|
/// | `discrepancy_threshold` | review queries |
/// | `facilitator_policy` | session manager |
/// | `min_justification_len` | votes, resolutions, placements |
/// | `placement_authority` | position engine |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPolicy {
    /// A discrepancy is flagged when the largest gap strictly exceeds this.
    pub discrepancy_threshold: f64,
    pub facilitator_policy: FacilitatorPolicy,
    /// Minimum number of characters in a justification, after trimming.
    pub min_justification_len: usize,
    /// When set, only admins, HR or the employee's direct manager may
    /// reposition an employee.
    pub placement_authority: bool,
}

impl Default for CalibrationPolicy {
    fn default() -> Self {
        Self {
            discrepancy_threshold: DEFAULT_DISCREPANCY_THRESHOLD,
            facilitator_policy: FacilitatorPolicy::Single,
            min_justification_len: 1,
            placement_authority: false,
        }
    }
}

impl CalibrationPolicy {
    pub fn with_discrepancy_threshold(mut self, threshold: f64) -> Self {
        self.discrepancy_threshold = threshold;
        self
    }

    pub fn with_facilitator_policy(mut self, policy: FacilitatorPolicy) -> Self {
        self.facilitator_policy = policy;
        self
    }

    pub fn with_min_justification_len(mut self, len: usize) -> Self {
        self.min_justification_len = len.max(1);
        self
    }

    pub fn with_placement_authority(mut self, enabled: bool) -> Self {
        self.placement_authority = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let policy = CalibrationPolicy::default();
        assert_eq!(policy.discrepancy_threshold, 1.0);
        assert_eq!(policy.facilitator_policy, FacilitatorPolicy::Single);
        assert_eq!(policy.min_justification_len, 1);
        assert!(!policy.placement_authority);
    }

    #[test]
    fn test_builder() {
        let policy = CalibrationPolicy::default()
            .with_discrepancy_threshold(0.5)
            .with_facilitator_policy(FacilitatorPolicy::Multiple)
            .with_min_justification_len(0)
            .with_placement_authority(true);

        assert_eq!(policy.discrepancy_threshold, 0.5);
        assert_eq!(policy.facilitator_policy, FacilitatorPolicy::Multiple);
        assert_eq!(policy.min_justification_len, 1);
        assert!(policy.placement_authority);
    }
}
