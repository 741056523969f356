//! Read-only collaborators: employee directory and evaluation cycle registry

use super::store_error::StoreError;
use async_trait::async_trait;
use calibration_domain::{CycleId, DepartmentId, EmployeeId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    /// Login of the direct manager, when known
    #[serde(default)]
    pub manager_id: Option<UserId>,
}

impl EmployeeProfile {
    pub fn is_managed_by(&self, user: UserId) -> bool {
        self.manager_id == Some(user)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationCycle {
    pub id: CycleId,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl EvaluationCycle {
    /// Whether `at` falls inside the cycle's validity window (inclusive)
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        self.starts_at <= at && at <= self.ends_at
    }
}

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn employee(&self, id: EmployeeId) -> Result<Option<EmployeeProfile>, StoreError>;

    async fn employees(&self) -> Result<Vec<EmployeeProfile>, StoreError>;
}

#[async_trait]
pub trait CycleRegistry: Send + Sync {
    async fn cycle(&self, id: CycleId) -> Result<Option<EvaluationCycle>, StoreError>;
}
