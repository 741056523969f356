//! Roster files
//!
//! A roster is a JSON document standing in for the external collaborators:
//! the employee directory, the evaluation cycle registry, the user accounts
//! allowed to act, and the scores and initial grid positions produced by the
//! scoring pipeline.
//!
//! ```json
//! {
//!   "users":       [{ "id": 1, "name": "Dana", "role": "hr" }],
//!   "employees":   [{ "id": 100, "name": "Ana", "department_id": 10, "manager_id": 2 }],
//!   "cycles":      [{ "id": 1, "name": "2026", "starts_at": "2026-01-01T00:00:00Z",
//!                     "ends_at": "2026-12-31T23:59:59Z" }],
//!   "evaluations": [{ "id": 500, "cycle_id": 1, "employee_id": 100,
//!                     "self_score": 4.5, "manager_score": 2.0, "peer_scores": [3.0] }],
//!   "positions":   [{ "employee_id": 100, "performance": 3, "potential": 4 }]
//! }
//! ```

use async_trait::async_trait;
use calibration_application::{
    CycleRegistry, EmployeeDirectory, EmployeeProfile, EvaluationCycle, EvaluationRepository,
    PositionRepository, StoreError,
};
use calibration_domain::{
    Actor, ActorRole, CycleId, EmployeeId, Evaluation, PositionRecord, Rating, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Could not read roster {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid roster JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Roster references unknown {entity} {id}")]
    DanglingReference { entity: &'static str, id: String },

    #[error("Duplicate {entity} id {id} in roster")]
    Duplicate { entity: &'static str, id: String },

    #[error("Cycle {0} ends before it starts")]
    InvalidCycle(CycleId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A user who may act in the calibration room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterUser {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub role: ActorRole,
}

impl RosterUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

/// Initial grid placement from the scoring pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterPosition {
    pub employee_id: EmployeeId,
    pub performance: Rating,
    pub potential: Rating,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Roster {
    pub users: Vec<RosterUser>,
    pub employees: Vec<EmployeeProfile>,
    pub cycles: Vec<EvaluationCycle>,
    pub evaluations: Vec<Evaluation>,
    pub positions: Vec<RosterPosition>,
}

impl Roster {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| RosterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let roster = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            employees = roster.employees.len(),
            evaluations = roster.evaluations.len(),
            "Roster loaded"
        );
        Ok(roster)
    }

    /// Parse and check referential integrity
    pub fn from_json(raw: &str) -> Result<Self, RosterError> {
        let roster: Roster = serde_json::from_str(raw)?;
        roster.validate()?;
        Ok(roster)
    }

    fn validate(&self) -> Result<(), RosterError> {
        unique("user", self.users.iter().map(|u| u.id))?;
        unique("employee", self.employees.iter().map(|e| e.id))?;
        unique("cycle", self.cycles.iter().map(|c| c.id))?;
        unique("evaluation", self.evaluations.iter().map(|e| e.id))?;

        for cycle in &self.cycles {
            if cycle.ends_at < cycle.starts_at {
                return Err(RosterError::InvalidCycle(cycle.id));
            }
        }

        let employees: HashSet<EmployeeId> = self.employees.iter().map(|e| e.id).collect();
        let cycles: HashSet<CycleId> = self.cycles.iter().map(|c| c.id).collect();
        for evaluation in &self.evaluations {
            if !employees.contains(&evaluation.employee_id) {
                return Err(dangling("employee", evaluation.employee_id));
            }
            if !cycles.contains(&evaluation.cycle_id) {
                return Err(dangling("cycle", evaluation.cycle_id));
            }
        }
        for position in &self.positions {
            if !employees.contains(&position.employee_id) {
                return Err(dangling("employee", position.employee_id));
            }
        }
        Ok(())
    }

    pub fn user(&self, id: UserId) -> Option<&RosterUser> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Find a user by id (`3`, `user#3`) or case-insensitive name
    pub fn find_user(&self, needle: &str) -> Option<&RosterUser> {
        if let Ok(id) = needle.parse::<UserId>() {
            return self.user(id);
        }
        self.users
            .iter()
            .find(|u| u.name.eq_ignore_ascii_case(needle))
    }

    pub fn user_name(&self, id: UserId) -> String {
        self.user(id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn employee_name(&self, id: EmployeeId) -> String {
        self.employees
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Load evaluations and initial positions into the store
    pub async fn seed<S>(&self, store: &S) -> Result<(), RosterError>
    where
        S: EvaluationRepository + PositionRepository + ?Sized,
    {
        for evaluation in &self.evaluations {
            store.import_evaluation(evaluation.clone()).await?;
        }
        for position in &self.positions {
            store
                .import_position(PositionRecord::imported(
                    position.employee_id,
                    position.performance,
                    position.potential,
                ))
                .await?;
        }
        info!(
            evaluations = self.evaluations.len(),
            positions = self.positions.len(),
            "Roster seeded into store"
        );
        Ok(())
    }
}

fn unique<T>(entity: &'static str, ids: impl Iterator<Item = T>) -> Result<(), RosterError>
where
    T: std::hash::Hash + Eq + std::fmt::Display,
{
    let mut seen = HashSet::new();
    for id in ids {
        let label = id.to_string();
        if !seen.insert(id) {
            return Err(RosterError::Duplicate { entity, id: label });
        }
    }
    Ok(())
}

fn dangling(entity: &'static str, id: impl std::fmt::Display) -> RosterError {
    RosterError::DanglingReference {
        entity,
        id: id.to_string(),
    }
}

#[async_trait]
impl EmployeeDirectory for Roster {
    async fn employee(&self, id: EmployeeId) -> Result<Option<EmployeeProfile>, StoreError> {
        Ok(self.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn employees(&self) -> Result<Vec<EmployeeProfile>, StoreError> {
        Ok(self.employees.clone())
    }
}

#[async_trait]
impl CycleRegistry for Roster {
    async fn cycle(&self, id: CycleId) -> Result<Option<EvaluationCycle>, StoreError> {
        Ok(self.cycles.iter().find(|c| c.id == id).cloned())
    }
}
