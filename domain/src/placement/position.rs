//! Current grid placement of an employee

use super::quadrant::{Quadrant, quadrant_for};
use crate::core::ids::{EmployeeId, UserId};
use crate::core::justification::Justification;
use crate::core::score::Rating;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an employee currently sits on the nine-box grid (Entity)
///
/// Only the latest placement is kept here; every change that led to it lives
/// in the history store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub employee_id: EmployeeId,
    pub performance: Rating,
    pub potential: Rating,
    /// Reason given for the most recent move, absent for imported positions
    pub justification: Option<Justification>,
    pub previous_quadrant: Option<Quadrant>,
    pub updated_by: Option<UserId>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PositionRecord {
    /// A position delivered by the scoring pipeline rather than by a move
    pub fn imported(employee_id: EmployeeId, performance: Rating, potential: Rating) -> Self {
        Self {
            employee_id,
            performance,
            potential,
            justification: None,
            previous_quadrant: None,
            updated_by: None,
            updated_at: None,
        }
    }

    /// Derived, never stored
    pub fn quadrant(&self) -> Quadrant {
        quadrant_for(self.performance, self.potential)
    }

    /// Apply a move, remembering the cell the employee came from
    pub fn moved(
        current: Option<&PositionRecord>,
        employee_id: EmployeeId,
        performance: Rating,
        potential: Rating,
        justification: Justification,
        by: UserId,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            employee_id,
            performance,
            potential,
            justification: Some(justification),
            previous_quadrant: current.map(PositionRecord::quadrant),
            updated_by: Some(by),
            updated_at: Some(at),
        }
    }
}

/// Employees counted per grid cell
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDistribution {
    counts: Vec<(Quadrant, usize)>,
}

impl GridDistribution {
    pub fn from_positions<'a>(positions: impl IntoIterator<Item = &'a PositionRecord>) -> Self {
        let mut counts: Vec<(Quadrant, usize)> =
            Quadrant::GRID_ORDER.iter().map(|q| (*q, 0)).collect();
        for position in positions {
            let quadrant = position.quadrant();
            if let Some(entry) = counts.iter_mut().find(|(q, _)| *q == quadrant) {
                entry.1 += 1;
            }
        }
        Self { counts }
    }

    pub fn count(&self, quadrant: Quadrant) -> usize {
        self.counts
            .iter()
            .find(|(q, _)| *q == quadrant)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    /// Cells in rendering order (see [`Quadrant::GRID_ORDER`])
    pub fn iter(&self) -> impl Iterator<Item = (Quadrant, usize)> + '_ {
        self.counts.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(v: u8) -> Rating {
        Rating::new(v).unwrap()
    }

    #[test]
    fn test_moved_records_previous_quadrant() {
        let current = PositionRecord::imported(EmployeeId::new(1), r(2), r(2));
        let next = PositionRecord::moved(
            Some(&current),
            EmployeeId::new(1),
            r(4),
            r(4),
            Justification::new("promoted after review").unwrap(),
            UserId::new(9),
            Utc::now(),
        );
        assert_eq!(next.quadrant(), Quadrant::HighHigh);
        assert_eq!(next.previous_quadrant, Some(Quadrant::LowLow));
    }

    #[test]
    fn test_distribution_counts() {
        let positions = vec![
            PositionRecord::imported(EmployeeId::new(1), r(5), r(5)),
            PositionRecord::imported(EmployeeId::new(2), r(4), r(4)),
            PositionRecord::imported(EmployeeId::new(3), r(1), r(3)),
        ];
        let grid = GridDistribution::from_positions(&positions);
        assert_eq!(grid.count(Quadrant::HighHigh), 2);
        assert_eq!(grid.count(Quadrant::LowMedium), 1);
        assert_eq!(grid.count(Quadrant::MediumMedium), 0);
        assert_eq!(grid.total(), 3);
        assert_eq!(grid.iter().count(), 9);
    }
}
