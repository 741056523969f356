//! The nine-box grid
//!
//! Performance and potential are each cut into three bands on the 1–5
//! scale used everywhere else:
//!
//! | Rating | Band   | Representative |
//! |--------|--------|----------------|
//! | 1–2    | low    | 2              |
//! | 3      | medium | 3              |
//! | 4–5    | high   | 4              |
//!
//! A [`Quadrant`] is the (performance band, potential band) pair, written
//! `performance_potential`, e.g. `low_high`.

use crate::core::score::Rating;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One third of the 1–5 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Low,
    Medium,
    High,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::Low, Band::Medium, Band::High];

    pub fn of(rating: Rating) -> Self {
        match rating.value() {
            0..=2 => Band::Low,
            3 => Band::Medium,
            _ => Band::High,
        }
    }

    /// The score an employee receives when placed in this band without an
    /// exact value (band midpoint)
    pub fn representative(&self) -> Rating {
        match self {
            Band::Low => Rating::from_band(2),
            Band::Medium => Rating::from_band(3),
            Band::High => Rating::from_band(4),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Low => "low",
            Band::Medium => "medium",
            Band::High => "high",
        }
    }
}

impl FromStr for Band {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" | "baixo" => Ok(Band::Low),
            "medium" | "médio" | "medio" => Ok(Band::Medium),
            "high" | "alto" => Ok(Band::High),
            _ => Err(format!("Unknown band: {}. Valid: low, medium, high", s)),
        }
    }
}

/// A cell of the performance × potential grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    LowLow,
    LowMedium,
    LowHigh,
    MediumLow,
    MediumMedium,
    MediumHigh,
    HighLow,
    HighMedium,
    HighHigh,
}

impl Quadrant {
    /// All nine cells, potential-major from the top-left of a rendered grid
    /// (high potential first, low performance first)
    pub const GRID_ORDER: [Quadrant; 9] = [
        Quadrant::LowHigh,
        Quadrant::MediumHigh,
        Quadrant::HighHigh,
        Quadrant::LowMedium,
        Quadrant::MediumMedium,
        Quadrant::HighMedium,
        Quadrant::LowLow,
        Quadrant::MediumLow,
        Quadrant::HighLow,
    ];

    pub fn from_bands(performance: Band, potential: Band) -> Self {
        match (performance, potential) {
            (Band::Low, Band::Low) => Quadrant::LowLow,
            (Band::Low, Band::Medium) => Quadrant::LowMedium,
            (Band::Low, Band::High) => Quadrant::LowHigh,
            (Band::Medium, Band::Low) => Quadrant::MediumLow,
            (Band::Medium, Band::Medium) => Quadrant::MediumMedium,
            (Band::Medium, Band::High) => Quadrant::MediumHigh,
            (Band::High, Band::Low) => Quadrant::HighLow,
            (Band::High, Band::Medium) => Quadrant::HighMedium,
            (Band::High, Band::High) => Quadrant::HighHigh,
        }
    }

    pub fn performance(&self) -> Band {
        match self {
            Quadrant::LowLow | Quadrant::LowMedium | Quadrant::LowHigh => Band::Low,
            Quadrant::MediumLow | Quadrant::MediumMedium | Quadrant::MediumHigh => Band::Medium,
            Quadrant::HighLow | Quadrant::HighMedium | Quadrant::HighHigh => Band::High,
        }
    }

    pub fn potential(&self) -> Band {
        match self {
            Quadrant::LowLow | Quadrant::MediumLow | Quadrant::HighLow => Band::Low,
            Quadrant::LowMedium | Quadrant::MediumMedium | Quadrant::HighMedium => Band::Medium,
            Quadrant::LowHigh | Quadrant::MediumHigh | Quadrant::HighHigh => Band::High,
        }
    }

    /// Canonical (performance, potential) ratings for a drop onto this cell.
    ///
    /// Lossy: any prior exact rating is replaced by the band midpoints.
    pub fn representative_ratings(&self) -> (Rating, Rating) {
        (
            self.performance().representative(),
            self.potential().representative(),
        )
    }

    pub fn id(&self) -> &'static str {
        match self {
            Quadrant::LowLow => "low_low",
            Quadrant::LowMedium => "low_medium",
            Quadrant::LowHigh => "low_high",
            Quadrant::MediumLow => "medium_low",
            Quadrant::MediumMedium => "medium_medium",
            Quadrant::MediumHigh => "medium_high",
            Quadrant::HighLow => "high_low",
            Quadrant::HighMedium => "high_medium",
            Quadrant::HighHigh => "high_high",
        }
    }

    /// Talent-review label for the cell
    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::HighHigh => "Star",
            Quadrant::MediumHigh => "High Potential",
            Quadrant::LowHigh => "Enigma",
            Quadrant::HighMedium => "High Performer",
            Quadrant::MediumMedium => "Core Player",
            Quadrant::LowMedium => "Inconsistent Player",
            Quadrant::HighLow => "Effective Specialist",
            Quadrant::MediumLow => "Solid Professional",
            Quadrant::LowLow => "Risk",
        }
    }

    /// Recommended talent action for people in the cell
    pub fn recommended_action(&self) -> &'static str {
        match self {
            Quadrant::HighHigh => "Immediate successor; stretch assignments and retention focus",
            Quadrant::MediumHigh => "Develop urgently; accelerate growth plan",
            Quadrant::LowHigh => "Needs support; clarify expectations and coaching",
            Quadrant::HighMedium => "Valuable specialist; broaden scope",
            Quadrant::MediumMedium => "Backbone of the team; steady development",
            Quadrant::LowMedium => "Improve performance; targeted feedback",
            Quadrant::HighLow => "Keep in role; recognise expertise",
            Quadrant::MediumLow => "Attention needed; review fit and goals",
            Quadrant::LowLow => "Immediate action; performance plan",
        }
    }
}

/// Map a (performance, potential) pair onto its grid cell
///
/// Pure and deterministic.
pub fn quadrant_for(performance: Rating, potential: Rating) -> Quadrant {
    Quadrant::from_bands(Band::of(performance), Band::of(potential))
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Quadrant {
    type Err = String;

    /// Parses `performance_potential` ids such as `high_high` or `low_medium`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        let (performance, potential) = normalized
            .split_once('_')
            .ok_or_else(|| format!("Unknown quadrant: {}. Expected performance_potential, e.g. high_high", s))?;
        Ok(Quadrant::from_bands(performance.parse()?, potential.parse()?))
    }
}
