//! Score value objects
//!
//! Two scales are in play: [`Score`] is the continuous 1–5 value voted on and
//! fixed by consensus, [`Rating`] is the whole-number 1–5 value used to place
//! an employee on the nine-box grid.

use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 5.0;

/// A proposed or consensus score, always within `[1.0, 5.0]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Score(f64);

impl Score {
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&value) {
            return Err(DomainError::validation(format!(
                "score must be between {MIN_SCORE} and {MAX_SCORE}, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Score {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Score::new(value)
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// A grid rating, always a whole number within `1..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: u8) -> Result<Self, DomainError> {
        if !(1..=5).contains(&value) {
            return Err(DomainError::validation(format!(
                "rating must be between 1 and 5, got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Construct a rating known to be in range at compile time
    pub(crate) const fn from_band(value: u8) -> Self {
        Self(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds_inclusive() {
        assert!(Score::new(1.0).is_ok());
        assert!(Score::new(5.0).is_ok());
        assert!(Score::new(3.5).is_ok());
    }

    #[test]
    fn test_score_rejects_out_of_range() {
        assert!(Score::new(0.99).is_err());
        assert!(Score::new(5.01).is_err());
        assert!(Score::new(f64::NAN).is_err());
        assert!(Score::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_score_deserialize_validates() {
        assert!(serde_json::from_str::<Score>("4.5").is_ok());
        assert!(serde_json::from_str::<Score>("6").is_err());
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert_eq!(Rating::new(3).unwrap().value(), 3);
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }
}
