//! Risk banding
//!
//! Lower bounds are inclusive: 0.35 is High, 0.18 is Medium.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Probability at or above which a patient is High risk
pub const HIGH_THRESHOLD: f64 = 0.35;

/// Probability at or above which a patient is Medium risk
pub const MEDIUM_THRESHOLD: f64 = 0.18;

/// Coarse risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub fn from_probability(p: f64) -> Self {
        if p >= HIGH_THRESHOLD {
            RiskBand::High
        } else if p >= MEDIUM_THRESHOLD {
            RiskBand::Medium
        } else {
            RiskBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "Low",
            RiskBand::Medium => "Medium",
            RiskBand::High => "High",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(RiskBand::from_probability(0.34999), RiskBand::Medium);
        assert_eq!(RiskBand::from_probability(0.35), RiskBand::High);
        assert_eq!(RiskBand::from_probability(0.17999), RiskBand::Low);
        assert_eq!(RiskBand::from_probability(0.18), RiskBand::Medium);
    }

    #[test]
    fn test_band_extremes() {
        assert_eq!(RiskBand::from_probability(0.0), RiskBand::Low);
        assert_eq!(RiskBand::from_probability(1.0), RiskBand::High);
    }

    #[test]
    fn test_band_display() {
        assert_eq!(RiskBand::High.to_string(), "High");
        assert_eq!(RiskBand::Low.as_str(), "Low");
    }
}
