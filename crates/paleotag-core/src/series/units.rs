//! Time unit labels found in paleoclimate archives.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Reference year for "before present".
const BP_REFERENCE_YEAR: f64 = 1950.0;

/// Recognised time units. Everything converts through years BP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    /// Years before 1950
    YearsBp,
    /// Thousands of years before 1950
    KiloYearsBp,
    /// Calendar years (CE/AD)
    YearsCe,
}

impl TimeUnit {
    /// Parse a free-form unit label such as `"yr BP"`, `"ka"` or `"AD"`.
    pub fn parse(label: &str) -> Result<Self, ValidationError> {
        let norm = label.trim().to_lowercase().replace(['_', '.'], " ");
        let norm = norm.split_whitespace().collect::<Vec<_>>().join(" ");
        match norm.as_str() {
            "yr bp" | "yrs bp" | "year bp" | "years bp" | "bp" | "cal yr bp" | "y bp" => {
                Ok(Self::YearsBp)
            }
            "ka" | "ka bp" | "kyr" | "kyr bp" | "kyrs bp" | "ky bp" | "cal ka bp" => {
                Ok(Self::KiloYearsBp)
            }
            "ce" | "ad" | "yr ce" | "yr ad" | "year ce" | "year ad" | "years ce"
            | "years ad" => Ok(Self::YearsCe),
            _ => Err(ValidationError::UnknownTimeUnit(label.to_string())),
        }
    }

    /// Canonical label written back onto converted series.
    pub fn label(self) -> &'static str {
        match self {
            Self::YearsBp => "yr BP",
            Self::KiloYearsBp => "ka BP",
            Self::YearsCe => "yr CE",
        }
    }

    pub fn to_years_bp(self, t: f64) -> f64 {
        match self {
            Self::YearsBp => t,
            Self::KiloYearsBp => t * 1000.0,
            Self::YearsCe => BP_REFERENCE_YEAR - t,
        }
    }

    pub fn from_years_bp(self, bp: f64) -> f64 {
        match self {
            Self::YearsBp => bp,
            Self::KiloYearsBp => bp / 1000.0,
            Self::YearsCe => BP_REFERENCE_YEAR - bp,
        }
    }
}

impl std::str::FromStr for TimeUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
