//! Age normalization and age brackets.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

const DAYS_PER_YEAR: f64 = 365.25;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Units accepted for the raw patient age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeUnit {
    Years,
    Months,
    Days,
}

impl AgeUnit {
    /// Case-insensitive match after trimming.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "years" => Some(Self::Years),
            "months" => Some(Self::Months),
            "days" => Some(Self::Days),
            _ => None,
        }
    }

    pub fn to_years(self, value: f64) -> f64 {
        match self {
            Self::Years => value,
            Self::Months => value / MONTHS_PER_YEAR,
            Self::Days => value / DAYS_PER_YEAR,
        }
    }
}

/// Why an age could not be expressed in years.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum UnitConversionWarning {
    #[error("age value is missing")]
    MissingAge,
    #[error("age unit is missing")]
    MissingUnit,
    #[error("unrecognized age unit '{0}'")]
    UnrecognizedUnit(String),
}

/// Convert a raw age and its unit to years.
///
/// A missing unit is reported before an unrecognized one; a missing age is
/// reported first of all.
pub fn convert_age_to_years(
    age: Option<f64>,
    unit: Option<&str>,
) -> Result<f64, UnitConversionWarning> {
    let Some(age) = age.filter(|value| value.is_finite()) else {
        return Err(UnitConversionWarning::MissingAge);
    };
    let Some(unit) = unit.map(str::trim).filter(|unit| !unit.is_empty()) else {
        return Err(UnitConversionWarning::MissingUnit);
    };
    AgeUnit::parse(unit)
        .map(|parsed| parsed.to_years(age))
        .ok_or_else(|| UnitConversionWarning::UnrecognizedUnit(unit.to_string()))
}

/// Six ordered, mutually exclusive age brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AgeGroup {
    Under18,
    From18To24,
    From25To44,
    From45To64,
    From65To74,
    From75,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 6] = [
        AgeGroup::Under18,
        AgeGroup::From18To24,
        AgeGroup::From25To44,
        AgeGroup::From45To64,
        AgeGroup::From65To74,
        AgeGroup::From75,
    ];

    /// Lower bounds are inclusive. Only NaN has no bracket.
    pub fn from_years(years: f64) -> Option<Self> {
        if years.is_nan() {
            return None;
        }
        let group = if years < 18.0 {
            Self::Under18
        } else if years < 25.0 {
            Self::From18To24
        } else if years < 45.0 {
            Self::From25To44
        } else if years < 65.0 {
            Self::From45To64
        } else if years < 75.0 {
            Self::From65To74
        } else {
            Self::From75
        };
        Some(group)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Under18 => "Younger than 18",
            Self::From18To24 => "18–24",
            Self::From25To44 => "25–44",
            Self::From45To64 => "45–64",
            Self::From65To74 => "65–74",
            Self::From75 => "75 and older",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|group| group.label() == label)
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
