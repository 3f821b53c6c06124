//! Race and ethnicity normalization.
//!
//! Free-text race lists are parsed into a [`RaceSelection`]: either a
//! not-recorded marker or the categories detected, in precedence order.
//! Labelling is a pure function over that selection. Precedence, keywords and
//! composite names are tables so they can be read and reviewed as data.

use std::fmt;

use serde::Serialize;

/// The six federal race and ethnicity categories, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RaceCategory {
    White,
    Black,
    Hispanic,
    Asian,
    PacificIslander,
    AmericanIndian,
}

pub const NOT_RECORDED_LABEL: &str = "Not Recorded/Applicable";
pub const OTHER_LABEL: &str = "Other";

const NOT_RECORDED_MARKERS: [&str; 2] = ["not recorded", "not applicable"];

/// Detectors checked in order; the first hit is the primary category.
const DETECTORS: [(RaceCategory, &[&str]); 6] = [
    (RaceCategory::White, &["white"]),
    (RaceCategory::Black, &["black", "african american"]),
    (RaceCategory::Hispanic, &["hispanic", "latino"]),
    (RaceCategory::Asian, &["asian"]),
    (RaceCategory::PacificIslander, &["hawaiian", "pacific islander"]),
    (RaceCategory::AmericanIndian, &["american indian", "alaska native"]),
];

/// Composite labels keyed by (primary, secondary).
const COMPOSITES: [(RaceCategory, RaceCategory, &str); 15] = {
    use RaceCategory::{AmericanIndian, Asian, Black, Hispanic, PacificIslander, White};
    [
        (White, Black, "White and Black or African American"),
        (White, Hispanic, "White and Hispanic or Latino"),
        (White, Asian, "White and Asian"),
        (White, PacificIslander, "White and Native Hawaiian or Other Pacific Islander"),
        (White, AmericanIndian, "White and American Indian or Alaska Native"),
        (Black, Hispanic, "Black or African American and Hispanic or Latino"),
        (Black, Asian, "Black or African American and Asian"),
        (
            Black,
            PacificIslander,
            "Black or African American and Native Hawaiian or Other Pacific Islander",
        ),
        (
            Black,
            AmericanIndian,
            "Black or African American and American Indian or Alaska Native",
        ),
        (Hispanic, Asian, "Hispanic or Latino and Asian"),
        (
            Hispanic,
            PacificIslander,
            "Hispanic or Latino and Native Hawaiian or Other Pacific Islander",
        ),
        (
            Hispanic,
            AmericanIndian,
            "Hispanic or Latino and American Indian or Alaska Native",
        ),
        (Asian, PacificIslander, "Asian and Native Hawaiian or Other Pacific Islander"),
        (Asian, AmericanIndian, "Asian and American Indian or Alaska Native"),
        (
            PacificIslander,
            AmericanIndian,
            "Native Hawaiian or Other Pacific Islander and American Indian or Alaska Native",
        ),
    ]
};

impl RaceCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::White => "White",
            Self::Black => "Black or African American",
            Self::Hispanic => "Hispanic or Latino",
            Self::Asian => "Asian",
            Self::PacificIslander => "Native Hawaiian or Other Pacific Islander",
            Self::AmericanIndian => "American Indian or Alaska Native",
        }
    }
}

impl fmt::Display for RaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parsed race field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceSelection {
    NotRecorded,
    /// Detected categories in precedence order; empty when nothing matched.
    Categories(Vec<RaceCategory>),
}

impl RaceSelection {
    /// Keywords match whole words, so "Caucasian" does not detect Asian.
    pub fn parse(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|ch: char| !ch.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect();
        if NOT_RECORDED_MARKERS
            .iter()
            .any(|marker| contains_phrase(&words, marker))
        {
            return Self::NotRecorded;
        }
        let categories = DETECTORS
            .iter()
            .filter(|(_, keywords)| {
                keywords
                    .iter()
                    .any(|keyword| contains_phrase(&words, keyword))
            })
            .map(|(category, _)| *category)
            .collect();
        Self::Categories(categories)
    }

    /// Only the primary and the next detected category are expressed.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotRecorded => NOT_RECORDED_LABEL,
            Self::Categories(categories) => match categories.as_slice() {
                [] => OTHER_LABEL,
                [single] => single.label(),
                [primary, secondary, ..] => composite_label(*primary, *secondary),
            },
        }
    }
}

/// True when the space-separated words of `phrase` appear consecutively.
fn contains_phrase(words: &[&str], phrase: &str) -> bool {
    let phrase: Vec<&str> = phrase.split(' ').collect();
    words.windows(phrase.len()).any(|window| window == phrase.as_slice())
}

fn composite_label(primary: RaceCategory, secondary: RaceCategory) -> &'static str {
    COMPOSITES
        .iter()
        .find(|(first, second, _)| *first == primary && *second == secondary)
        .map(|(_, _, label)| *label)
        .unwrap_or(OTHER_LABEL)
}

/// Normalize a raw race list to a single reporting label.
pub fn clean_race_categories(text: &str) -> String {
    RaceSelection::parse(text).label().to_string()
}
