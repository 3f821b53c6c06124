//! Derived analytic fields: age in years, age bracket and cleaned race.

mod age;
mod race;

use std::collections::BTreeMap;

use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::{debug, warn};

use ems_ingest::{column_f64, column_string};
use ems_model::ColumnNames;
use ems_model::columns::{AGE_GROUP, CLEANED_RACE, PATIENT_AGE_YEARS};

use crate::error::{Result, TransformError};

pub use age::{AgeGroup, AgeUnit, UnitConversionWarning, convert_age_to_years};
pub use race::{
    NOT_RECORDED_LABEL, OTHER_LABEL, RaceCategory, RaceSelection, clean_race_categories,
};

/// Combined table with derived columns, plus the recovered age warnings.
#[derive(Debug, Clone)]
pub struct DerivedFrame {
    pub data: DataFrame,
    /// One entry per row whose age could not be converted.
    pub warnings: Vec<UnitConversionWarning>,
}

impl DerivedFrame {
    /// Warning counts keyed by message, in message order.
    pub fn warning_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for warning in &self.warnings {
            *counts.entry(warning.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// Append `Patient_Age_Years`, `Age_Group` and `Cleaned_Race`.
///
/// Rows whose age cannot be converted get nulls for both age columns; a null
/// race field gives a null cleaned race.
pub fn derive_fields(df: &DataFrame, columns: &ColumnNames) -> Result<DerivedFrame> {
    let table = "combined record";
    let age = df
        .column(&columns.age)
        .map_err(|_| TransformError::column_not_found(table, &columns.age))?;
    let units = df
        .column(&columns.age_units)
        .map_err(|_| TransformError::column_not_found(table, &columns.age_units))?;
    let race = df
        .column(&columns.race)
        .map_err(|_| TransformError::column_not_found(table, &columns.race))?;

    let height = df.height();
    let mut years: Vec<Option<f64>> = Vec::with_capacity(height);
    let mut groups: Vec<Option<&'static str>> = Vec::with_capacity(height);
    let mut races: Vec<Option<String>> = Vec::with_capacity(height);
    let mut warnings = Vec::new();

    for idx in 0..height {
        let unit = column_string(units, idx);
        match convert_age_to_years(column_f64(age, idx), unit.as_deref()) {
            Ok(value) => {
                years.push(Some(value));
                groups.push(AgeGroup::from_years(value).map(AgeGroup::label));
            }
            Err(warning) => {
                years.push(None);
                groups.push(None);
                warnings.push(warning);
            }
        }
        races.push(column_string(race, idx).map(|text| clean_race_categories(&text)));
    }

    let mut data = df.clone();
    data.with_column(Series::new(PATIENT_AGE_YEARS.into(), years))?;
    data.with_column(Series::new(AGE_GROUP.into(), groups))?;
    data.with_column(Series::new(CLEANED_RACE.into(), races))?;

    let derived = DerivedFrame { data, warnings };
    for (reason, count) in derived.warning_counts() {
        warn!(count, reason = %reason, "age not converted to years");
    }
    debug!(rows = height, "derived fields appended");
    Ok(derived)
}
