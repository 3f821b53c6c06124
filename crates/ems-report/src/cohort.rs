//! Cohort selection.

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};
use serde::Serialize;

use ems_ingest::column_string;

use crate::error::{ReportError, Result};

/// True when the arrest field records an arrest ("Yes, Prior to EMS Arrival",
/// "Yes, After EMS Arrival").
pub fn is_cardiac_arrest(value: &str) -> bool {
    value.trim_start().starts_with("Yes")
}

/// Rows whose arrest field starts with "Yes", in original order.
pub fn cardiac_arrest_cases(df: &DataFrame, arrest_column: &str) -> Result<DataFrame> {
    let column = df
        .column(arrest_column)
        .map_err(|_| ReportError::ColumnNotFound(arrest_column.to_string()))?;
    let mask: Vec<bool> = (0..df.height())
        .map(|idx| column_string(column, idx).is_some_and(|value| is_cardiac_arrest(&value)))
        .collect();
    Ok(df.filter(&BooleanChunked::from_slice("arrest".into(), &mask))?)
}

/// The four cohorts summarized by the report.
#[derive(Debug, Clone)]
pub struct Cohorts {
    pub all: DataFrame,
    pub clean: DataFrame,
    pub cardiac_arrest: DataFrame,
    pub clean_cardiac_arrest: DataFrame,
}

impl Cohorts {
    pub fn select(combined: &DataFrame, clean: &DataFrame, arrest_column: &str) -> Result<Self> {
        Ok(Self {
            all: combined.clone(),
            clean: clean.clone(),
            cardiac_arrest: cardiac_arrest_cases(combined, arrest_column)?,
            clean_cardiac_arrest: cardiac_arrest_cases(clean, arrest_column)?,
        })
    }

    pub fn sizes(&self) -> CohortSizes {
        CohortSizes {
            all: self.all.height(),
            clean: self.clean.height(),
            cardiac_arrest: self.cardiac_arrest.height(),
            clean_cardiac_arrest: self.clean_cardiac_arrest.height(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CohortSizes {
    pub all: usize,
    pub clean: usize,
    pub cardiac_arrest: usize,
    pub clean_cardiac_arrest: usize,
}
