//! Vitals coercion and per-incident aggregation.
//!
//! Raw vitals hold zero or more measurement rows per incident. Aggregation
//! collapses them to one row per identifier with the mean, min and max of
//! every numeric field, plus the first observed measurement timestamp.

use std::collections::BTreeMap;

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use serde::Serialize;
use tracing::{debug, warn};

use ems_ingest::{any_to_string_non_empty, column_f64, is_numeric_dtype, key_values};
use ems_model::columns::{MAX_SUFFIX, MEAN_SUFFIX, MIN_SUFFIX, aggregate_column};

use crate::error::{Result, TransformError};
use crate::temporal::{column_millis, is_time_column, millis_column};

/// Non-numeric text replaced by null in a numeric field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercionWarning {
    pub column: String,
    /// Number of cells that held text but no number.
    pub count: usize,
    /// Up to three distinct offending values.
    pub examples: Vec<String>,
}

/// Mean, min and max of the non-null values of one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl FieldStats {
    /// Returns `None` when no value is present.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values.into_iter().flatten() {
            if value.is_nan() {
                continue;
            }
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }
        if count == 0 {
            return None;
        }
        Some(Self {
            mean: sum / count as f64,
            min,
            max,
        })
    }
}

/// Coerce the named columns to Float64; non-numeric cells become null.
///
/// Columns not present in `df` are skipped.
pub fn coerce_numeric(
    df: &DataFrame,
    columns: &[String],
) -> Result<(DataFrame, Vec<CoercionWarning>)> {
    let mut coerced = df.clone();
    let mut warnings = Vec::new();
    for name in columns {
        let Ok(column) = df.column(name) else {
            debug!(column = %name, "numeric column absent, skipping coercion");
            continue;
        };
        let mut values: Vec<Option<f64>> = Vec::with_capacity(column.len());
        let mut count = 0usize;
        let mut examples: Vec<String> = Vec::new();
        for idx in 0..column.len() {
            let value = column_f64(column, idx);
            if value.is_none() {
                if let Some(raw) = column.get(idx).ok().and_then(any_to_string_non_empty) {
                    count += 1;
                    if examples.len() < 3 && !examples.contains(&raw) {
                        examples.push(raw);
                    }
                }
            }
            values.push(value);
        }
        if count > 0 {
            warn!(column = %name, count, "non-numeric values coerced to null");
            warnings.push(CoercionWarning {
                column: name.clone(),
                count,
                examples,
            });
        }
        coerced.with_column(Series::new(name.as_str().into(), values))?;
    }
    Ok((coerced, warnings))
}

/// Numeric columns aggregated per incident: everything numeric except the
/// identifier and the time columns.
pub fn aggregate_fields(df: &DataFrame, id: &str, time_marker: &str) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|column| {
            let name = column.name().as_str();
            name != id && !is_time_column(name, time_marker) && is_numeric_dtype(column.dtype())
        })
        .map(|column| column.name().to_string())
        .collect()
}

/// Collapse vitals rows to one row per incident identifier.
///
/// Output columns: the identifier, the first non-null `timestamp` of each
/// group, then `<field>_mean`, `<field>_min`, `<field>_max` per field.
/// Groups are emitted in identifier order; rows without an identifier are
/// dropped. A field with no values in a group aggregates to null.
pub fn aggregate_vitals(
    df: &DataFrame,
    id: &str,
    timestamp: &str,
    time_marker: &str,
) -> Result<DataFrame> {
    let keys = key_values(df, id).ok_or_else(|| TransformError::column_not_found("Vitals", id))?;
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, key) in keys.into_iter().enumerate() {
        if let Some(key) = key {
            groups.entry(key).or_default().push(idx);
        }
    }

    let timestamps = df
        .column(timestamp)
        .map_err(|_| TransformError::column_not_found("Vitals", timestamp))?;
    let timestamp_millis = column_millis(timestamps)?;
    let fields = aggregate_fields(df, id, time_marker);
    debug!(
        incidents = groups.len(),
        fields = fields.len(),
        "aggregating vitals"
    );

    let ids: Vec<&str> = groups.keys().map(String::as_str).collect();
    let first_taken: Vec<Option<i64>> = groups
        .values()
        .map(|rows| rows.iter().find_map(|&row| timestamp_millis[row]))
        .collect();

    let mut columns: Vec<Column> = Vec::with_capacity(2 + fields.len() * 3);
    columns.push(Series::new(id.into(), ids).into_column());
    columns.push(millis_column(timestamp, first_taken)?);

    for field in &fields {
        let column = df.column(field)?;
        let stats: Vec<Option<FieldStats>> = groups
            .values()
            .map(|rows| FieldStats::from_values(rows.iter().map(|&row| column_f64(column, row))))
            .collect();
        let means: Vec<Option<f64>> = stats.iter().map(|s| s.map(|s| s.mean)).collect();
        let mins: Vec<Option<f64>> = stats.iter().map(|s| s.map(|s| s.min)).collect();
        let maxes: Vec<Option<f64>> = stats.iter().map(|s| s.map(|s| s.max)).collect();
        columns.push(
            Series::new(aggregate_column(field, MEAN_SUFFIX).into(), means).into_column(),
        );
        columns.push(Series::new(aggregate_column(field, MIN_SUFFIX).into(), mins).into_column());
        columns.push(
            Series::new(aggregate_column(field, MAX_SUFFIX).into(), maxes).into_column(),
        );
    }

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_stats_ignore_nulls() {
        let stats = FieldStats::from_values([Some(120.0), None, Some(140.0)]).unwrap();
        assert_eq!(stats.mean, 130.0);
        assert_eq!(stats.min, 120.0);
        assert_eq!(stats.max, 140.0);
    }

    #[test]
    fn field_stats_all_null_is_none() {
        assert_eq!(FieldStats::from_values([None, None]), None);
        assert_eq!(FieldStats::from_values(Vec::new()), None);
        assert_eq!(FieldStats::from_values([Some(f64::NAN)]), None);
    }
}
