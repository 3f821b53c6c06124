//! Missing-data check.
//!
//! A cell is missing when it is null or holds only whitespace.

use polars::prelude::{AnyValue, DataFrame};

use ems_ingest::any_to_string;
use ems_model::{DataQualityFinding, FindingKind, FindingSeverity};

/// Share of missing cells in every column, in column order.
pub fn missing_ratios(df: &DataFrame) -> Vec<(String, f64)> {
    let rows = df.height();
    df.get_columns()
        .iter()
        .map(|column| {
            let missing = (0..rows)
                .filter(|&idx| {
                    let value = column.get(idx).unwrap_or(AnyValue::Null);
                    any_to_string(value).trim().is_empty()
                })
                .count();
            let ratio = if rows == 0 {
                0.0
            } else {
                missing as f64 / rows as f64
            };
            (column.name().to_string(), ratio)
        })
        .collect()
}

/// One finding per column whose missing share exceeds `threshold`.
pub fn audit_missing(table: &str, df: &DataFrame, threshold: f64) -> Vec<DataQualityFinding> {
    let rows = df.height();
    missing_ratios(df)
        .into_iter()
        .filter(|(_, ratio)| *ratio > threshold)
        .map(|(column, ratio)| DataQualityFinding {
            kind: FindingKind::MissingData,
            severity: FindingSeverity::Info,
            table: table.to_string(),
            count: (ratio * rows as f64).round() as u64,
            message: format!("{:.1}% missing", ratio * 100.0),
            column: Some(column),
        })
        .collect()
}
