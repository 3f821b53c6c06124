//! Completeness of key analytic columns by age bracket.
//!
//! Uneven missingness across brackets biases every other summary, so the
//! report lists it next to them.

use polars::prelude::DataFrame;
use serde::Serialize;

use ems_ingest::column_string;
use ems_transform::AgeGroup;

use crate::counts::{UNKNOWN_LABEL, percent};
use crate::error::{ReportError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnCompleteness {
    pub column: String,
    /// Share of non-missing values, 0 to 100.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletenessRow {
    pub age_group: String,
    pub n: usize,
    pub columns: Vec<ColumnCompleteness>,
}

/// Non-missing percentage of `columns` within each age bracket.
///
/// Brackets without rows are omitted; rows without a bracket form a final
/// `Unknown` group. Absent columns count as fully missing.
pub fn completeness_by_age_group(
    df: &DataFrame,
    age_group_column: &str,
    columns: &[&str],
) -> Result<Vec<CompletenessRow>> {
    let groups = df
        .column(age_group_column)
        .map_err(|_| ReportError::ColumnNotFound(age_group_column.to_string()))?;
    let bucket_of: Vec<usize> = (0..df.height())
        .map(|idx| {
            column_string(groups, idx)
                .as_deref()
                .and_then(AgeGroup::from_label)
                .map_or(AgeGroup::ALL.len(), |group| group as usize)
        })
        .collect();

    let labels = AgeGroup::ALL
        .iter()
        .map(|group| group.label())
        .chain([UNKNOWN_LABEL]);
    let mut rows = Vec::new();
    for (bucket, label) in labels.enumerate() {
        let members: Vec<usize> = bucket_of
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == bucket)
            .map(|(idx, _)| idx)
            .collect();
        if members.is_empty() {
            continue;
        }
        let columns = columns
            .iter()
            .map(|&name| {
                let present = df.column(name).ok().map_or(0, |column| {
                    members
                        .iter()
                        .filter(|&&idx| column_string(column, idx).is_some())
                        .count()
                });
                ColumnCompleteness {
                    column: name.to_string(),
                    percent: percent(present, members.len()),
                }
            })
            .collect();
        rows.push(CompletenessRow {
            age_group: label.to_string(),
            n: members.len(),
            columns,
        });
    }
    Ok(rows)
}
