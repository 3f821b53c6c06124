//! Grouped counts with percentages.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use serde::Serialize;

use ems_ingest::column_string;
use ems_transform::AgeGroup;

use crate::error::{ReportError, Result};

/// Label used for null or blank values.
pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountRow {
    pub label: String,
    pub count: usize,
    /// Share of the cohort, 0 to 100.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountTable {
    pub title: String,
    /// Cohort size the percentages are relative to.
    pub total: usize,
    pub rows: Vec<CountRow>,
}

impl CountTable {
    fn from_counts(title: &str, total: usize, counts: Vec<(String, usize)>) -> Self {
        let rows = counts
            .into_iter()
            .map(|(label, count)| CountRow {
                label,
                count,
                percent: percent(count, total),
            })
            .collect();
        Self {
            title: title.to_string(),
            total,
            rows,
        }
    }

    pub fn count_of(&self, label: &str) -> Option<usize> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.count)
    }
}

pub fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

fn labels(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let values = df
        .column(column)
        .map_err(|_| ReportError::ColumnNotFound(column.to_string()))?;
    Ok((0..df.height())
        .map(|idx| column_string(values, idx))
        .collect())
}

/// Most frequent first, ties by label, with `Unknown` always last.
fn ordered(counts: BTreeMap<String, usize>, unknown: usize) -> Vec<(String, usize)> {
    let mut rows: Vec<(String, usize)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    if unknown > 0 {
        rows.push((UNKNOWN_LABEL.to_string(), unknown));
    }
    rows
}

/// Count rows per distinct value of `column`.
pub fn counts_by(df: &DataFrame, column: &str, title: &str) -> Result<CountTable> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut unknown = 0;
    for label in labels(df, column)? {
        match label {
            Some(label) => *counts.entry(label).or_insert(0) += 1,
            None => unknown += 1,
        }
    }
    Ok(CountTable::from_counts(
        title,
        df.height(),
        ordered(counts, unknown),
    ))
}

/// Count rows per age bracket, in bracket order; empty brackets are listed.
pub fn counts_by_age_group(df: &DataFrame, column: &str, title: &str) -> Result<CountTable> {
    let mut counts = [0usize; AgeGroup::ALL.len()];
    let mut unknown = 0;
    for label in labels(df, column)? {
        match label.as_deref().and_then(AgeGroup::from_label) {
            Some(group) => counts[group as usize] += 1,
            None => unknown += 1,
        }
    }
    let mut rows: Vec<(String, usize)> = AgeGroup::ALL
        .iter()
        .zip(counts)
        .map(|(group, count)| (group.label().to_string(), count))
        .collect();
    if unknown > 0 {
        rows.push((UNKNOWN_LABEL.to_string(), unknown));
    }
    Ok(CountTable::from_counts(title, df.height(), rows))
}

/// Count incidents per entry of a comma-separated multi-select field.
///
/// An incident listing several interventions is counted once under each, so
/// percentages may sum to more than 100.
pub fn multi_select_counts(df: &DataFrame, column: &str, title: &str) -> Result<CountTable> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut unknown = 0;
    for label in labels(df, column)? {
        let Some(label) = label else {
            unknown += 1;
            continue;
        };
        let mut entries: Vec<&str> = label
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .collect();
        entries.sort_unstable();
        entries.dedup();
        for entry in entries {
            *counts.entry(entry.to_string()).or_insert(0) += 1;
        }
    }
    Ok(CountTable::from_counts(
        title,
        df.height(),
        ordered(counts, unknown),
    ))
}
