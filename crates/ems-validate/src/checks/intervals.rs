//! Duration plausibility check.

use polars::prelude::DataFrame;

use ems_ingest::column_f64;
use ems_model::columns::INTERVAL_COLUMNS;
use ems_model::{DataQualityFinding, FindingKind, FindingSeverity};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalCounts {
    pub null: usize,
    pub negative: usize,
    pub over_limit: usize,
}

impl IntervalCounts {
    pub fn total(&self) -> usize {
        self.null + self.negative + self.over_limit
    }
}

/// Count null, negative and over-limit values of one duration column.
pub fn interval_counts(
    df: &DataFrame,
    column: &str,
    max_minutes: f64,
) -> Option<IntervalCounts> {
    let values = df.column(column).ok()?;
    let mut counts = IntervalCounts::default();
    for idx in 0..values.len() {
        match column_f64(values, idx) {
            None => counts.null += 1,
            Some(minutes) if minutes < 0.0 => counts.negative += 1,
            Some(minutes) if minutes > max_minutes => counts.over_limit += 1,
            Some(_) => {}
        }
    }
    Some(counts)
}

/// One finding per duration column with any value outside `[0, max_minutes]`.
pub fn audit_intervals(table: &str, df: &DataFrame, max_minutes: f64) -> Vec<DataQualityFinding> {
    INTERVAL_COLUMNS
        .iter()
        .filter_map(|&column| {
            let counts = interval_counts(df, column, max_minutes)?;
            if counts.total() == 0 {
                return None;
            }
            Some(DataQualityFinding {
                kind: FindingKind::OutOfRangeInterval,
                severity: FindingSeverity::Warning,
                table: table.to_string(),
                column: Some(column.to_string()),
                count: counts.total() as u64,
                message: format!(
                    "{} null, {} negative, {} above {max_minutes} minutes",
                    counts.null, counts.negative, counts.over_limit
                ),
            })
        })
        .collect()
}
