//! Interval statistics.

use polars::prelude::DataFrame;
use serde::Serialize;

use ems_ingest::column_f64;

use crate::error::{ReportError, Result};

/// Percentile of sorted values with linear interpolation between ranks.
///
/// `q` is a fraction in `[0, 1]`; returns `None` for an empty slice.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = q.clamp(0.0, 1.0) * last as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalStats {
    pub column: String,
    pub n: usize,
    pub mean: Option<f64>,
    pub p10: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub p90: Option<f64>,
}

impl IntervalStats {
    pub fn from_values(column: &str, mut values: Vec<f64>) -> Self {
        values.retain(|value| value.is_finite());
        values.sort_by(f64::total_cmp);
        let n = values.len();
        let mean = (n > 0).then(|| values.iter().sum::<f64>() / n as f64);
        Self {
            column: column.to_string(),
            n,
            mean,
            p10: percentile(&values, 0.10),
            p25: percentile(&values, 0.25),
            p50: percentile(&values, 0.50),
            p75: percentile(&values, 0.75),
            p90: percentile(&values, 0.90),
        }
    }
}

/// Statistics over the non-null values of a duration column.
pub fn interval_stats(df: &DataFrame, column: &str) -> Result<IntervalStats> {
    let values = df
        .column(column)
        .map_err(|_| ReportError::ColumnNotFound(column.to_string()))?;
    let present: Vec<f64> = (0..values.len())
        .filter_map(|idx| column_f64(values, idx))
        .collect();
    Ok(IntervalStats::from_values(column, present))
}
