//! Operational intervals in minutes and the plausibility filter.

use polars::prelude::{BooleanChunked, DataFrame, NamedFrom, NewChunkedArray, Series};
use tracing::{debug, info};

use ems_model::ColumnNames;
use ems_model::columns::INTERVAL_COLUMNS;

use crate::error::{Result, TransformError};
use crate::temporal::column_millis;

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Minutes from `earlier` to `later`; null when either endpoint is null.
pub fn minutes_between(earlier: Option<i64>, later: Option<i64>) -> Option<f64> {
    match (earlier, later) {
        (Some(earlier), Some(later)) => Some((later - earlier) as f64 / MILLIS_PER_MINUTE),
        _ => None,
    }
}

/// Add `response_time`, `on_scene_time` and `back_in_service_time`.
///
/// Endpoints may be timestamp columns or raw serial day counts.
pub fn compute_intervals(df: &DataFrame, columns: &ColumnNames) -> Result<DataFrame> {
    let mut data = df.clone();
    for (name, (earlier, later)) in INTERVAL_COLUMNS.iter().zip(columns.interval_pairs()) {
        let start = endpoint_millis(df, earlier)?;
        let end = endpoint_millis(df, later)?;
        let minutes: Vec<Option<f64>> = start
            .into_iter()
            .zip(end)
            .map(|(start, end)| minutes_between(start, end))
            .collect();
        debug!(
            interval = name,
            nulls = minutes.iter().filter(|value| value.is_none()).count(),
            "interval computed"
        );
        data.with_column(Series::new((*name).into(), minutes))?;
    }
    Ok(data)
}

fn endpoint_millis(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let column = df
        .column(name)
        .map_err(|_| TransformError::column_not_found("combined record", name))?;
    column_millis(column)
}

/// Within `[0, max_minutes]`; null is never plausible.
pub fn is_plausible(minutes: Option<f64>, max_minutes: f64) -> bool {
    minutes.is_some_and(|value| (0.0..=max_minutes).contains(&value))
}

/// Rows whose three intervals are all plausible, in original order.
pub fn clean_view(df: &DataFrame, max_minutes: f64) -> Result<DataFrame> {
    let mut keep = vec![true; df.height()];
    for name in INTERVAL_COLUMNS {
        let column = df
            .column(name)
            .map_err(|_| TransformError::column_not_found("combined record", name))?;
        let values = column.f64()?;
        for (flag, value) in keep.iter_mut().zip(values) {
            *flag = *flag && is_plausible(value, max_minutes);
        }
    }
    let mask = BooleanChunked::from_slice("clean".into(), &keep);
    let clean = df.filter(&mask)?;
    info!(
        rows = df.height(),
        clean_rows = clean.height(),
        excluded = df.height() - clean.height(),
        "clean view filtered"
    );
    Ok(clean)
}
