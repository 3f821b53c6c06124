//! Spreadsheet serial date-time conversion.
//!
//! Spreadsheets store timestamps as a day count since 1899-12-30 with the
//! time of day in the fractional part. The 1899-12-30 epoch absorbs the
//! fictitious 1900-02-29 of the original spreadsheet date system, so every
//! serial from 61 (1900-03-01) onwards lines up with the calendar. The epoch
//! is kept verbatim; correcting it would shift every timestamp in the source
//! file by a day.

use chrono::{DateTime, Utc};
use polars::prelude::{Column, DataFrame, DataType, IntoColumn, NamedFrom, Series, TimeUnit};

use ems_ingest::{any_to_f64, is_numeric_dtype};

use crate::error::Result;

/// 1899-12-30T00:00:00Z in milliseconds since the Unix epoch.
pub const SERIAL_EPOCH_MILLIS: i64 = -2_209_161_600_000;

pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Dtype used for every converted timestamp column (UTC, millisecond precision).
pub fn timestamp_dtype() -> DataType {
    DataType::Datetime(TimeUnit::Milliseconds, None)
}

/// Convert a serial day count to milliseconds since the Unix epoch.
///
/// Returns `None` for NaN or infinite input.
pub fn serial_to_millis(serial: f64) -> Option<i64> {
    if !serial.is_finite() {
        return None;
    }
    let offset = (serial * MILLIS_PER_DAY).round();
    if offset.abs() > i64::MAX as f64 / 2.0 {
        return None;
    }
    SERIAL_EPOCH_MILLIS.checked_add(offset as i64)
}

/// Convert a serial day count to an absolute UTC timestamp.
///
/// `serial_to_datetime(s) == 1899-12-30T00:00:00Z + s * 86400 s`, rounded to
/// the millisecond.
pub fn serial_to_datetime(serial: f64) -> Option<DateTime<Utc>> {
    serial_to_millis(serial).and_then(DateTime::from_timestamp_millis)
}

fn unit_divisor(unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Nanoseconds => 1_000_000,
        TimeUnit::Microseconds => 1_000,
        TimeUnit::Milliseconds => 1,
    }
}

/// Read a column as Unix milliseconds.
///
/// Datetime columns are rescaled; numeric and text columns are read as
/// serial day counts, with null or non-numeric cells giving `None`.
pub fn column_millis(column: &Column) -> Result<Vec<Option<i64>>> {
    if let DataType::Datetime(unit, _) = column.dtype() {
        let divisor = unit_divisor(*unit);
        let physical = column.cast(&DataType::Int64)?;
        let values = physical
            .i64()?
            .into_iter()
            .map(|value| value.map(|v| v.div_euclid(divisor)))
            .collect();
        return Ok(values);
    }
    let values = (0..column.len())
        .map(|idx| {
            column
                .get(idx)
                .ok()
                .and_then(any_to_f64)
                .and_then(serial_to_millis)
        })
        .collect();
    Ok(values)
}

/// Build a timestamp column from Unix milliseconds.
pub fn millis_column(name: &str, values: Vec<Option<i64>>) -> Result<Column> {
    let series = Series::new(name.into(), values).cast(&timestamp_dtype())?;
    Ok(series.into_column())
}

/// True when a header marks a serial date-time field.
pub fn is_time_column(name: &str, marker: &str) -> bool {
    name.contains(marker)
}

/// Convert every column whose header contains `marker` to a UTC timestamp.
///
/// Columns that already hold timestamps pass through. Text columns are
/// parsed as serials where possible; anything else becomes null.
pub fn convert_time_columns(df: &DataFrame, marker: &str) -> Result<DataFrame> {
    let mut converted = df.clone();
    for column in df.get_columns() {
        let name = column.name().as_str();
        if !is_time_column(name, marker) {
            continue;
        }
        let dtype = column.dtype();
        if matches!(dtype, DataType::Datetime(_, _)) {
            continue;
        }
        if !(is_numeric_dtype(dtype) || matches!(dtype, DataType::String | DataType::Null)) {
            tracing::warn!(column = name, dtype = %dtype, "time column has unexpected type");
        }
        let values = column_millis(column)?;
        let invalid = values
            .iter()
            .zip(0..column.len())
            .filter(|(value, idx)| {
                value.is_none() && column.get(*idx).is_ok_and(|cell| !cell.is_null())
            })
            .count();
        if invalid > 0 {
            tracing::warn!(column = name, invalid, "non-numeric serial date values set to null");
        }
        converted.with_column(millis_column(name, values)?)?;
    }
    Ok(converted)
}
