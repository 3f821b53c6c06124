//! Polars AnyValue utility functions.
//!
//! Helpers for reading individual cells out of loosely typed sheet columns.

use polars::prelude::{AnyValue, Column, DataFrame};

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for Null, formats floats without trailing zeros.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Converts AnyValue to String, returning None if the result is blank.
pub fn any_to_string_non_empty(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Converts an AnyValue to f64, returning None for non-numeric or null values.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// Parses a string as f64, returning None for invalid, empty or non-finite input.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Get a cell from a column as f64 (null, missing or non-numeric -> None).
pub fn column_f64(column: &Column, idx: usize) -> Option<f64> {
    column.get(idx).ok().and_then(any_to_f64)
}

/// Get a trimmed, non-empty string cell from a column.
pub fn column_string(column: &Column, idx: usize) -> Option<String> {
    column
        .get(idx)
        .ok()
        .and_then(any_to_string_non_empty)
        .map(|value| value.trim().to_string())
}

/// Extract the identifier of every row; blank or null identifiers are `None`.
pub fn key_values(df: &DataFrame, key: &str) -> Option<Vec<Option<String>>> {
    let column = df.column(key).ok()?;
    Some((0..df.height()).map(|idx| column_string(column, idx)).collect())
}

/// True for dtypes the pipeline treats as numeric measurements.
pub fn is_numeric_dtype(dtype: &polars::prelude::DataType) -> bool {
    use polars::prelude::DataType;
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::Int16
            | DataType::Int8
            | DataType::UInt64
            | DataType::UInt32
            | DataType::UInt16
            | DataType::UInt8
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_numeric_strips_trailing_zeros() {
        assert_eq!(format_numeric(10.0), "10");
        assert_eq!(format_numeric(10.50), "10.5");
        assert_eq!(format_numeric(120.0), "120");
        assert_eq!(format_numeric(0.25), "0.25");
    }

    #[test]
    fn parse_f64_rejects_blank_and_text() {
        assert_eq!(parse_f64(" 120 "), Some(120.0));
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("Not Recorded"), None);
        assert_eq!(parse_f64("NaN"), None);
    }

    #[test]
    fn any_to_f64_reads_strings_and_numbers() {
        assert_eq!(any_to_f64(AnyValue::Int64(3)), Some(3.0));
        assert_eq!(any_to_f64(AnyValue::String("4.5")), Some(4.5));
        assert_eq!(any_to_f64(AnyValue::String("abc")), None);
        assert_eq!(any_to_f64(AnyValue::Null), None);
    }
}
