//! Column header normalization.
//!
//! Spreadsheet exports wrap long headers over two lines, which leaves an
//! embedded CRLF in the header text. Downstream lookups match headers
//! exactly, so the break is replaced by a single space. A bare `\n` or `\r`
//! (CRLF folded by an XML reader) is treated the same way.

use std::collections::BTreeSet;

use polars::prelude::{DataFrame, DataType, NamedFrom, PlSmallStr, PolarsResult, Series};

use crate::polars_utils::column_string;

/// Replace every embedded line break in a header with a single space.
pub fn normalize_header(raw: &str) -> String {
    raw.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

/// Return a copy of `df` with normalized headers. Cell values are untouched.
pub fn normalize_headers(df: &DataFrame) -> PolarsResult<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| normalize_header(name.as_str()))
        .collect();
    let mut normalized = df.clone();
    normalized.set_column_names(unique_headers(names).into_iter().map(PlSmallStr::from))?;
    Ok(normalized)
}

/// Fill blank headers and disambiguate repeated ones.
///
/// Blank headers become `Unnamed: <index>`; the second and later copies of
/// a header get `.1`, `.2`, ... appended.
pub fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut unique = Vec::with_capacity(headers.len());
    for (idx, header) in headers.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            header
        };
        let mut candidate = base.clone();
        let mut counter = 1usize;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{counter}");
            counter += 1;
        }
        if candidate != base {
            tracing::warn!(header = %base, renamed = %candidate, "duplicate column header");
        }
        seen.insert(candidate.clone());
        unique.push(candidate);
    }
    unique
}

/// Store the identifier column as text so numeric and text identifiers
/// compare equal across sheets (`1001.0` becomes `"1001"`).
///
/// Sheets without the column are returned unchanged; the schema check
/// reports them.
pub fn identifier_as_text(df: &DataFrame, id: &str) -> PolarsResult<DataFrame> {
    let Ok(column) = df.column(id) else {
        return Ok(df.clone());
    };
    if column.dtype() == &DataType::String {
        return Ok(df.clone());
    }
    let values: Vec<Option<String>> = (0..column.len())
        .map(|idx| column_string(column, idx))
        .collect();
    let mut converted = df.clone();
    converted.with_column(Series::new(id.into(), values))?;
    Ok(converted)
}
