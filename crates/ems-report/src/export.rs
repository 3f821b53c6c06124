//! CSV and JSON exports.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use serde::Serialize;
use tracing::info;

use crate::error::{ReportError, Result};

/// Render a table as CSV with a header row.
pub fn csv_bytes(df: &mut DataFrame) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(df)?;
    Ok(buffer)
}

/// Write a table to `path` as CSV and return the bytes written.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<Vec<u8>> {
    let bytes = csv_bytes(df)?;
    std::fs::write(path, &bytes).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "csv written"
    );
    Ok(bytes)
}

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let io_error = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n").map_err(io_error)?;
    writer.flush().map_err(io_error)?;
    info!(path = %path.display(), "json written");
    Ok(())
}
