//! Error types for workbook ingestion.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while reading the source workbook.
///
/// Every variant except [`IngestError::DataFrame`] is a source-read failure
/// and aborts the run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Workbook path does not exist or is not a file.
    #[error("workbook not found: {path}")]
    FileNotFound { path: PathBuf },

    /// File exists but could not be opened as an XLSX workbook.
    #[error("invalid workbook {path}: {message}")]
    InvalidWorkbook { path: PathBuf, message: String },

    /// A required sheet is absent from the workbook.
    #[error("sheet '{sheet}' not found in {path} (available: {available})")]
    MissingSheet {
        sheet: String,
        path: PathBuf,
        available: String,
    },

    /// A sheet exists but could not be read.
    #[error("failed to read sheet '{sheet}' in {path}: {message}")]
    SheetRead {
        sheet: String,
        path: PathBuf,
        message: String,
    },

    /// Required headers are absent after header normalization.
    #[error("sheet '{sheet}' is missing required columns: {}", columns.join(", "))]
    MissingColumns { sheet: String, columns: Vec<String> },

    /// Failed DataFrame construction.
    #[error("DataFrame operation failed: {0}")]
    DataFrame(#[from] PolarsError),
}

impl IngestError {
    /// True for failures caused by the workbook itself (missing file, sheet or column).
    pub fn is_source_read(&self) -> bool {
        !matches!(self, Self::DataFrame(_))
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
