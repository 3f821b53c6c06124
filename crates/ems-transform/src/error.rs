use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by transformation stages.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A column the stage depends on is absent.
    #[error("column '{column}' not found in {table}")]
    ColumnNotFound { table: String, column: String },

    #[error("DataFrame operation failed: {0}")]
    DataFrame(#[from] PolarsError),
}

impl TransformError {
    pub(crate) fn column_not_found(table: &str, column: &str) -> Self {
        Self::ColumnNotFound {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
