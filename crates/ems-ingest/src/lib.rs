//! EMS workbook ingestion.
//!
//! - **workbook**: loads the five named sheets into DataFrames
//! - **header**: header normalization (embedded line breaks)
//! - **schema**: expected-schema validation
//! - **polars_utils**: AnyValue conversions shared by downstream crates

pub mod error;
pub mod header;
pub mod polars_utils;
pub mod schema;
pub mod workbook;

pub use error::{IngestError, Result};
pub use header::{identifier_as_text, normalize_header, normalize_headers, unique_headers};
pub use polars_utils::{
    any_to_f64, any_to_string, any_to_string_non_empty, column_f64, column_string,
    format_numeric, is_numeric_dtype, key_values, parse_f64,
};
pub use schema::{missing_columns, validate_schema};
pub use workbook::{
    SheetFrame, SourceTables, decode_xml_escapes, load_workbook, range_to_frame,
};
