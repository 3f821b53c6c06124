//! XLSX workbook loading.
//!
//! Each named sheet becomes an independent [`SheetFrame`]. The first row of a
//! sheet is the header row; fully empty rows are skipped and row order is
//! otherwise preserved.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use tracing::{debug, info};

use ems_model::SheetNames;

use crate::error::{IngestError, Result};
use crate::header::unique_headers;
use crate::polars_utils::format_numeric;

/// A sheet loaded into a DataFrame, tagged with its sheet name.
#[derive(Debug, Clone)]
pub struct SheetFrame {
    pub sheet: String,
    pub data: DataFrame,
}

impl SheetFrame {
    pub fn new(sheet: impl Into<String>, data: DataFrame) -> Self {
        Self {
            sheet: sheet.into(),
            data,
        }
    }

    pub fn record_count(&self) -> usize {
        self.data.height()
    }

    /// Apply a stage to the data, keeping the sheet name.
    pub fn map<F>(&self, stage: F) -> std::result::Result<Self, polars::prelude::PolarsError>
    where
        F: FnOnce(&DataFrame) -> std::result::Result<DataFrame, polars::prelude::PolarsError>,
    {
        Ok(Self::new(self.sheet.clone(), stage(&self.data)?))
    }
}

/// The five source tables, one per sheet.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub incident_times: SheetFrame,
    pub cardiac_arrest: SheetFrame,
    pub vitals: SheetFrame,
    pub patient: SheetFrame,
    pub response: SheetFrame,
}

impl SourceTables {
    /// Tables in load order.
    pub fn all(&self) -> [&SheetFrame; 5] {
        [
            &self.incident_times,
            &self.cardiac_arrest,
            &self.vitals,
            &self.patient,
            &self.response,
        ]
    }

    /// Apply the same stage to every table.
    pub fn map_all<F>(&self, stage: F) -> std::result::Result<Self, polars::prelude::PolarsError>
    where
        F: Fn(&DataFrame) -> std::result::Result<DataFrame, polars::prelude::PolarsError>,
    {
        Ok(Self {
            incident_times: self.incident_times.map(&stage)?,
            cardiac_arrest: self.cardiac_arrest.map(&stage)?,
            vitals: self.vitals.map(&stage)?,
            patient: self.patient.map(&stage)?,
            response: self.response.map(&stage)?,
        })
    }
}

/// Load the five named sheets from an XLSX workbook.
///
/// # Errors
///
/// Returns a source-read error when the file is missing, is not a valid
/// workbook, or lacks one of the named sheets.
pub fn load_workbook(path: &Path, sheets: &SheetNames) -> Result<SourceTables> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut workbook: Xlsx<BufReader<File>> =
        open_workbook(path).map_err(|error: calamine::XlsxError| {
            IngestError::InvalidWorkbook {
                path: path.to_path_buf(),
                message: error.to_string(),
            }
        })?;
    let available = workbook.sheet_names();

    let tables = SourceTables {
        incident_times: read_sheet(&mut workbook, path, &available, &sheets.incident_times)?,
        cardiac_arrest: read_sheet(&mut workbook, path, &available, &sheets.cardiac_arrest)?,
        vitals: read_sheet(&mut workbook, path, &available, &sheets.vitals)?,
        patient: read_sheet(&mut workbook, path, &available, &sheets.patient)?,
        response: read_sheet(&mut workbook, path, &available, &sheets.response)?,
    };
    info!(
        workbook = %path.display(),
        incident_rows = tables.incident_times.record_count(),
        vitals_rows = tables.vitals.record_count(),
        "workbook loaded"
    );
    Ok(tables)
}

fn read_sheet(
    workbook: &mut Xlsx<BufReader<File>>,
    path: &Path,
    available: &[String],
    sheet: &str,
) -> Result<SheetFrame> {
    if !available.iter().any(|name| name == sheet) {
        return Err(IngestError::MissingSheet {
            sheet: sheet.to_string(),
            path: path.to_path_buf(),
            available: available.join(", "),
        });
    }
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|error| IngestError::SheetRead {
            sheet: sheet.to_string(),
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
    let data = range_to_frame(&range)?;
    debug!(
        sheet,
        rows = data.height(),
        columns = data.width(),
        "sheet read"
    );
    Ok(SheetFrame::new(sheet, data))
}

/// Convert a worksheet range (header row first) into a DataFrame.
pub fn range_to_frame(range: &Range<Data>) -> Result<DataFrame> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let headers = unique_headers(header_row.iter().map(header_text).collect());
    let body: Vec<&[Data]> = rows
        .filter(|row| !row.iter().all(is_blank))
        .collect();

    let mut columns: Vec<Column> = Vec::with_capacity(headers.len());
    for (col_idx, name) in headers.iter().enumerate() {
        let cells: Vec<&Data> = body
            .iter()
            .map(|row| row.get(col_idx).unwrap_or(&Data::Empty))
            .collect();
        columns.push(build_column(name, &cells));
    }
    Ok(DataFrame::new(columns)?)
}

/// Numeric when every non-empty cell is a number or a date-formatted serial.
fn build_column(name: &str, cells: &[&Data]) -> Column {
    let numeric = cells
        .iter()
        .all(|cell| is_blank(cell) || cell_f64(cell).is_some());
    if numeric {
        let values: Vec<Option<f64>> = cells.iter().map(|cell| cell_f64(cell)).collect();
        Series::new(name.into(), values).into_column()
    } else {
        let values: Vec<Option<String>> = cells.iter().map(|cell| cell_text(cell)).collect();
        Series::new(name.into(), values).into_column()
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn cell_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(v) => Some(*v as f64),
        Data::Float(v) => Some(*v),
        Data::DateTime(v) => Some(v.as_f64()),
        _ => None,
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(decode_xml_escapes(s)),
        Data::Int(v) => Some(v.to_string()),
        Data::Float(v) => Some(format_numeric(*v)),
        Data::DateTime(v) => Some(format_numeric(v.as_f64())),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        // Empty and error cells
        _ => None,
    }
}

/// Decode the `_xHHHH_` escapes XLSX uses for control characters in stored
/// strings (`_x000D_` for a carriage return). Text that is not a complete
/// escape is kept as is.
pub fn decode_xml_escapes(raw: &str) -> String {
    let mut decoded = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find("_x") {
        decoded.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match escaped_char(tail) {
            Some(ch) => {
                decoded.push(ch);
                rest = &tail[7..];
            }
            None => {
                decoded.push_str("_x");
                rest = &tail[2..];
            }
        }
    }
    decoded.push_str(rest);
    decoded
}

/// The character encoded by a leading `_xHHHH_`, if `tail` starts with one.
fn escaped_char(tail: &str) -> Option<char> {
    let bytes = tail.as_bytes();
    if bytes.len() < 7 || bytes[6] != b'_' {
        return None;
    }
    let hex = tail.get(2..6)?;
    if !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

fn header_text(cell: &Data) -> String {
    cell_text(cell).unwrap_or_default()
}
