//! Expected-schema validation.

use ems_model::SchemaManifest;

use crate::error::{IngestError, Result};
use crate::workbook::{SheetFrame, SourceTables};

/// Required manifest columns absent from a sheet, in manifest order.
pub fn missing_columns(frame: &SheetFrame, manifest: &SchemaManifest) -> Vec<String> {
    let names = frame.data.get_column_names();
    manifest
        .required_for(&frame.sheet)
        .iter()
        .filter(|required| !names.iter().any(|name| name.as_str() == required.as_str()))
        .cloned()
        .collect()
}

/// Fail fast on the first sheet that lacks a required column.
///
/// Must run after header normalization: the manifest holds normalized names.
pub fn validate_schema(tables: &SourceTables, manifest: &SchemaManifest) -> Result<()> {
    for frame in tables.all() {
        let missing = missing_columns(frame, manifest);
        if !missing.is_empty() {
            return Err(IngestError::MissingColumns {
                sheet: frame.sheet.clone(),
                columns: missing,
            });
        }
    }
    Ok(())
}
