//! Duplicate identifier check.
//!
//! Sheets other than vitals are expected to hold one row per incident. A
//! repeated identifier fans out the combined record on join.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;

use ems_ingest::key_values;
use ems_model::{DataQualityFinding, FindingKind, FindingSeverity};

/// One finding when any identifier appears on more than one row.
pub fn audit_duplicate_ids(table: &str, df: &DataFrame, id: &str) -> Option<DataQualityFinding> {
    let keys = key_values(df, id)?;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for key in keys.into_iter().flatten() {
        *counts.entry(key).or_insert(0) += 1;
    }
    let duplicated = counts.values().filter(|&&count| count > 1).count();
    if duplicated == 0 {
        return None;
    }
    let extra_rows: usize = counts
        .values()
        .filter(|&&count| count > 1)
        .map(|count| count - 1)
        .sum();
    Some(DataQualityFinding {
        kind: FindingKind::DuplicateIdentifier,
        severity: FindingSeverity::Warning,
        table: table.to_string(),
        column: Some(id.to_string()),
        count: duplicated as u64,
        message: format!("{duplicated} identifiers appear more than once ({extra_rows} extra rows)"),
    })
}
