//! Anchor identifiers with no row in a joined sheet.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;

use ems_ingest::key_values;
use ems_model::{DataQualityFinding, FindingKind, FindingSeverity};

/// Distinct anchor identifiers absent from `other`.
pub fn unmatched_ids(
    anchor: &DataFrame,
    other: &DataFrame,
    id: &str,
) -> Option<BTreeSet<String>> {
    let present: BTreeSet<String> = key_values(other, id)?.into_iter().flatten().collect();
    let missing = key_values(anchor, id)?
        .into_iter()
        .flatten()
        .filter(|key| !present.contains(key))
        .collect();
    Some(missing)
}

pub fn audit_unmatched(
    table: &str,
    anchor: &DataFrame,
    other: &DataFrame,
    id: &str,
) -> Option<DataQualityFinding> {
    let missing = unmatched_ids(anchor, other, id)?;
    if missing.is_empty() {
        return None;
    }
    Some(DataQualityFinding {
        kind: FindingKind::UnmatchedIdentifier,
        severity: FindingSeverity::Info,
        table: table.to_string(),
        column: Some(id.to_string()),
        count: missing.len() as u64,
        message: format!("{} incidents have no {table} row", missing.len()),
    })
}
