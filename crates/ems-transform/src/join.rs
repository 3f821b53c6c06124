//! Left joins anchored on the incident-times table.

use std::collections::{HashMap, HashSet};

use polars::prelude::{DataFrame, IdxCa, IdxSize, NewChunkedArray};
use tracing::{debug, info};

use ems_ingest::key_values;

use crate::error::{Result, TransformError};

/// Left-join `right` onto `left` by `key`.
///
/// Every left row is kept in its original order. A left row matching `n`
/// right rows appears `n` times; a left row with no match, or with a null
/// key, gets nulls for the right-hand columns. The right key column is
/// dropped; other right columns whose names already exist on the left are
/// renamed `<name>_<suffix>`.
pub fn left_join(
    left: &DataFrame,
    right: &DataFrame,
    key: &str,
    suffix: &str,
) -> Result<DataFrame> {
    let left_keys =
        key_values(left, key).ok_or_else(|| TransformError::column_not_found("left table", key))?;
    let right_keys = key_values(right, key)
        .ok_or_else(|| TransformError::column_not_found(suffix, key))?;

    let mut right_index: HashMap<&str, Vec<IdxSize>> = HashMap::new();
    for (idx, value) in right_keys.iter().enumerate() {
        if let Some(value) = value {
            right_index
                .entry(value.as_str())
                .or_default()
                .push(idx as IdxSize);
        }
    }

    let mut left_take: Vec<IdxSize> = Vec::with_capacity(left.height());
    let mut right_take: Vec<Option<IdxSize>> = Vec::with_capacity(left.height());
    for (idx, value) in left_keys.iter().enumerate() {
        match value.as_deref().and_then(|value| right_index.get(value)) {
            Some(rows) => {
                for &row in rows {
                    left_take.push(idx as IdxSize);
                    right_take.push(Some(row));
                }
            }
            None => {
                left_take.push(idx as IdxSize);
                right_take.push(None);
            }
        }
    }

    let left_idx = IdxCa::from_vec("left".into(), left_take);
    let right_idx = IdxCa::from_slice_options("right".into(), &right_take);
    let mut joined = left.take(&left_idx)?;
    let mut right_rows = right.drop(key)?.take(&right_idx)?;

    let existing: HashSet<String> = joined
        .get_column_names()
        .iter()
        .map(ToString::to_string)
        .collect();
    let renamed: Vec<String> = right_rows
        .get_column_names()
        .iter()
        .map(|name| {
            if existing.contains(name.as_str()) {
                format!("{name}_{suffix}")
            } else {
                name.to_string()
            }
        })
        .collect();
    right_rows.set_column_names(renamed.iter().map(String::as_str))?;

    joined.hstack_mut(right_rows.get_columns())?;
    debug!(
        table = suffix,
        left_rows = left.height(),
        joined_rows = joined.height(),
        "left join"
    );
    Ok(joined)
}

/// Right-hand tables joined onto the anchor, in join order.
pub struct JoinInputs<'a> {
    pub cardiac_arrest: &'a DataFrame,
    pub aggregated_vitals: &'a DataFrame,
    pub patient: &'a DataFrame,
    pub response: &'a DataFrame,
}

/// Anchor on incident times and left-join the other four tables in order.
pub fn join_sources(
    incident_times: &DataFrame,
    inputs: &JoinInputs<'_>,
    key: &str,
) -> Result<DataFrame> {
    let steps: [(&DataFrame, &str); 4] = [
        (inputs.cardiac_arrest, "arrest"),
        (inputs.aggregated_vitals, "vitals"),
        (inputs.patient, "patient"),
        (inputs.response, "response"),
    ];
    let mut combined = incident_times.clone();
    for (right, suffix) in steps {
        combined = left_join(&combined, right, key, suffix)?;
    }
    info!(
        anchor_rows = incident_times.height(),
        combined_rows = combined.height(),
        columns = combined.width(),
        "sources joined"
    );
    Ok(combined)
}
