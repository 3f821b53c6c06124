//! Transformation stages chained from the loaded sheets to the clean view.

use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{info, info_span};

use ems_ingest::SourceTables;
use ems_model::PipelineConfig;

use crate::derive::{UnitConversionWarning, derive_fields};
use crate::error::Result;
use crate::intervals::{clean_view, compute_intervals};
use crate::join::{JoinInputs, join_sources};
use crate::temporal::convert_time_columns;
use crate::vitals::{CoercionWarning, aggregate_vitals, coerce_numeric};

/// Every table produced by [`transform`], plus recovered warnings.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Incident times joined with the other sheets, with derived columns.
    pub combined: DataFrame,
    /// Rows of `combined` whose three intervals are plausible.
    pub clean: DataFrame,
    pub aggregated_vitals: DataFrame,
    pub coercion_warnings: Vec<CoercionWarning>,
    pub age_warnings: Vec<UnitConversionWarning>,
}

/// Run every transformation stage over header-normalized source tables.
pub fn transform(tables: &SourceTables, config: &PipelineConfig) -> Result<TransformOutput> {
    let columns = &config.columns;
    let marker = columns.time_marker.as_str();

    let (aggregated_vitals, coercion_warnings) =
        info_span!("vitals").in_scope(|| -> Result<_> {
            let start = Instant::now();
            let vitals = convert_time_columns(&tables.vitals.data, marker)?;
            let (vitals, warnings) = coerce_numeric(&vitals, &columns.vitals_numeric)?;
            let aggregated =
                aggregate_vitals(&vitals, &columns.incident_id, &columns.vitals_taken, marker)?;
            info!(
                input_rows = vitals.height(),
                output_rows = aggregated.height(),
                coerced_columns = warnings.len(),
                duration_ms = start.elapsed().as_millis(),
                "vitals aggregated"
            );
            Ok((aggregated, warnings))
        })?;

    let combined = info_span!("join").in_scope(|| -> Result<DataFrame> {
        let inputs = JoinInputs {
            cardiac_arrest: &tables.cardiac_arrest.data,
            aggregated_vitals: &aggregated_vitals,
            patient: &tables.patient.data,
            response: &tables.response.data,
        };
        let joined = join_sources(&tables.incident_times.data, &inputs, &columns.incident_id)?;
        convert_time_columns(&joined, marker)
    })?;

    let (combined, age_warnings) = info_span!("derive").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let derived = derive_fields(&combined, columns)?;
        let data = compute_intervals(&derived.data, columns)?;
        info!(
            rows = data.height(),
            age_warnings = derived.warnings.len(),
            duration_ms = start.elapsed().as_millis(),
            "derived fields computed"
        );
        Ok((data, derived.warnings))
    })?;

    let clean = info_span!("clean_view")
        .in_scope(|| clean_view(&combined, config.thresholds.max_interval_minutes))?;

    Ok(TransformOutput {
        combined,
        clean,
        aggregated_vitals,
        coercion_warnings,
        age_warnings,
    })
}
