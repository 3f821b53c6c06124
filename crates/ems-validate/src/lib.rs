//! Data-quality audits for the EMS incident pipeline.
//!
//! Audits never fail the run. Each check returns [`DataQualityFinding`]s that
//! are collected into a [`QualityReport`] for review alongside the summaries.

pub mod checks;

use std::collections::BTreeMap;

use tracing::{debug, info};

use ems_ingest::SourceTables;
use ems_model::{DataQualityFinding, FindingKind, FindingSeverity, PipelineConfig, QualityReport};
use ems_transform::{CoercionWarning, TransformOutput, UnitConversionWarning};

pub use checks::duplicates::audit_duplicate_ids;
pub use checks::intervals::{IntervalCounts, audit_intervals, interval_counts};
pub use checks::missing::{audit_missing, missing_ratios};
pub use checks::unmatched::{audit_unmatched, unmatched_ids};

/// Table name used for findings on the joined output.
pub const COMBINED_TABLE: &str = "Combined Record";

/// Run every audit over the source sheets and the transformation output.
pub fn audit_quality(
    tables: &SourceTables,
    output: &TransformOutput,
    config: &PipelineConfig,
) -> QualityReport {
    let id = config.columns.incident_id.as_str();
    let mut report = QualityReport::default();

    // Vitals legitimately repeat identifiers.
    for frame in [
        &tables.incident_times,
        &tables.cardiac_arrest,
        &tables.patient,
        &tables.response,
    ] {
        report.extend(audit_duplicate_ids(&frame.sheet, &frame.data, id));
    }

    let anchor = &tables.incident_times.data;
    for frame in [
        &tables.cardiac_arrest,
        &tables.vitals,
        &tables.patient,
        &tables.response,
    ] {
        report.extend(audit_unmatched(&frame.sheet, anchor, &frame.data, id));
    }

    report.extend(audit_missing(
        COMBINED_TABLE,
        &output.combined,
        config.thresholds.missing_ratio,
    ));
    report.extend(audit_intervals(
        COMBINED_TABLE,
        &output.combined,
        config.thresholds.max_interval_minutes,
    ));
    report.extend(coercion_findings(
        &tables.vitals.sheet,
        &output.coercion_warnings,
    ));
    report.extend(age_findings(&tables.patient.sheet, &output.age_warnings));

    for finding in &report.findings {
        debug!(
            kind = %finding.kind,
            table = %finding.table,
            count = finding.count,
            "{}",
            finding.message
        );
    }
    info!(
        findings = report.findings.len(),
        warnings = report.warning_count(),
        "data-quality audit complete"
    );
    report
}

pub fn coercion_findings(table: &str, warnings: &[CoercionWarning]) -> Vec<DataQualityFinding> {
    warnings
        .iter()
        .map(|warning| DataQualityFinding {
            kind: FindingKind::NumericCoercion,
            severity: FindingSeverity::Info,
            table: table.to_string(),
            column: Some(warning.column.clone()),
            count: warning.count as u64,
            message: format!(
                "{} non-numeric values set to null (e.g. {})",
                warning.count,
                warning.examples.join(", ")
            ),
        })
        .collect()
}

/// One finding per distinct conversion failure.
pub fn age_findings(table: &str, warnings: &[UnitConversionWarning]) -> Vec<DataQualityFinding> {
    let mut grouped: BTreeMap<String, u64> = BTreeMap::new();
    for warning in warnings {
        *grouped.entry(warning.to_string()).or_insert(0) += 1;
    }
    grouped
        .into_iter()
        .map(|(reason, count)| DataQualityFinding {
            kind: FindingKind::AgeConversion,
            severity: FindingSeverity::Info,
            table: table.to_string(),
            column: None,
            count,
            message: format!("{count} rows: {reason}"),
        })
        .collect()
}
