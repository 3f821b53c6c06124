//! Pipeline stages as called by the CLI.
//!
//! Stages run in order and each one aborts the run on a fatal error:
//!
//! 1. **ingest**: load the five sheets, normalize headers, check the schema
//! 2. **transform**: vitals aggregation, joins, derived fields, clean view
//! 3. **audit**: data-quality findings (never fatal)
//! 4. **report**: summaries, exports and digests

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use ems_ingest::{
    SourceTables, identifier_as_text, load_workbook, normalize_headers, validate_schema,
};
use ems_model::PipelineConfig;
use ems_report::{
    Digests, SummaryReport, build_summary, csv_bytes, sha256_bytes, sha256_file, write_csv,
    write_json,
};
use ems_transform::{TransformOutput, transform};
use ems_validate::audit_quality;

pub const COMBINED_CSV: &str = "combined_record.csv";
pub const CLEAN_CSV: &str = "clean_view.csv";
pub const SUMMARY_JSON: &str = "summary.json";

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Load the workbook, normalize headers and identifiers, then validate the
/// schema.
pub fn ingest(workbook: &Path, config: &PipelineConfig) -> Result<SourceTables> {
    info_span!("ingest").in_scope(|| -> Result<SourceTables> {
        let start = Instant::now();
        let tables = load_workbook(workbook, &config.sheets)
            .with_context(|| format!("read workbook {}", workbook.display()))?;
        let tables = tables
            .map_all(normalize_headers)
            .context("normalize headers")?;
        let tables = tables
            .map_all(|df| identifier_as_text(df, &config.columns.incident_id))
            .context("normalize identifiers")?;
        validate_schema(&tables, &config.manifest()).context("validate schema")?;
        info!(
            sheets = tables.all().len(),
            incidents = tables.incident_times.record_count(),
            duration_ms = start.elapsed().as_millis(),
            "ingest complete"
        );
        Ok(tables)
    })
}

// ============================================================================
// Stages 2-4: Transform, audit, report
// ============================================================================

/// Files written by a run.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub combined_csv: PathBuf,
    pub clean_csv: PathBuf,
    pub summary_json: PathBuf,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub output: TransformOutput,
    pub summary: SummaryReport,
    pub exports: Option<ExportPaths>,
}

/// Run every stage over `workbook`.
///
/// With an `output_dir`, the combined record and clean view are written as
/// CSV and the summary as JSON. The digests are computed either way.
pub fn run_pipeline(
    workbook: &Path,
    config: &PipelineConfig,
    output_dir: Option<&Path>,
) -> Result<PipelineRun> {
    let run_span = info_span!("run", workbook = %workbook.display());
    let _run_guard = run_span.enter();
    let run_start = Instant::now();

    let tables = ingest(workbook, config)?;
    let mut output = transform(&tables, config).context("transform")?;
    let quality = info_span!("audit").in_scope(|| audit_quality(&tables, &output, config));
    let mut summary = info_span!("summarize")
        .in_scope(|| build_summary(&output.combined, &output.clean, &config.columns, quality))
        .context("build summary")?;

    let output_span = info_span!("output");
    let _output_guard = output_span.enter();
    let combined_csv = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create output directory {}", dir.display()))?;
            write_csv(&mut output.combined, &dir.join(COMBINED_CSV))
                .context("write combined record")?
        }
        None => csv_bytes(&mut output.combined).context("render combined record")?,
    };
    summary.digests = Digests {
        workbook_sha256: Some(sha256_file(workbook).context("hash workbook")?),
        combined_csv_sha256: Some(sha256_bytes(&combined_csv)),
    };

    let exports = match output_dir {
        Some(dir) => {
            let paths = ExportPaths {
                combined_csv: dir.join(COMBINED_CSV),
                clean_csv: dir.join(CLEAN_CSV),
                summary_json: dir.join(SUMMARY_JSON),
            };
            write_csv(&mut output.clean, &paths.clean_csv).context("write clean view")?;
            write_json(&summary, &paths.summary_json).context("write summary")?;
            Some(paths)
        }
        None => None,
    };

    info!(
        incidents = output.combined.height(),
        clean = output.clean.height(),
        findings = summary.quality.findings.len(),
        duration_ms = run_start.elapsed().as_millis(),
        "run complete"
    );
    Ok(PipelineRun {
        output,
        summary,
        exports,
    })
}
