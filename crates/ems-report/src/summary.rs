//! The summary report assembled from the combined record and clean view.

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

use ems_model::columns::{AGE_GROUP, CLEANED_RACE, INTERVAL_COLUMNS};
use ems_model::{ColumnNames, QualityReport};

use crate::cohort::{CohortSizes, Cohorts};
use crate::completeness::{CompletenessRow, completeness_by_age_group};
use crate::counts::{CountTable, counts_by, counts_by_age_group, multi_select_counts};
use crate::error::Result;
use crate::stats::{IntervalStats, interval_stats};

/// Fingerprints that identify the run's input and main output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Digests {
    pub workbook_sha256: Option<String>,
    pub combined_csv_sha256: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub cohorts: CohortSizes,
    /// Demographic and intervention counts over cardiac-arrest cases.
    pub age_groups: CountTable,
    pub gender: CountTable,
    pub race: CountTable,
    pub interventions: CountTable,
    /// Duration statistics over clean cardiac-arrest cases.
    pub intervals: Vec<IntervalStats>,
    /// Completeness of key columns by age bracket over all incidents.
    pub completeness: Vec<CompletenessRow>,
    pub quality: QualityReport,
    pub digests: Digests,
}

/// Build every summary table.
pub fn build_summary(
    combined: &DataFrame,
    clean: &DataFrame,
    columns: &ColumnNames,
    quality: QualityReport,
) -> Result<SummaryReport> {
    let cohorts = Cohorts::select(combined, clean, &columns.cardiac_arrest)?;
    let arrest = &cohorts.cardiac_arrest;

    let age_groups = counts_by_age_group(arrest, AGE_GROUP, "Age group")?;
    let gender = counts_by(arrest, &columns.gender, "Gender")?;
    let race = counts_by(arrest, CLEANED_RACE, "Race/ethnicity")?;
    let interventions = multi_select_counts(arrest, &columns.resuscitation, "Resuscitation")?;

    let intervals = INTERVAL_COLUMNS
        .iter()
        .map(|column| interval_stats(&cohorts.clean_cardiac_arrest, column))
        .collect::<Result<Vec<_>>>()?;

    let mut key_columns: Vec<&str> = vec![columns.gender.as_str(), CLEANED_RACE];
    key_columns.extend(INTERVAL_COLUMNS);
    let completeness = completeness_by_age_group(&cohorts.all, AGE_GROUP, &key_columns)?;

    let sizes = cohorts.sizes();
    info!(
        incidents = sizes.all,
        clean = sizes.clean,
        cardiac_arrest = sizes.cardiac_arrest,
        clean_cardiac_arrest = sizes.clean_cardiac_arrest,
        "summary built"
    );
    Ok(SummaryReport {
        cohorts: sizes,
        age_groups,
        gender,
        race,
        interventions,
        intervals,
        completeness,
        quality,
        digests: Digests::default(),
    })
}
