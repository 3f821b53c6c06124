//! EMS summary reporting.
//!
//! - **cohort**: all incidents, clean view, cardiac-arrest cases
//! - **counts**: grouped counts with percentages
//! - **stats**: interval means and percentiles
//! - **completeness**: missingness by age bracket
//! - **export**: CSV and JSON output
//! - **digest**: SHA-256 fingerprints for run comparison

pub mod cohort;
pub mod completeness;
pub mod counts;
pub mod digest;
pub mod error;
pub mod export;
pub mod stats;
pub mod summary;

pub use cohort::{CohortSizes, Cohorts, cardiac_arrest_cases, is_cardiac_arrest};
pub use completeness::{ColumnCompleteness, CompletenessRow, completeness_by_age_group};
pub use counts::{
    CountRow, CountTable, UNKNOWN_LABEL, counts_by, counts_by_age_group, multi_select_counts,
};
pub use digest::{sha256_bytes, sha256_file};
pub use error::{ReportError, Result};
pub use export::{csv_bytes, write_csv, write_json};
pub use stats::{IntervalStats, interval_stats, percentile};
pub use summary::{Digests, SummaryReport, build_summary};
