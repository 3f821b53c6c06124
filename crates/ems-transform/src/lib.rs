//! Transformation stages for the EMS incident pipeline.
//!
//! Every stage takes its input tables by reference and returns new ones:
//!
//! - **temporal**: spreadsheet serial date-times to UTC timestamps
//! - **vitals**: numeric coercion and per-incident aggregation
//! - **join**: left joins anchored on incident times
//! - **derive**: age in years, age bracket, cleaned race
//! - **intervals**: durations and the clean view
//! - **pipeline**: the stages chained in order

pub mod derive;
pub mod error;
pub mod intervals;
pub mod join;
pub mod pipeline;
pub mod temporal;
pub mod vitals;

pub use derive::{
    AgeGroup, AgeUnit, DerivedFrame, RaceCategory, RaceSelection, UnitConversionWarning,
    clean_race_categories, convert_age_to_years, derive_fields,
};
pub use error::{Result, TransformError};
pub use intervals::{clean_view, compute_intervals, is_plausible, minutes_between};
pub use join::{JoinInputs, join_sources, left_join};
pub use pipeline::{TransformOutput, transform};
pub use temporal::{
    SERIAL_EPOCH_MILLIS, column_millis, convert_time_columns, serial_to_datetime,
    serial_to_millis,
};
pub use vitals::{CoercionWarning, FieldStats, aggregate_vitals, coerce_numeric};
