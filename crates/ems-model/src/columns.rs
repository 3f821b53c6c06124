//! Names of columns added to the combined record by the pipeline.

pub const PATIENT_AGE_YEARS: &str = "Patient_Age_Years";
pub const AGE_GROUP: &str = "Age_Group";
pub const CLEANED_RACE: &str = "Cleaned_Race";

/// Dispatch notified to arrival on scene, in minutes.
pub const RESPONSE_TIME: &str = "response_time";
/// Arrival on scene to scene departure, in minutes.
pub const ON_SCENE_TIME: &str = "on_scene_time";
/// Scene departure to back in service, in minutes.
pub const BACK_IN_SERVICE_TIME: &str = "back_in_service_time";

/// All duration columns in the order they are computed.
pub const INTERVAL_COLUMNS: [&str; 3] = [RESPONSE_TIME, ON_SCENE_TIME, BACK_IN_SERVICE_TIME];

pub const MEAN_SUFFIX: &str = "_mean";
pub const MIN_SUFFIX: &str = "_min";
pub const MAX_SUFFIX: &str = "_max";

/// Name of the aggregate column for a vitals field.
pub fn aggregate_column(field: &str, suffix: &str) -> String {
    format!("{field}{suffix}")
}
