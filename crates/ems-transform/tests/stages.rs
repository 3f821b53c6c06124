//! Vitals aggregation, joins and the interval filter.

use polars::prelude::{DataFrame, DataType, IntoColumn, NamedFrom, Series};

use ems_model::columns::{BACK_IN_SERVICE_TIME, ON_SCENE_TIME, RESPONSE_TIME};
use ems_model::ColumnNames;
use ems_transform::{
    aggregate_vitals, clean_view, coerce_numeric, compute_intervals, is_plausible, left_join,
    minutes_between,
};

const ID: &str = "Patient Care Report Number";
const TAKEN: &str = "Vitals Signs Taken Date Time (eVitals.01)";
const SBP: &str = "Vitals Systolic Blood Pressure SBP (eVitals.06)";
const PULSE: &str = "Vitals Heart Rate (eVitals.10)";

fn vitals_frame() -> DataFrame {
    DataFrame::new(vec![
        Series::new(ID.into(), vec![Some("B"), Some("A"), Some("A"), Some("A"), None])
            .into_column(),
        Series::new(
            TAKEN.into(),
            vec![Some(44592.6), None, Some(44592.51), Some(44592.50), Some(44592.7)],
        )
        .into_column(),
        Series::new(
            SBP.into(),
            vec![Some("90"), Some("120"), Some("Not Recorded"), Some("140"), Some("100")],
        )
        .into_column(),
        Series::new(PULSE.into(), vec![None::<f64>, None, None, None, None]).into_column(),
    ])
    .unwrap()
}

#[test]
fn coercion_counts_text_values() {
    let (coerced, warnings) =
        coerce_numeric(&vitals_frame(), &[SBP.to_string(), "Absent".to_string()]).unwrap();
    assert_eq!(coerced.column(SBP).unwrap().dtype(), &DataType::Float64);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].column, SBP);
    assert_eq!(warnings[0].count, 1);
    assert_eq!(warnings[0].examples, vec!["Not Recorded".to_string()]);
}

#[test]
fn vitals_collapse_to_one_row_per_incident() {
    let (coerced, _) = coerce_numeric(&vitals_frame(), &[SBP.to_string()]).unwrap();
    let aggregated = aggregate_vitals(&coerced, ID, TAKEN, "Date Time").unwrap();

    // Null identifiers are dropped; groups come out in identifier order.
    assert_eq!(aggregated.height(), 2);
    let ids = aggregated.column(ID).unwrap().str().unwrap();
    assert_eq!(ids.get(0), Some("A"));
    assert_eq!(ids.get(1), Some("B"));

    // A: [120, null, 140]
    let mean = aggregated.column(&format!("{SBP}_mean")).unwrap().f64().unwrap();
    let min = aggregated.column(&format!("{SBP}_min")).unwrap().f64().unwrap();
    let max = aggregated.column(&format!("{SBP}_max")).unwrap().f64().unwrap();
    assert_eq!(mean.get(0), Some(130.0));
    assert_eq!(min.get(0), Some(120.0));
    assert_eq!(max.get(0), Some(140.0));
    assert_eq!(mean.get(1), Some(90.0));

    // All-null field aggregates to null without failing.
    let pulse = aggregated.column(&format!("{PULSE}_mean")).unwrap().f64().unwrap();
    assert_eq!(pulse.get(0), None);
    assert_eq!(pulse.get(1), None);

    // First non-null timestamp in row order, not the earliest.
    let taken = aggregated.column(TAKEN).unwrap();
    assert!(matches!(taken.dtype(), DataType::Datetime(_, _)));
    let first = ems_transform::column_millis(taken).unwrap();
    assert_eq!(first[0], ems_transform::serial_to_millis(44592.51));
    assert_eq!(first[1], ems_transform::serial_to_millis(44592.6));

    // The time column itself is not aggregated.
    assert!(aggregated.column(&format!("{TAKEN}_mean")).is_err());
}

#[test]
fn left_join_keeps_anchor_rows_and_fans_out() {
    let left = DataFrame::new(vec![
        Series::new(ID.into(), vec![Some("1"), Some("2"), None, Some("3")]).into_column(),
        Series::new("Status".into(), vec!["a", "b", "c", "d"]).into_column(),
    ])
    .unwrap();
    let right = DataFrame::new(vec![
        Series::new(ID.into(), vec![Some("2"), Some("1"), Some("2"), None]).into_column(),
        Series::new("Status".into(), vec!["x", "y", "z", "w"]).into_column(),
        Series::new("Gender".into(), vec!["F", "M", "F", "M"]).into_column(),
    ])
    .unwrap();

    let joined = left_join(&left, &right, ID, "patient").unwrap();
    // Identifier 2 matches twice; the null key and "3" stay unmatched.
    assert_eq!(joined.height(), 5);
    let ids: Vec<Option<&str>> = joined.column(ID).unwrap().str().unwrap().into_iter().collect();
    assert_eq!(ids, vec![Some("1"), Some("2"), Some("2"), None, Some("3")]);

    let status = joined.column("Status").unwrap().str().unwrap();
    assert_eq!(status.get(1), Some("b"));
    let right_status = joined.column("Status_patient").unwrap().str().unwrap();
    let values: Vec<Option<&str>> = right_status.into_iter().collect();
    assert_eq!(values, vec![Some("y"), Some("x"), Some("z"), None, None]);

    let gender = joined.column("Gender").unwrap();
    assert_eq!(gender.null_count(), 2);
}

fn interval_frame(arrived: Vec<Option<f64>>) -> DataFrame {
    // Serial day fractions: 1 minute = 1/1440 day.
    let minute = 1.0 / 1440.0;
    let notified = vec![Some(100.0), Some(100.0), Some(100.0), Some(100.0)];
    let left: Vec<Option<f64>> = arrived
        .iter()
        .map(|value| value.map(|v| v + 10.0 * minute).or(Some(100.5)))
        .collect();
    let back: Vec<Option<f64>> = left.iter().map(|value| value.map(|v| v + 30.0 * minute)).collect();
    let columns = ColumnNames::default();
    DataFrame::new(vec![
        Series::new(ID.into(), vec!["1", "2", "3", "4"]).into_column(),
        Series::new(columns.dispatch_notified.as_str().into(), notified).into_column(),
        Series::new(columns.arrived_on_scene.as_str().into(), arrived).into_column(),
        Series::new(columns.left_scene.as_str().into(), left).into_column(),
        Series::new(columns.back_in_service.as_str().into(), back).into_column(),
    ])
    .unwrap()
}

#[test]
fn interval_filter_bounds() {
    let minute = 1.0 / 1440.0;
    let frame = interval_frame(vec![
        Some(100.0 - 5.0 * minute),
        Some(101.0),
        None,
        Some(100.0 + 8.0 * minute),
    ]);
    let with_intervals = compute_intervals(&frame, &ColumnNames::default()).unwrap();
    let response = with_intervals.column(RESPONSE_TIME).unwrap().f64().unwrap();
    let response: Vec<Option<f64>> = response.into_iter().map(|v| v.map(f64::round)).collect();
    assert_eq!(response, vec![Some(-5.0), Some(1440.0), None, Some(8.0)]);
    assert_eq!(
        with_intervals.column(ON_SCENE_TIME).unwrap().null_count(),
        1
    );
    assert_eq!(
        with_intervals
            .column(BACK_IN_SERVICE_TIME)
            .unwrap()
            .f64()
            .unwrap()
            .get(3)
            .map(f64::round),
        Some(30.0)
    );

    let clean = clean_view(&with_intervals, 1440.0).unwrap();
    let ids: Vec<Option<&str>> = clean.column(ID).unwrap().str().unwrap().into_iter().collect();
    // -5 is excluded, exactly 1440 is kept, a null arrival is excluded.
    assert_eq!(ids, vec![Some("2"), Some("4")]);
    assert_eq!(with_intervals.height(), 4);
}

#[test]
fn plausibility_predicate() {
    assert!(is_plausible(Some(0.0), 1440.0));
    assert!(is_plausible(Some(1440.0), 1440.0));
    assert!(!is_plausible(Some(1440.01), 1440.0));
    assert!(!is_plausible(Some(-0.5), 1440.0));
    assert!(!is_plausible(None, 1440.0));
    assert_eq!(minutes_between(Some(0), Some(90_000)), Some(1.5));
    assert_eq!(minutes_between(None, Some(90_000)), None);
}
