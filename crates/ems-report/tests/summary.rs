//! Summary tables over a small combined record.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};

use ems_model::columns::{AGE_GROUP, BACK_IN_SERVICE_TIME, CLEANED_RACE, ON_SCENE_TIME, RESPONSE_TIME};
use ems_model::{ColumnNames, QualityReport};
use ems_report::{build_summary, csv_bytes, sha256_bytes, write_csv, write_json};
use ems_transform::clean_view;

fn combined(columns: &ColumnNames) -> DataFrame {
    DataFrame::new(vec![
        Series::new(
            columns.incident_id.as_str().into(),
            vec!["PCR-1", "PCR-2", "PCR-3", "PCR-4", "PCR-5"],
        )
        .into_column(),
        Series::new(
            columns.cardiac_arrest.as_str().into(),
            vec![
                "Yes, After EMS Arrival",
                "Yes, Prior to EMS Arrival",
                "No",
                "Yes, Prior to EMS Arrival",
                "Yes, After EMS Arrival",
            ],
        )
        .into_column(),
        Series::new(
            columns.gender.as_str().into(),
            vec![Some("Female"), Some("Male"), Some("Female"), None, Some("Male")],
        )
        .into_column(),
        Series::new(
            CLEANED_RACE.into(),
            vec!["White", "White", "Asian", "Other", "Black or African American"],
        )
        .into_column(),
        Series::new(
            AGE_GROUP.into(),
            vec![Some("65–74"), Some("45–64"), Some("18–24"), None, Some("75 and older")],
        )
        .into_column(),
        Series::new(
            columns.resuscitation.as_str().into(),
            vec![
                Some("Attempted Defibrillation, Attempted Ventilation"),
                Some("Attempted Ventilation"),
                None,
                None,
                Some("Attempted Ventilation, Initiated Chest Compressions"),
            ],
        )
        .into_column(),
        Series::new(RESPONSE_TIME.into(), vec![8.0, 6.0, 5.0, -2.0, 10.0]).into_column(),
        Series::new(ON_SCENE_TIME.into(), vec![20.0, 15.0, 10.0, 10.0, 25.0]).into_column(),
        Series::new(BACK_IN_SERVICE_TIME.into(), vec![30.0, 25.0, 20.0, 10.0, 40.0])
            .into_column(),
    ])
    .unwrap()
}

fn summary() -> ems_report::SummaryReport {
    let columns = ColumnNames::default();
    let df = combined(&columns);
    let clean = clean_view(&df, 1440.0).unwrap();
    build_summary(&df, &clean, &columns, QualityReport::default()).unwrap()
}

#[test]
fn cohort_sizes() {
    let report = summary();
    assert_eq!(report.cohorts.all, 5);
    assert_eq!(report.cohorts.clean, 4);
    assert_eq!(report.cohorts.cardiac_arrest, 4);
    assert_eq!(report.cohorts.clean_cardiac_arrest, 3);
}

#[test]
fn age_group_table_lists_brackets_in_order() {
    let report = summary();
    let table = &report.age_groups;
    let rows: Vec<serde_json::Value> = table
        .rows
        .iter()
        .map(|row| serde_json::json!({ "count": row.count, "label": row.label }))
        .collect();
    insta::assert_json_snapshot!(rows, @r#"
    [
      {
        "count": 0,
        "label": "Younger than 18"
      },
      {
        "count": 0,
        "label": "18–24"
      },
      {
        "count": 0,
        "label": "25–44"
      },
      {
        "count": 1,
        "label": "45–64"
      },
      {
        "count": 1,
        "label": "65–74"
      },
      {
        "count": 1,
        "label": "75 and older"
      },
      {
        "count": 1,
        "label": "Unknown"
      }
    ]
    "#);
    assert_eq!(table.total, 4);
    assert!(table.rows.iter().all(|row| row.percent == row.count as f64 * 25.0));
}

#[test]
fn demographic_counts_order_by_frequency() {
    let report = summary();
    let gender: Vec<(&str, usize)> = report
        .gender
        .rows
        .iter()
        .map(|row| (row.label.as_str(), row.count))
        .collect();
    assert_eq!(gender, vec![("Male", 2), ("Female", 1), ("Unknown", 1)]);

    let race: Vec<&str> = report.race.rows.iter().map(|row| row.label.as_str()).collect();
    assert_eq!(race, vec!["White", "Black or African American", "Other"]);
}

#[test]
fn interventions_split_multi_select_lists() {
    let report = summary();
    let table = &report.interventions;
    assert_eq!(table.total, 4);
    assert_eq!(table.count_of("Attempted Ventilation"), Some(3));
    assert_eq!(table.count_of("Attempted Defibrillation"), Some(1));
    assert_eq!(table.count_of("Initiated Chest Compressions"), Some(1));
    assert_eq!(table.count_of("Unknown"), Some(1));
    assert_eq!(table.rows[0].percent, 75.0);
}

#[test]
fn interval_percentiles_use_clean_arrest_cases() {
    let report = summary();
    let response = &report.intervals[0];
    assert_eq!(response.column, RESPONSE_TIME);
    // Clean cardiac-arrest responses: 6, 8, 10.
    assert_eq!(response.n, 3);
    assert_eq!(response.mean, Some(8.0));
    assert_eq!(response.p50, Some(8.0));
    assert!((response.p10.unwrap() - 6.4).abs() < 1e-9);
    assert!((response.p90.unwrap() - 9.6).abs() < 1e-9);
}

#[test]
fn completeness_reports_unknown_bracket_last() {
    let report = summary();
    let labels: Vec<&str> = report
        .completeness
        .iter()
        .map(|row| row.age_group.as_str())
        .collect();
    assert_eq!(labels, vec!["18–24", "45–64", "65–74", "75 and older", "Unknown"]);
    let unknown = report.completeness.last().unwrap();
    assert_eq!(unknown.n, 1);
    assert_eq!(unknown.columns[0].percent, 0.0);
    assert_eq!(unknown.columns[1].percent, 100.0);
}

#[test]
fn exports_are_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let columns = ColumnNames::default();
    let mut df = combined(&columns);

    let first = write_csv(&mut df, &dir.path().join("combined.csv")).unwrap();
    let second = csv_bytes(&mut df).unwrap();
    assert_eq!(sha256_bytes(&first), sha256_bytes(&second));
    let text = String::from_utf8(first).unwrap();
    assert!(text.starts_with("Patient Care Report Number,"));
    assert_eq!(text.lines().count(), 6);

    let json_path = dir.path().join("summary.json");
    write_json(&summary(), &json_path).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["cohorts"]["cardiac_arrest"], 4);
    assert_eq!(value["age_groups"]["rows"][0]["label"], "Younger than 18");
}
