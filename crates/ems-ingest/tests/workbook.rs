//! Integration tests for workbook loading and schema validation.

use std::path::{Path, PathBuf};

use polars::prelude::DataType;
use rust_xlsxwriter::Workbook;

use ems_ingest::{IngestError, load_workbook, normalize_headers, validate_schema};
use ems_model::{PipelineConfig, SheetNames};

enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Empty,
}

fn write_sheet(workbook: &mut Workbook, name: &str, rows: &[Vec<Cell<'_>>]) {
    let sheet = workbook.add_worksheet();
    sheet.set_name(name).unwrap();
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            match cell {
                Cell::Text(value) => {
                    sheet.write_string(r, c, *value).unwrap();
                }
                Cell::Number(value) => {
                    sheet.write_number(r, c, *value).unwrap();
                }
                Cell::Empty => {}
            }
        }
    }
}

fn minimal_workbook(dir: &Path, skip_sheet: Option<&str>) -> PathBuf {
    use Cell::{Empty, Number, Text};

    let config = PipelineConfig::default();
    let c = &config.columns;
    let mut workbook = Workbook::new();
    let sheets: Vec<(&str, Vec<Vec<Cell<'_>>>)> = vec![
        (
            "Incident Times",
            vec![
                vec![
                    Text(&c.incident_id),
                    Text(&c.dispatch_notified),
                    Text(&c.arrived_on_scene),
                    Text(&c.left_scene),
                    Text(&c.back_in_service),
                ],
                vec![
                    Text("PCR-1"),
                    Number(44592.5),
                    Number(44592.505),
                    Number(44592.52),
                    Number(44592.55),
                ],
                vec![Empty, Empty, Empty, Empty, Empty],
                vec![
                    Text("PCR-2"),
                    Number(44593.0),
                    Empty,
                    Number(44593.1),
                    Number(44593.2),
                ],
            ],
        ),
        (
            "Cardiac Arrest",
            vec![
                vec![
                    Text(&c.incident_id),
                    Text(&c.cardiac_arrest),
                    Text(&c.resuscitation),
                ],
                vec![
                    Text("PCR-1"),
                    Text("Yes, After EMS Arrival"),
                    Text("Attempted Defibrillation"),
                ],
            ],
        ),
        (
            "Vitals",
            vec![
                vec![
                    Text(&c.incident_id),
                    Text(&c.vitals_taken),
                    Text(&c.vitals_numeric[0]),
                    Text(&c.vitals_numeric[1]),
                    Text(&c.vitals_numeric[2]),
                ],
                vec![
                    Text("PCR-1"),
                    Number(44592.51),
                    Number(120.0),
                    Text("Not Recorded"),
                    Number(16.0),
                ],
                vec![
                    Text("PCR-1"),
                    Number(44592.52),
                    Number(140.0),
                    Number(88.0),
                    Number(18.0),
                ],
            ],
        ),
        (
            "Patient",
            vec![
                vec![
                    Text(&c.incident_id),
                    Text(&c.age),
                    Text(&c.age_units),
                    Text(&c.gender),
                    Text(&c.race),
                ],
                vec![
                    Text("PCR-1"),
                    Number(67.0),
                    Text("Years"),
                    Text("Female"),
                    Text("White"),
                ],
            ],
        ),
        (
            "Response",
            vec![
                vec![Text(&c.incident_id), Text("Response Mode To Scene (eResponse.23)")],
                vec![Text("PCR-1"), Text("Emergent")],
            ],
        ),
    ];
    for (name, rows) in &sheets {
        if Some(*name) == skip_sheet {
            continue;
        }
        write_sheet(&mut workbook, name, rows);
    }
    let path = dir.join("ems.xlsx");
    workbook.save(&path).unwrap();
    path
}

#[test]
fn loads_all_sheets_preserving_rows_and_types() {
    let dir = tempfile::tempdir().unwrap();
    let path = minimal_workbook(dir.path(), None);
    let tables = load_workbook(&path, &SheetNames::default()).unwrap();

    assert_eq!(tables.incident_times.sheet, "Incident Times");
    // The blank row between the two incidents is skipped.
    assert_eq!(tables.incident_times.record_count(), 2);
    assert_eq!(tables.vitals.record_count(), 2);
    assert_eq!(tables.patient.record_count(), 1);

    let config = PipelineConfig::default();
    let times = &tables.incident_times.data;
    let notified = times.column(&config.columns.dispatch_notified).unwrap();
    assert_eq!(notified.dtype(), &DataType::Float64);
    assert_eq!(notified.f64().unwrap().get(1), Some(44593.0));
    let arrived = times.column(&config.columns.arrived_on_scene).unwrap();
    assert_eq!(arrived.f64().unwrap().get(1), None);

    let ids = times.column(&config.columns.incident_id).unwrap();
    assert_eq!(ids.str().unwrap().get(0), Some("PCR-1"));
    assert_eq!(ids.str().unwrap().get(1), Some("PCR-2"));

    // Mixed text and numbers keep the raw text.
    let heart_rate = tables
        .vitals
        .data
        .column(&config.columns.vitals_numeric[1])
        .unwrap();
    assert_eq!(heart_rate.dtype(), &DataType::String);
    assert_eq!(heart_rate.str().unwrap().get(0), Some("Not Recorded"));
    assert_eq!(heart_rate.str().unwrap().get(1), Some("88"));
}

#[test]
fn loaded_tables_satisfy_default_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let path = minimal_workbook(dir.path(), None);
    let tables = load_workbook(&path, &SheetNames::default()).unwrap();
    let tables = tables.map_all(normalize_headers).unwrap();
    validate_schema(&tables, &PipelineConfig::default().manifest()).unwrap();
}

#[test]
fn missing_file_is_source_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let error = load_workbook(&dir.path().join("absent.xlsx"), &SheetNames::default())
        .unwrap_err();
    assert!(matches!(error, IngestError::FileNotFound { .. }));
    assert!(error.is_source_read());
}

#[test]
fn missing_sheet_names_the_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = minimal_workbook(dir.path(), Some("Response"));
    let error = load_workbook(&path, &SheetNames::default()).unwrap_err();
    match &error {
        IngestError::MissingSheet { sheet, .. } => assert_eq!(sheet, "Response"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(error.to_string().contains("Response"));
}

#[test]
fn non_workbook_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ems.xlsx");
    std::fs::write(&path, "Patient Care Report Number\nPCR-1\n").unwrap();
    let error = load_workbook(&path, &SheetNames::default()).unwrap_err();
    assert!(matches!(error, IngestError::InvalidWorkbook { .. }));
}

#[test]
fn schema_validation_reports_missing_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = minimal_workbook(dir.path(), None);
    let tables = load_workbook(&path, &SheetNames::default()).unwrap();

    let mut config = PipelineConfig::default();
    config.columns.gender = "Patient Sex (ePatient.25)".to_string();
    let error = validate_schema(&tables, &config.manifest()).unwrap_err();
    match error {
        IngestError::MissingColumns { sheet, columns } => {
            assert_eq!(sheet, "Patient");
            assert_eq!(columns, vec!["Patient Sex (ePatient.25)".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn wrapped_headers_match_the_manifest_after_loading() {
    let config = PipelineConfig::default();
    let c = &config.columns;
    let dispatch = c.dispatch_notified.replace("Dispatch ", "Dispatch\r\n");
    let arrived = c.arrived_on_scene.replace("Scene ", "Scene\n");

    let dir = tempfile::tempdir().unwrap();
    let mut workbook = Workbook::new();
    for name in SheetNames::default().all() {
        let rows = if name == "Incident Times" {
            vec![
                vec![
                    Cell::Text(&c.incident_id),
                    Cell::Text(&dispatch),
                    Cell::Text(&arrived),
                    Cell::Text(&c.left_scene),
                    Cell::Text(&c.back_in_service),
                ],
                vec![Cell::Text("PCR-1"), Cell::Number(44592.5)],
            ]
        } else {
            vec![vec![Cell::Text(&c.incident_id)], vec![Cell::Text("PCR-1")]]
        };
        write_sheet(&mut workbook, name, &rows);
    }
    let path = dir.path().join("wrapped.xlsx");
    workbook.save(&path).unwrap();

    let tables = load_workbook(&path, &SheetNames::default()).unwrap();
    let raw: Vec<String> = tables
        .incident_times
        .data
        .get_column_names()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert!(raw.iter().all(|name| !name.contains("_x000D_")));

    let tables = tables.map_all(normalize_headers).unwrap();
    let times = &tables.incident_times.data;
    let notified = times.column(&c.dispatch_notified).unwrap();
    assert_eq!(notified.f64().unwrap().get(0), Some(44592.5));
    assert!(times.column(&c.arrived_on_scene).is_ok());
    let missing = ems_ingest::missing_columns(&tables.incident_times, &config.manifest());
    assert!(missing.is_empty(), "unmatched headers: {missing:?}");
}
