//! Tests for pipeline configuration loading.

use std::io::Write;

use ems_model::{ConfigError, PipelineConfig};

#[test]
fn defaults_are_valid() {
    let config = PipelineConfig::default();
    config.validate().unwrap();
    assert_eq!(config.sheets.vitals, "Vitals");
    assert_eq!(config.columns.incident_id, "Patient Care Report Number");
    assert_eq!(config.columns.vitals_numeric.len(), 3);
    assert_eq!(config.thresholds.max_interval_minutes, 1440.0);
}

#[test]
fn empty_document_uses_defaults() {
    let config = PipelineConfig::from_toml_str("").unwrap();
    assert_eq!(config, PipelineConfig::default());
}

#[test]
fn partial_sections_override_only_named_fields() {
    let config = PipelineConfig::from_toml_str(
        r#"
        workbook = "data/ems.xlsx"

        [sheets]
        vitals = "Vital Signs"

        [thresholds]
        missing_ratio = 0.35
        "#,
    )
    .unwrap();
    assert_eq!(config.sheets.vitals, "Vital Signs");
    assert_eq!(config.sheets.patient, "Patient");
    assert_eq!(config.thresholds.missing_ratio, 0.35);
    assert_eq!(config.thresholds.max_interval_minutes, 1440.0);
    assert_eq!(
        config.workbook.as_deref(),
        Some(std::path::Path::new("data/ems.xlsx"))
    );
}

#[test]
fn unknown_keys_are_rejected() {
    let error = PipelineConfig::from_toml_str("[sheets]\nvital = \"Vitals\"\n").unwrap_err();
    assert!(matches!(error, ConfigError::Toml { .. }));
}

#[test]
fn invalid_thresholds_are_rejected() {
    let error = PipelineConfig::from_toml_str("[thresholds]\nmissing_ratio = 1.5\n").unwrap_err();
    assert!(matches!(error, ConfigError::Invalid { .. }));

    let error =
        PipelineConfig::from_toml_str("[thresholds]\nmax_interval_minutes = 0.0\n").unwrap_err();
    assert!(matches!(error, ConfigError::Invalid { .. }));
}

#[test]
fn empty_column_name_is_rejected() {
    let error = PipelineConfig::from_toml_str("[columns]\nrace = \"  \"\n").unwrap_err();
    assert!(error.to_string().contains("race"));
}

#[test]
fn load_reads_file_and_reports_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[sheets]\nresponse = \"Responses\"").unwrap();
    let config = PipelineConfig::load(file.path()).unwrap();
    assert_eq!(config.sheets.response, "Responses");

    let missing = file.path().with_extension("missing");
    let error = PipelineConfig::load(&missing).unwrap_err();
    assert!(matches!(error, ConfigError::Io { .. }));
}

#[test]
fn manifest_lists_required_headers_per_sheet() {
    let config = PipelineConfig::default();
    let manifest = config.manifest();
    assert_eq!(manifest.sheets.len(), 5);
    let vitals = manifest.required_for("Vitals");
    assert!(vitals.contains(&"Vitals Heart Rate (eVitals.10)".to_string()));
    assert!(
        manifest
            .required_for("Response")
            .contains(&config.columns.incident_id)
    );
    assert!(manifest.required_for("Unknown").is_empty());
}
