//! Pipeline configuration.
//!
//! Every field carries a default matching the NEMSIS-coded export, so a
//! configuration file is only needed when a workbook deviates from it.
//!
//! ```toml
//! [sheets]
//! vitals = "Vitals"
//!
//! [columns]
//! time_marker = "Date Time"
//!
//! [thresholds]
//! max_interval_minutes = 1440.0
//! missing_ratio = 0.2
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Names of the five workbook sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetNames {
    pub incident_times: String,
    pub cardiac_arrest: String,
    pub vitals: String,
    pub patient: String,
    pub response: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            incident_times: "Incident Times".to_string(),
            cardiac_arrest: "Cardiac Arrest".to_string(),
            vitals: "Vitals".to_string(),
            patient: "Patient".to_string(),
            response: "Response".to_string(),
        }
    }
}

impl SheetNames {
    /// Sheet names in load order.
    pub fn all(&self) -> [&str; 5] {
        [
            &self.incident_times,
            &self.cardiac_arrest,
            &self.vitals,
            &self.patient,
            &self.response,
        ]
    }
}

/// Header names (after header normalization) referenced by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnNames {
    /// Join key shared by every sheet.
    pub incident_id: String,
    /// Substring that marks a header as a serial date-time field.
    pub time_marker: String,
    pub dispatch_notified: String,
    pub arrived_on_scene: String,
    pub left_scene: String,
    pub back_in_service: String,
    pub vitals_taken: String,
    /// Vitals fields coerced to numeric before aggregation.
    pub vitals_numeric: Vec<String>,
    pub age: String,
    pub age_units: String,
    pub gender: String,
    pub race: String,
    pub cardiac_arrest: String,
    /// Multi-select list of resuscitation attempts.
    pub resuscitation: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            incident_id: "Patient Care Report Number".to_string(),
            time_marker: "Date Time".to_string(),
            dispatch_notified: "Incident Unit Notified By Dispatch Date Time (eTimes.03)"
                .to_string(),
            arrived_on_scene: "Incident Unit Arrived On Scene Date Time (eTimes.06)".to_string(),
            left_scene: "Incident Unit Left Scene Date Time (eTimes.09)".to_string(),
            back_in_service: "Incident Unit Back In Service Date Time (eTimes.13)".to_string(),
            vitals_taken: "Vitals Signs Taken Date Time (eVitals.01)".to_string(),
            vitals_numeric: vec![
                "Vitals Systolic Blood Pressure SBP (eVitals.06)".to_string(),
                "Vitals Heart Rate (eVitals.10)".to_string(),
                "Vitals Respiratory Rate (eVitals.14)".to_string(),
            ],
            age: "Patient Age (ePatient.15)".to_string(),
            age_units: "Patient Age Units (ePatient.16)".to_string(),
            gender: "Patient Gender (ePatient.13)".to_string(),
            race: "Patient Race List (ePatient.14)".to_string(),
            cardiac_arrest: "Cardiac Arrest During EMS Event (eArrest.01)".to_string(),
            resuscitation: "Cardiac Arrest Resuscitation Attempted By EMS List (eArrest.03)"
                .to_string(),
        }
    }
}

impl ColumnNames {
    /// Timestamp pairs (earlier, later) for the three duration fields.
    pub fn interval_pairs(&self) -> [(&str, &str); 3] {
        [
            (&self.dispatch_notified, &self.arrived_on_scene),
            (&self.arrived_on_scene, &self.left_scene),
            (&self.left_scene, &self.back_in_service),
        ]
    }
}

/// Plausibility and completeness thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Upper bound (inclusive) for every duration in the clean view.
    pub max_interval_minutes: f64,
    /// Columns with a larger share of missing values are reported.
    pub missing_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_interval_minutes: 1440.0,
            missing_ratio: 0.20,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Workbook path; the CLI argument takes precedence.
    pub workbook: Option<PathBuf>,
    pub sheets: SheetNames,
    pub columns: ColumnNames,
    pub thresholds: Thresholds,
}

impl PipelineConfig {
    /// Load and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text).map_err(|error| match error {
            ConfigError::Toml { source, .. } => ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for name in self.sheets.all() {
            if name.trim().is_empty() {
                return Err(ConfigError::invalid("sheet names must not be empty"));
            }
        }
        let columns = &self.columns;
        let required = [
            ("incident_id", &columns.incident_id),
            ("time_marker", &columns.time_marker),
            ("dispatch_notified", &columns.dispatch_notified),
            ("arrived_on_scene", &columns.arrived_on_scene),
            ("left_scene", &columns.left_scene),
            ("back_in_service", &columns.back_in_service),
            ("vitals_taken", &columns.vitals_taken),
            ("age", &columns.age),
            ("age_units", &columns.age_units),
            ("gender", &columns.gender),
            ("race", &columns.race),
            ("cardiac_arrest", &columns.cardiac_arrest),
            ("resuscitation", &columns.resuscitation),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid(format!(
                    "column name `{field}` must not be empty"
                )));
            }
        }
        if columns.vitals_numeric.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "vitals_numeric entries must not be empty",
            ));
        }
        let max = self.thresholds.max_interval_minutes;
        if !max.is_finite() || max <= 0.0 {
            return Err(ConfigError::invalid(format!(
                "max_interval_minutes must be positive, got {max}"
            )));
        }
        let ratio = self.thresholds.missing_ratio;
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(ConfigError::invalid(format!(
                "missing_ratio must be between 0 and 1, got {ratio}"
            )));
        }
        Ok(())
    }

    /// Expected-schema manifest checked right after header normalization.
    pub fn manifest(&self) -> SchemaManifest {
        let c = &self.columns;
        let s = &self.sheets;
        let mut vitals = vec![c.incident_id.clone(), c.vitals_taken.clone()];
        vitals.extend(c.vitals_numeric.iter().cloned());
        SchemaManifest {
            sheets: vec![
                SheetSchema {
                    sheet: s.incident_times.clone(),
                    required: vec![
                        c.incident_id.clone(),
                        c.dispatch_notified.clone(),
                        c.arrived_on_scene.clone(),
                        c.left_scene.clone(),
                        c.back_in_service.clone(),
                    ],
                },
                SheetSchema {
                    sheet: s.cardiac_arrest.clone(),
                    required: vec![
                        c.incident_id.clone(),
                        c.cardiac_arrest.clone(),
                        c.resuscitation.clone(),
                    ],
                },
                SheetSchema {
                    sheet: s.vitals.clone(),
                    required: vitals,
                },
                SheetSchema {
                    sheet: s.patient.clone(),
                    required: vec![
                        c.incident_id.clone(),
                        c.age.clone(),
                        c.age_units.clone(),
                        c.gender.clone(),
                        c.race.clone(),
                    ],
                },
                SheetSchema {
                    sheet: s.response.clone(),
                    required: vec![c.incident_id.clone()],
                },
            ],
        }
    }
}

/// Required headers for one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSchema {
    pub sheet: String,
    pub required: Vec<String>,
}

/// Required headers for every sheet, in load order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaManifest {
    pub sheets: Vec<SheetSchema>,
}

impl SchemaManifest {
    pub fn required_for(&self, sheet: &str) -> &[String] {
        self.sheets
            .iter()
            .find(|schema| schema.sheet == sheet)
            .map(|schema| schema.required.as_slice())
            .unwrap_or(&[])
    }
}
