use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    Info,
    Warning,
}

impl fmt::Display for FindingSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// An incident identifier appears on more than one row of a sheet.
    DuplicateIdentifier,
    /// An anchor identifier has no row in a right-hand sheet.
    UnmatchedIdentifier,
    /// A duration is null, negative or above the plausibility bound.
    OutOfRangeInterval,
    /// A column exceeds the missing-data threshold.
    MissingData,
    /// Non-numeric text was found in a numeric field.
    NumericCoercion,
    /// An age could not be converted to years.
    AgeConversion,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DuplicateIdentifier => "duplicate id",
            Self::UnmatchedIdentifier => "unmatched id",
            Self::OutOfRangeInterval => "out of range",
            Self::MissingData => "missing data",
            Self::NumericCoercion => "coercion",
            Self::AgeConversion => "age unit",
        };
        f.write_str(label)
    }
}

/// A data-quality observation. Findings never block the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityFinding {
    pub kind: FindingKind,
    pub severity: FindingSeverity,
    /// Sheet or derived table the finding refers to.
    pub table: String,
    pub column: Option<String>,
    /// Number of affected rows or identifiers.
    pub count: u64,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub findings: Vec<DataQualityFinding>,
}

impl QualityReport {
    pub fn push(&mut self, finding: DataQualityFinding) {
        self.findings.push(finding);
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = DataQualityFinding>) {
        self.findings.extend(findings);
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|finding| finding.severity == FindingSeverity::Warning)
            .count()
    }

    pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &DataQualityFinding> {
        self.findings
            .iter()
            .filter(move |finding| finding.kind == kind)
    }
}
