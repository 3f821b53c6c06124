use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};

use ems_model::columns::{BACK_IN_SERVICE_TIME, ON_SCENE_TIME, RESPONSE_TIME};
use ems_model::{FindingKind, FindingSeverity};
use ems_transform::UnitConversionWarning;
use ems_validate::{
    age_findings, audit_duplicate_ids, audit_intervals, audit_missing, audit_unmatched,
    interval_counts, unmatched_ids,
};

const ID: &str = "Patient Care Report Number";

fn ids(values: &[Option<&str>]) -> DataFrame {
    DataFrame::new(vec![Series::new(ID.into(), values.to_vec()).into_column()]).unwrap()
}

#[test]
fn duplicate_identifiers_are_counted_once_per_id() {
    let df = ids(&[Some("1"), Some("2"), Some("2"), Some("3"), Some("3"), Some("3"), None, None]);
    let finding = audit_duplicate_ids("Patient", &df, ID).unwrap();
    assert_eq!(finding.kind, FindingKind::DuplicateIdentifier);
    assert_eq!(finding.severity, FindingSeverity::Warning);
    assert_eq!(finding.count, 2);
    assert!(finding.message.contains("3 extra rows"));

    let unique = ids(&[Some("1"), Some("2")]);
    assert!(audit_duplicate_ids("Patient", &unique, ID).is_none());
}

#[test]
fn unmatched_identifiers_come_from_the_anchor() {
    let anchor = ids(&[Some("1"), Some("2"), Some("3"), None]);
    let other = ids(&[Some("2"), Some("9")]);
    let missing = unmatched_ids(&anchor, &other, ID).unwrap();
    assert_eq!(
        missing.into_iter().collect::<Vec<_>>(),
        vec!["1".to_string(), "3".to_string()]
    );
    let finding = audit_unmatched("Response", &anchor, &other, ID).unwrap();
    assert_eq!(finding.count, 2);
    assert_eq!(finding.table, "Response");
}

#[test]
fn missing_threshold_is_exclusive() {
    let df = DataFrame::new(vec![
        Series::new("Gender".into(), vec![Some("F"), None, Some("M"), Some("F"), Some("M")])
            .into_column(),
        Series::new("Race".into(), vec![Some("White"), Some(" "), None, Some("Asian"), None])
            .into_column(),
        Series::new("Age".into(), vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)])
            .into_column(),
    ])
    .unwrap();
    // Gender is exactly 20% missing and is not reported.
    let findings = audit_missing("Combined Record", &df, 0.20);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].column.as_deref(), Some("Race"));
    assert_eq!(findings[0].count, 3);
    assert_eq!(findings[0].message, "60.0% missing");
}

#[test]
fn interval_audit_splits_failure_reasons() {
    let df = DataFrame::new(vec![
        Series::new(RESPONSE_TIME.into(), vec![Some(-5.0), Some(1440.0), None, Some(1500.0)])
            .into_column(),
        Series::new(ON_SCENE_TIME.into(), vec![Some(10.0), Some(12.0), Some(0.0), Some(9.0)])
            .into_column(),
        Series::new(BACK_IN_SERVICE_TIME.into(), vec![Some(30.0); 4]).into_column(),
    ])
    .unwrap();
    let counts = interval_counts(&df, RESPONSE_TIME, 1440.0).unwrap();
    assert_eq!((counts.null, counts.negative, counts.over_limit), (1, 1, 1));

    let findings = audit_intervals("Combined Record", &df, 1440.0);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].column.as_deref(), Some(RESPONSE_TIME));
    assert_eq!(findings[0].count, 3);
}

#[test]
fn age_findings_group_by_reason() {
    let warnings = vec![
        UnitConversionWarning::MissingAge,
        UnitConversionWarning::UnrecognizedUnit("Hours".to_string()),
        UnitConversionWarning::MissingAge,
    ];
    let findings = age_findings("Patient", &warnings);
    assert_eq!(findings.len(), 2);
    let missing = findings
        .iter()
        .find(|finding| finding.message.contains("age value is missing"))
        .unwrap();
    assert_eq!(missing.count, 2);
}
