//! Tests for label resolution and event/non-event mapping

use fatality::pipeline::*;
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_numeric_fatality_is_used_directly() {
    let df = create_collision_dataframe(40, 4);

    let resolved = resolve_labels(&df, "FATALITY", None).unwrap();
    assert_eq!(resolved.ignored(), 0);
    assert_eq!(resolved.kept_labels().iter().filter(|&&l| l == 1).count(), 4);
}

#[test]
fn test_float_fatality_is_binary() {
    let df = df! {
        "FATALITY" => [0.0f64, 1.0, 0.0, 1.0],
    }
    .unwrap();

    assert!(matches!(
        analyze_target_column(&df, "FATALITY").unwrap(),
        TargetAnalysis::AlreadyBinary
    ));
}

#[test]
fn test_text_fatality_needs_mapping() {
    let df = df! {
        "FATALITY" => ["Y", "N", "N", "Y"],
    }
    .unwrap();

    let err = resolve_labels(&df, "FATALITY", None).unwrap_err();
    assert!(err.to_string().contains("--event-value"));

    let mapping = TargetMapping::new("Y", "N");
    let resolved = resolve_labels(&df, "FATALITY", Some(&mapping)).unwrap();
    assert_eq!(resolved.values, vec![Some(1), Some(0), Some(0), Some(1)]);
}

#[test]
fn test_severity_lists_its_levels() {
    let df = create_severity_dataframe(30);

    match analyze_target_column(&df, "P_ISEV").unwrap() {
        TargetAnalysis::NeedsMapping { unique_values } => {
            assert_eq!(unique_values, vec!["1", "2", "3"]);
        }
        _ => panic!("Expected NeedsMapping for a three-level severity"),
    }
}

#[test]
fn test_severity_mapping_keeps_only_mapped_rows() {
    let df = create_severity_dataframe(30);
    let mapping = TargetMapping::new("3", "1");

    let resolved = resolve_labels(&df, "P_ISEV", Some(&mapping)).unwrap();

    assert_eq!(resolved.ignored(), 12);
    assert_eq!(resolved.kept_rows().len(), 18);
    assert_eq!(resolved.kept_labels().iter().filter(|&&l| l == 1).count(), 6);
}

#[test]
fn test_null_labels_are_ignored() {
    let df = df! {
        "FATALITY" => [Some(0i64), None, Some(1), Some(0)],
    }
    .unwrap();

    let resolved = resolve_labels(&df, "FATALITY", None).unwrap();
    assert_eq!(resolved.ignored(), 1);
    assert_eq!(resolved.kept_rows(), vec![0, 2, 3]);
}

#[test]
fn test_all_null_label_is_an_error() {
    let df = df! {
        "FATALITY" => [None::<i64>, None],
    }
    .unwrap();

    assert!(analyze_target_column(&df, "FATALITY").is_err());
}

#[test]
fn test_mapping_requires_both_values() {
    assert!(TargetMapping::from_pair(Some("3"), None).is_err());
    assert!(TargetMapping::from_pair(None, Some("1")).is_err());

    let mapping = TargetMapping::from_pair(Some("3"), Some("1")).unwrap().unwrap();
    assert_eq!(mapping.event_value, "3");
    assert_eq!(mapping.non_event_value, "1");
}
