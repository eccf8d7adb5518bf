//! End-to-end release scenarios

use kanon::anonymization::generalize::{collapse_categories, geo_rollup, postcode_area};
use kanon::anonymization::{
    AnonymizationSession, EquivalenceClassAnalyzer, Generalization, GeoLookup, RecipientView,
    SuppressionEngine, TransformationSpec,
};
use kanon::domain::{
    AnonymizationError, Attribute, AttributeRole, KanonError, RecordSet, Schema, SubjectId, Value,
    ValueKind,
};
use std::collections::BTreeMap;

fn qi() -> Vec<String> {
    vec!["gender".to_string(), "age_band".to_string()]
}

/// 4×(M,A), 3×(F,A), 1×(F,B)
fn survey() -> RecordSet {
    let schema = Schema::new(vec![
        Attribute::new("gender", AttributeRole::QuasiIdentifier, ValueKind::Categorical),
        Attribute::new("age_band", AttributeRole::QuasiIdentifier, ValueKind::Categorical),
        Attribute::new("weight", AttributeRole::SensitiveAttribute, ValueKind::Numeric),
    ])
    .unwrap();
    let rows = [
        ("M", "A"),
        ("M", "A"),
        ("M", "A"),
        ("M", "A"),
        ("F", "A"),
        ("F", "A"),
        ("F", "A"),
        ("F", "B"),
    ];
    let mut records = RecordSet::new(schema);
    for (i, (gender, band)) in rows.iter().enumerate() {
        records
            .push(
                SubjectId::new(format!("subject-{i}")).unwrap(),
                vec![Value::from(*gender), Value::from(*band), Value::from(60.0 + i as f64)],
            )
            .unwrap();
    }
    records
}

#[test]
fn test_scenario_suppression_of_singleton_class() {
    let records = survey();
    let analyzer = EquivalenceClassAnalyzer::new();
    assert_eq!(analyzer.compute_k(&records, &qi()).unwrap(), 1);

    let outcome = SuppressionEngine::new(2).unwrap().apply(&records, &qi()).unwrap();
    assert_eq!(outcome.suppressed, 1);
    assert_eq!(outcome.suppressed_ids, vec![SubjectId::new("subject-7").unwrap()]);
    assert_eq!(outcome.records.len(), 7);
    assert_eq!(outcome.realized_k, 3);
    assert_eq!(analyzer.compute_k(&outcome.records, &qi()).unwrap(), 3);
}

#[test]
fn test_scenario_through_session() {
    let view = RecipientView::new("researchers", 2, qi());
    let outcome = AnonymizationSession::new().run(&survey(), &view).unwrap();

    assert_eq!(outcome.dataset.k, 3);
    assert_eq!(outcome.dataset.records.len(), 7);
    assert_eq!(outcome.report.k_before, 1);
    assert_eq!(outcome.report.k_after, 3);
    assert_eq!(outcome.report.class_sizes, BTreeMap::from([(3, 1), (4, 1)]));
    // 1 of 8 exceeds the default 5% suppression budget
    assert_eq!(outcome.report.warnings.len(), 1);
}

#[test]
fn test_scenario_unmapped_education_level() {
    let mapping = BTreeMap::from([
        ("primary".to_string(), "school".to_string()),
        ("secondary".to_string(), "school".to_string()),
        ("bachelor".to_string(), "college".to_string()),
    ]);
    let values = vec![
        Value::from("primary"),
        Value::from("bachelor"),
        Value::from("other"),
    ];

    let err = collapse_categories("education_level", &values, &mapping).unwrap_err();
    assert_eq!(
        err,
        AnonymizationError::UnmappedCategory {
            attribute: "education_level".to_string(),
            value: "other".to_string(),
        }
    );
}

#[test]
fn test_scenario_unknown_postcode_prefix() {
    let lookup = GeoLookup::new(
        "uk_regions",
        [
            ("SW".to_string(), "England".to_string()),
            ("EH".to_string(), "Scotland".to_string()),
        ],
    );
    let postcodes = vec![Value::from("SW1A 1AA"), Value::from("ZZ9 9ZZ")];
    let areas = postcode_area("postcode", &postcodes).unwrap();

    let err = geo_rollup("postcode", &areas.values, &lookup).unwrap_err();
    assert!(matches!(
        err,
        AnonymizationError::UnmappedCategory { ref value, .. } if value == "ZZ"
    ));
}

#[test]
fn test_scenario_unknown_prefix_aborts_whole_view() {
    let schema = Schema::new(vec![Attribute::new(
        "postcode",
        AttributeRole::QuasiIdentifier,
        ValueKind::Categorical,
    )])
    .unwrap();
    let mut records = RecordSet::new(schema);
    for (i, postcode) in ["SW1A 1AA", "SW3 4HN", "ZZ9 9ZZ"].iter().enumerate() {
        records
            .push(SubjectId::new(format!("s{i}")).unwrap(), vec![Value::from(*postcode)])
            .unwrap();
    }
    let lookup = GeoLookup::new("uk_regions", [("SW".to_string(), "England".to_string())]);
    let view = RecipientView::new("government", 2, vec!["region".to_string()]).with_steps(vec![
        TransformationSpec::new("postcode", Generalization::PostcodeArea).output("region"),
        TransformationSpec::new(
            "region",
            Generalization::GeoRollup {
                lookup: "uk_regions".to_string(),
            },
        ),
    ]);

    let err = AnonymizationSession::new()
        .with_lookups(vec![lookup])
        .run(&records, &view)
        .unwrap_err();
    match err {
        KanonError::Anonymization { view, source } => {
            assert_eq!(view, "government");
            assert!(matches!(source, AnonymizationError::UnmappedCategory { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}
