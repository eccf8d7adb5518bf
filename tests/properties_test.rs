//! Properties that hold for every record set

use kanon::anonymization::generalize::{quantile_bin, standardize};
use kanon::anonymization::{
    CodebookEntry, Deviation, EquivalenceClassAnalyzer, Generalization, PseudonymScheme,
    SuppressionEngine, TransformationPipeline, TransformationSpec,
};
use kanon::domain::{
    AnonymizationError, Attribute, AttributeRole, RecordSet, Schema, SubjectId, Value, ValueKind,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

fn qi() -> Vec<String> {
    vec!["gender".to_string(), "region".to_string()]
}

fn record_set(rows: &[(u8, u8)]) -> RecordSet {
    let schema = Schema::new(vec![
        Attribute::new("gender", AttributeRole::QuasiIdentifier, ValueKind::Categorical),
        Attribute::new("region", AttributeRole::QuasiIdentifier, ValueKind::Categorical),
    ])
    .unwrap();
    let mut records = RecordSet::new(schema);
    for (i, (gender, region)) in rows.iter().enumerate() {
        records
            .push(
                SubjectId::new(format!("s{i}")).unwrap(),
                vec![
                    Value::Categorical(format!("g{gender}")),
                    Value::Categorical(format!("r{region}")),
                ],
            )
            .unwrap();
    }
    records
}

fn rows() -> impl Strategy<Value = Vec<(u8, u8)>> {
    prop::collection::vec((0u8..2, 0u8..4), 1..60)
}

proptest! {
    #[test]
    fn prop_k_is_minimum_class_size(rows in rows()) {
        let mut counts: HashMap<(u8, u8), usize> = HashMap::new();
        for row in &rows {
            *counts.entry(*row).or_default() += 1;
        }
        let expected = counts.values().copied().min().unwrap_or(0);

        let k = EquivalenceClassAnalyzer::new().compute_k(&record_set(&rows), &qi()).unwrap();
        prop_assert_eq!(k, expected);
        prop_assert!(k >= 1);
    }

    #[test]
    fn prop_suppression_is_idempotent(rows in rows(), k_target in 1usize..5) {
        let engine = SuppressionEngine::new(k_target).unwrap();
        match engine.apply(&record_set(&rows), &qi()) {
            Ok(first) => {
                prop_assert!(first.realized_k >= k_target);
                let second = engine.apply(&first.records, &qi()).unwrap();
                prop_assert_eq!(second.suppressed, 0);
                prop_assert_eq!(second.records, first.records);
            }
            Err(err) => prop_assert_eq!(err, AnonymizationError::EmptyDataset),
        }
    }

    #[test]
    fn prop_standardize_round_trip(values in prop::collection::vec(-1.0e4f64..1.0e4, 2..40)) {
        prop_assume!(values.iter().any(|v| (v - values[0]).abs() > 1e-6));
        let column: Vec<Value> = values.iter().copied().map(Value::from).collect();
        let standardized = standardize("weight", &column, Deviation::Sample).unwrap();

        let params = match standardized.entry {
            Some(CodebookEntry::Standardization(params)) => params,
            other => panic!("unexpected codebook entry: {other:?}"),
        };
        for (original, z) in values.iter().zip(&standardized.values) {
            let restored = params.restore(z.as_f64().unwrap());
            prop_assert!((restored - original).abs() <= 1e-6 * original.abs().max(1.0));
        }
    }
}

#[test]
fn test_empty_record_set_has_no_k() {
    let err = EquivalenceClassAnalyzer::new()
        .compute_k(&record_set(&[]), &qi())
        .unwrap_err();
    assert_eq!(err, AnonymizationError::EmptyDataset);
}

#[test]
fn test_quantile_bin_with_exactly_q_distinct_values() {
    let values: Vec<Value> = [3.0, 1.0, 4.0, 2.0].into_iter().map(Value::from).collect();
    let banded = quantile_bin("score", &values, 4, None).unwrap();

    let mut labels: Vec<&Value> = banded.values.iter().collect();
    labels.sort_by_key(|v| v.to_string());
    labels.dedup();
    assert_eq!(labels.len(), 4);
}

#[test]
fn test_quantile_bin_with_fewer_than_q_distinct_values() {
    let values: Vec<Value> = [1.0, 1.0, 2.0, 2.0, 3.0].into_iter().map(Value::from).collect();
    let err = quantile_bin("score", &values, 4, None).unwrap_err();
    assert!(matches!(
        err,
        AnonymizationError::InsufficientData { distinct: 3, required: 4, .. }
    ));
}

fn pipeline_input() -> RecordSet {
    let schema = Schema::new(vec![
        Attribute::new("country", AttributeRole::QuasiIdentifier, ValueKind::Categorical),
        Attribute::new("age", AttributeRole::QuasiIdentifier, ValueKind::Numeric),
        Attribute::new("weight", AttributeRole::SensitiveAttribute, ValueKind::Numeric),
    ])
    .unwrap();
    let rows = [
        ("UK", 23.0, 61.0),
        ("France", 35.0, 72.5),
        ("UK", 47.0, 80.2),
        ("Spain", 52.0, 66.1),
        ("France", 29.0, 59.9),
        ("UK", 61.0, 90.3),
    ];
    let mut records = RecordSet::new(schema);
    for (i, (country, age, weight)) in rows.into_iter().enumerate() {
        records
            .push(
                SubjectId::new(format!("s{i}")).unwrap(),
                vec![Value::from(country), Value::from(age), Value::from(weight)],
            )
            .unwrap();
    }
    records
}

fn pipeline(seed: Option<u64>) -> TransformationPipeline {
    TransformationPipeline::new(vec![
        TransformationSpec::new(
            "country",
            Generalization::Pseudonymize {
                scheme: PseudonymScheme::Random {
                    prefix: "C".to_string(),
                    digits: 3,
                },
            },
        ),
        TransformationSpec::new("age", Generalization::QuantileBin { q: 3, labels: None }),
        TransformationSpec::new(
            "weight",
            Generalization::Standardize {
                deviation: Deviation::Population,
            },
        ),
    ])
    .with_seed(seed)
}

#[test]
fn test_seeded_pipeline_is_deterministic() {
    let first = pipeline(Some(2022)).run(&pipeline_input()).unwrap();
    let second = pipeline(Some(2022)).run(&pipeline_input()).unwrap();

    assert_eq!(first.records, second.records);
    assert_eq!(first.codebook, second.codebook);
}

#[test]
fn test_unseeded_pseudonyms_are_self_consistent() {
    let input = pipeline_input();
    let output = pipeline(None).run(&input).unwrap();

    let tokens = match output.codebook.get("country") {
        Some(CodebookEntry::Pseudonyms { tokens }) => tokens.clone(),
        other => panic!("unexpected codebook entry: {other:?}"),
    };
    assert_eq!(tokens.len(), 3);

    let originals = input.column("country").unwrap();
    let released = output.records.column("country").unwrap();
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for (original, token) in originals.iter().zip(&released) {
        let original = original.to_string();
        let token = token.to_string();
        assert_eq!(tokens[&original], token);
        let first_token = seen.entry(original).or_insert_with(|| token.clone());
        assert_eq!(*first_token, token);
    }
}
