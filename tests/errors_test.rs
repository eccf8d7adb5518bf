//! Every failure aborts its operation with a named error

use kanon::anonymization::generalize::{derive_age, fixed_bin, standardize};
use kanon::anonymization::{
    AnonymizationSession, Deviation, Generalization, RecipientView, SuppressionEngine,
    TransformationPipeline, TransformationSpec,
};
use kanon::domain::{
    AnonymizationError, Attribute, AttributeRole, KanonError, RecordSet, Schema, SubjectId, Value,
    ValueKind,
};
use test_case::test_case;

fn numeric(values: &[f64]) -> Vec<Value> {
    values.iter().copied().map(Value::from).collect()
}

fn records(schema: Vec<Attribute>, rows: Vec<Vec<Value>>) -> RecordSet {
    let mut set = RecordSet::new(Schema::new(schema).unwrap());
    for (i, row) in rows.into_iter().enumerate() {
        set.push(SubjectId::new(format!("s{i}")).unwrap(), row).unwrap();
    }
    set
}

#[test_case(&[-1.0] ; "below lowest edge")]
#[test_case(&[120.0] ; "above highest edge")]
fn test_fixed_bin_out_of_range(values: &[f64]) {
    let labels = vec!["child".to_string(), "adult".to_string()];
    let err = fixed_bin("age", &numeric(values), &[0.0, 18.0, 100.0], &labels, None).unwrap_err();
    assert!(matches!(err, AnonymizationError::OutOfRange { .. }));
}

#[test_case(f64::NAN ; "not a number")]
#[test_case(f64::INFINITY ; "infinite")]
fn test_fixed_bin_non_finite_is_malformed(value: f64) {
    let labels = vec!["child".to_string(), "adult".to_string()];
    let err = fixed_bin(
        "age",
        &numeric(&[5.0, value]),
        &[0.0, 18.0, 100.0],
        &labels,
        Some("unknown"),
    )
    .unwrap_err();
    assert!(matches!(err, AnonymizationError::Malformed { .. }));
}

#[test]
fn test_fixed_bin_catch_all_absorbs_out_of_range() {
    let labels = vec!["child".to_string(), "adult".to_string()];
    let banded = fixed_bin(
        "age",
        &numeric(&[5.0, 120.0]),
        &[0.0, 18.0, 100.0],
        &labels,
        Some("unknown"),
    )
    .unwrap();
    assert_eq!(banded.values, vec![Value::from("child"), Value::from("unknown")]);
}

#[test_case(Deviation::Sample ; "sample")]
#[test_case(Deviation::Population ; "population")]
fn test_standardize_constant_column(deviation: Deviation) {
    let err = standardize("weight", &numeric(&[70.0, 70.0, 70.0]), deviation).unwrap_err();
    assert_eq!(
        err,
        AnonymizationError::DegenerateColumn {
            attribute: "weight".to_string()
        }
    );
}

#[test]
fn test_standardize_single_sample_value() {
    let err = standardize("weight", &numeric(&[70.0]), Deviation::Sample).unwrap_err();
    assert!(matches!(err, AnonymizationError::InsufficientData { .. }));
}

#[test]
fn test_derive_age_rejects_text() {
    let err = derive_age("birthdate", &[Value::from("1990")], 2022).unwrap_err();
    assert!(matches!(err, AnonymizationError::TypeMismatch { .. }));
}

#[test]
fn test_direct_identifier_in_pipeline_input() {
    let set = records(
        vec![
            Attribute::new("surname", AttributeRole::DirectIdentifier, ValueKind::Text),
            Attribute::new("gender", AttributeRole::QuasiIdentifier, ValueKind::Categorical),
        ],
        vec![vec![Value::Text("Smith".to_string()), Value::from("F")]],
    );
    let err = TransformationPipeline::new(Vec::new()).run(&set).unwrap_err();
    assert_eq!(
        err,
        AnonymizationError::DirectIdentifierLeak {
            attributes: vec!["surname".to_string()]
        }
    );
}

#[test]
fn test_pipeline_aborts_without_partial_output() {
    let set = records(
        vec![
            Attribute::new("age", AttributeRole::QuasiIdentifier, ValueKind::Numeric),
            Attribute::new("weight", AttributeRole::SensitiveAttribute, ValueKind::Numeric),
        ],
        vec![
            vec![Value::from(30.0), Value::from(70.0)],
            vec![Value::from(40.0), Value::from(70.0)],
        ],
    );
    let pipeline = TransformationPipeline::new(vec![
        TransformationSpec::new("age", Generalization::QuantileBin { q: 2, labels: None }),
        TransformationSpec::new(
            "weight",
            Generalization::Standardize {
                deviation: Deviation::Sample,
            },
        ),
    ]);
    assert!(matches!(
        pipeline.run(&set),
        Err(AnonymizationError::DegenerateColumn { .. })
    ));
}

#[test]
fn test_suppressing_everything_is_empty_dataset() {
    let set = records(
        vec![Attribute::new(
            "gender",
            AttributeRole::QuasiIdentifier,
            ValueKind::Categorical,
        )],
        vec![vec![Value::from("F")], vec![Value::from("M")]],
    );
    let err = SuppressionEngine::new(2)
        .unwrap()
        .apply(&set, &["gender".to_string()])
        .unwrap_err();
    assert_eq!(err, AnonymizationError::EmptyDataset);
}

#[test]
fn test_zero_k_target_rejected() {
    assert!(matches!(
        SuppressionEngine::new(0),
        Err(AnonymizationError::InvalidParameter(_))
    ));
}

#[test]
fn test_session_wraps_failure_with_view() {
    let set = records(
        vec![Attribute::new(
            "gender",
            AttributeRole::QuasiIdentifier,
            ValueKind::Categorical,
        )],
        vec![vec![Value::from("F")]],
    );
    let view = RecipientView::new("press", 1, vec!["postcode".to_string()]);
    let err = AnonymizationSession::new().run(&set, &view).unwrap_err();

    assert!(matches!(
        &err,
        KanonError::Anonymization { view, source: AnonymizationError::UnknownAttribute { .. } }
            if view == "press"
    ));
    assert!(err.to_string().contains("press"));
}

#[test]
fn test_invalid_view_is_configuration_error() {
    let set = records(
        vec![Attribute::new(
            "gender",
            AttributeRole::QuasiIdentifier,
            ValueKind::Categorical,
        )],
        vec![vec![Value::from("F")]],
    );
    let view = RecipientView::new("press", 0, vec!["gender".to_string()]);
    assert!(matches!(
        AnonymizationSession::new().run(&set, &view),
        Err(KanonError::Configuration(_))
    ));
}
