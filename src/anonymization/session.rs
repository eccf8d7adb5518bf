//! Recipient view orchestration
//!
//! An [`AnonymizationSession`] releases one [`RecipientView`]:
//!
//! 1. select the view's columns (explicit list, or by attribute role)
//! 2. run the view's transformation pipeline
//! 3. compute k over the view's quasi-identifier tuple
//! 4. suppress records if k is below the view's target
//!
//! The session performs no I/O. Failures are reported as
//! [`KanonError::Anonymization`] carrying the view name.

use crate::anonymization::codebook::Codebook;
use crate::anonymization::equivalence::EquivalenceClassAnalyzer;
use crate::anonymization::generalize::GeoLookup;
use crate::anonymization::pipeline::{TransformationPipeline, TransformationSpec};
use crate::anonymization::report::ReleaseReport;
use crate::anonymization::suppression::SuppressionEngine;
use crate::domain::{AnonResult, AttributeRole, KanonError, RecordSet, Result, SubjectId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

fn default_include_roles() -> Vec<AttributeRole> {
    AttributeRole::releasable()
}

fn default_max_suppression_rate() -> f64 {
    0.05
}

/// Release definition for one recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientView {
    /// View name, e.g. `researchers`
    pub name: String,

    /// Minimum class size the release must reach
    pub k_target: usize,

    /// Attributes, after transformation, over which k is verified
    pub quasi_identifiers: Vec<String>,

    /// Input columns to release; when absent, columns are chosen by role
    #[serde(default)]
    pub columns: Option<Vec<String>>,

    /// Roles released when `columns` is absent
    #[serde(default = "default_include_roles")]
    pub include_roles: Vec<AttributeRole>,

    /// Suppression rate above which the report carries a warning
    #[serde(default = "default_max_suppression_rate")]
    pub max_suppression_rate: f64,

    /// Transformation steps, in order
    #[serde(default)]
    pub steps: Vec<TransformationSpec>,
}

impl RecipientView {
    pub fn new(name: impl Into<String>, k_target: usize, quasi_identifiers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            k_target,
            quasi_identifiers,
            columns: None,
            include_roles: default_include_roles(),
            max_suppression_rate: default_max_suppression_rate(),
            steps: Vec::new(),
        }
    }

    pub fn with_steps(mut self, steps: Vec<TransformationSpec>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Validate the view definition
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("view name cannot be empty".to_string());
        }
        // The name becomes part of output file names
        if self.name.contains(&['/', '\\'][..]) || self.name == "." || self.name == ".." {
            return Err(format!(
                "view name '{}' cannot contain path separators",
                self.name
            ));
        }
        if self.k_target == 0 {
            return Err(format!("view '{}': k_target must be at least 1", self.name));
        }
        if self.quasi_identifiers.is_empty() {
            return Err(format!(
                "view '{}': quasi_identifiers cannot be empty",
                self.name
            ));
        }
        let unique: HashSet<&String> = self.quasi_identifiers.iter().collect();
        if unique.len() != self.quasi_identifiers.len() {
            return Err(format!(
                "view '{}': quasi_identifiers contains duplicates",
                self.name
            ));
        }
        if !(0.0..=1.0).contains(&self.max_suppression_rate) {
            return Err(format!(
                "view '{}': max_suppression_rate must be between 0 and 1",
                self.name
            ));
        }
        if self.columns.is_none() && self.include_roles.contains(&AttributeRole::DirectIdentifier) {
            return Err(format!(
                "view '{}': include_roles cannot contain direct_identifier",
                self.name
            ));
        }
        Ok(())
    }
}

/// Final record set for one recipient
#[derive(Debug, Clone, PartialEq)]
pub struct AnonymizedDataset {
    /// Recipient view name
    pub view: String,
    /// Released records
    pub records: RecordSet,
    /// Quasi-identifier tuple the release was verified over
    pub qi_tuple: Vec<String>,
    /// Achieved k
    pub k: usize,
    /// Required k
    pub k_target: usize,
    /// Records removed by suppression
    pub suppressed: usize,
    /// Subjects removed by suppression
    pub suppressed_ids: Vec<SubjectId>,
}

/// Everything a session produces for one view
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub dataset: AnonymizedDataset,
    pub codebook: Codebook,
    pub report: ReleaseReport,
}

/// Orchestrates pipeline, k computation and suppression for recipient views
#[derive(Debug, Clone, Default)]
pub struct AnonymizationSession {
    lookups: Vec<GeoLookup>,
    seed: Option<u64>,
    analyzer: EquivalenceClassAnalyzer,
}

impl AnonymizationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup tables available to `geo_rollup` steps
    pub fn with_lookups(mut self, lookups: Vec<GeoLookup>) -> Self {
        self.lookups = lookups;
        self
    }

    /// Seed for randomized steps; `None` draws from OS entropy
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Release one view of `records`
    ///
    /// # Errors
    ///
    /// [`KanonError::Anonymization`] wrapping the first failure of column
    /// selection, the pipeline, k computation or suppression.
    pub fn run(&self, records: &RecordSet, view: &RecipientView) -> Result<SessionOutcome> {
        view.validate().map_err(KanonError::Configuration)?;
        self.release(records, view)
            .map_err(|source| KanonError::anonymization(&view.name, source))
    }

    fn release(&self, records: &RecordSet, view: &RecipientView) -> AnonResult<SessionOutcome> {
        let started = Instant::now();
        crate::log_view_start!(view.name, view.k_target, records.len());

        let selected = match &view.columns {
            Some(columns) => records.select(columns)?,
            None => records.select_roles(&view.include_roles),
        };

        let pipeline = TransformationPipeline::new(view.steps.clone())
            .with_lookups(self.lookups.iter().cloned())
            .with_seed(self.seed);
        let transformed = pipeline.run(&selected)?;

        let mut report = ReleaseReport::new(
            &view.name,
            view.quasi_identifiers.clone(),
            view.k_target,
            records.len(),
        );
        report.transformations = transformed.summaries;
        report.codebook_attributes = transformed
            .codebook
            .attributes()
            .into_iter()
            .map(str::to_string)
            .collect();

        let k_before = self
            .analyzer
            .compute_k(&transformed.records, &view.quasi_identifiers)?;
        report.k_before = k_before;

        let (released, suppressed_ids, k) = if k_before < view.k_target {
            let outcome = SuppressionEngine::new(view.k_target)?
                .apply(&transformed.records, &view.quasi_identifiers)?;
            crate::log_suppression!(view.name, k_before, view.k_target, outcome.suppressed);
            (outcome.records, outcome.suppressed_ids, outcome.realized_k)
        } else {
            (transformed.records, Vec::new(), k_before)
        };

        let partition = self.analyzer.partition(&released, &view.quasi_identifiers)?;
        report.class_sizes = partition.size_distribution();
        report.released_records = released.len();
        report.suppressed = suppressed_ids.len();
        report.k_after = k;

        if report.suppression_rate() > view.max_suppression_rate {
            report.add_warning(format!(
                "{:.1}% of records suppressed, above the {:.1}% limit for this view",
                report.suppression_rate() * 100.0,
                view.max_suppression_rate * 100.0
            ));
        }
        if k < view.k_target {
            report.add_warning(format!("realized k {} is below target {}", k, view.k_target));
        }

        let elapsed = started.elapsed();
        report.duration_ms = elapsed.as_millis() as u64;
        crate::log_view_complete!(view.name, k, released.len(), elapsed);

        Ok(SessionOutcome {
            dataset: AnonymizedDataset {
                view: view.name.clone(),
                records: released,
                qi_tuple: view.quasi_identifiers.clone(),
                k,
                k_target: view.k_target,
                suppressed: suppressed_ids.len(),
                suppressed_ids,
            },
            codebook: transformed.codebook,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::pipeline::Generalization;
    use crate::domain::{AnonymizationError, Attribute, Schema, Value, ValueKind};
    use std::collections::BTreeMap;

    fn records() -> RecordSet {
        let schema = Schema::new(vec![
            Attribute::new("name", AttributeRole::DirectIdentifier, ValueKind::Text),
            Attribute::new("gender", AttributeRole::QuasiIdentifier, ValueKind::Categorical),
            Attribute::new("education", AttributeRole::QuasiIdentifier, ValueKind::Categorical),
            Attribute::new("weight", AttributeRole::SensitiveAttribute, ValueKind::Numeric),
        ])
        .unwrap();
        let rows = [
            ("Ann", "F", "primary", 60.0),
            ("Bea", "F", "secondary", 64.0),
            ("Cal", "M", "bachelor", 81.0),
            ("Dan", "M", "masters", 77.0),
            ("Eve", "F", "masters", 58.0),
        ];
        let mut set = RecordSet::new(schema);
        for (i, (name, gender, education, weight)) in rows.into_iter().enumerate() {
            set.push(
                SubjectId::new(format!("s{i}")).unwrap(),
                vec![
                    Value::Text(name.to_string()),
                    Value::from(gender),
                    Value::from(education),
                    Value::Numeric(weight),
                ],
            )
            .unwrap();
        }
        set
    }

    fn levels() -> TransformationSpec {
        TransformationSpec::new(
            "education",
            Generalization::CollapseCategories {
                mapping: BTreeMap::from(
                    [
                        ("primary", "school"),
                        ("secondary", "school"),
                        ("bachelor", "college"),
                        ("masters", "college"),
                    ]
                    .map(|(k, v)| (k.to_string(), v.to_string())),
                ),
            },
        )
    }

    fn view() -> RecipientView {
        RecipientView::new(
            "researchers",
            2,
            vec!["gender".to_string(), "education".to_string()],
        )
        .with_steps(vec![levels()])
    }

    #[test]
    fn test_release_suppresses_singletons() {
        let outcome = AnonymizationSession::new().run(&records(), &view()).unwrap();

        // (F, school) x2, (M, college) x2, (F, college) x1
        assert_eq!(outcome.dataset.k, 2);
        assert_eq!(outcome.dataset.suppressed, 1);
        assert_eq!(outcome.dataset.suppressed_ids[0].as_str(), "s4");
        assert_eq!(outcome.report.k_before, 1);
        assert_eq!(outcome.report.released_records, 4);
        assert_eq!(
            outcome.dataset.records.schema().names(),
            vec!["gender", "education", "weight"]
        );
        assert!(!outcome.report.warnings.is_empty());
    }

    #[test]
    fn test_release_without_suppression() {
        let view = RecipientView::new("all", 1, vec!["gender".to_string()]);
        let outcome = AnonymizationSession::new().run(&records(), &view).unwrap();
        assert_eq!(outcome.dataset.suppressed, 0);
        assert_eq!(outcome.dataset.k, 2);
        assert!(outcome.codebook.is_empty());
    }

    #[test]
    fn test_explicit_direct_identifier_column_fails() {
        let view = view().with_columns(vec!["name".to_string(), "gender".to_string()]);
        let err = AnonymizationSession::new().run(&records(), &view).unwrap_err();
        match err {
            KanonError::Anonymization { view, source } => {
                assert_eq!(view, "researchers");
                assert!(matches!(source, AnonymizationError::DirectIdentifierLeak { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_view_name_cannot_escape_output_dir() {
        for name in ["../public", "nested/view", "a\\b", ".."] {
            let view = RecipientView::new(name, 2, vec!["gender".to_string()]);
            assert!(view.validate().unwrap_err().contains("path separators"), "{name}");
        }
        assert!(RecipientView::new("gov.uk", 2, vec!["gender".to_string()])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_invalid_view() {
        let view = RecipientView::new("broken", 0, vec!["gender".to_string()]);
        assert!(matches!(
            AnonymizationSession::new().run(&records(), &view),
            Err(KanonError::Configuration(_))
        ));
    }
}
