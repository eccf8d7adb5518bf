//! Anonymization engine
//!
//! Generalization, suppression and verification of record sets released to
//! external recipients under a k-anonymity guarantee.
//!
//! # Architecture
//!
//! Data flows one way through:
//! - **Generalization**: attribute-level transforms that reduce cardinality
//!   ([`generalize`])
//! - **Pipeline**: ordered, declarative transformation steps, collecting a
//!   [`Codebook`] of reverse mappings ([`pipeline`])
//! - **Equivalence analysis**: classes over a quasi-identifier tuple and the
//!   resulting k ([`equivalence`])
//! - **Suppression**: single-pass removal of records in classes below the
//!   target k ([`suppression`])
//! - **Session**: orchestration of the above for one recipient view
//!   ([`session`]), producing a [`ReleaseReport`]
//! - **Audit**: append-only release log with hashed subject ids ([`audit`])
//!
//! # Usage
//!
//! ```rust
//! use kanon::anonymization::{AnonymizationSession, RecipientView};
//! use kanon::domain::{Attribute, AttributeRole, RecordSet, Schema, SubjectId, Value, ValueKind};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::new(vec![
//!     Attribute::new("gender", AttributeRole::QuasiIdentifier, ValueKind::Categorical),
//! ])?;
//! let mut records = RecordSet::new(schema);
//! for (id, gender) in [("a", "F"), ("b", "F"), ("c", "M")] {
//!     records.push(SubjectId::new(id)?, vec![Value::from(gender)])?;
//! }
//!
//! let view = RecipientView::new("researchers", 2, vec!["gender".to_string()]);
//! let outcome = AnonymizationSession::new().run(&records, &view)?;
//! assert_eq!(outcome.dataset.k, 2);
//! assert_eq!(outcome.dataset.suppressed, 1);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod codebook;
pub mod equivalence;
pub mod generalize;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod suppression;

// Re-export main types
pub use audit::AuditLogger;
pub use codebook::{Codebook, CodebookEntry, Deviation, Standardization};
pub use equivalence::{EquivalenceClass, EquivalenceClassAnalyzer, Partition};
pub use generalize::{GeoLookup, PseudonymScheme};
pub use pipeline::{
    Generalization, OutputSummary, PipelineOutput, StepSummary, TransformationPipeline,
    TransformationSpec,
};
pub use report::ReleaseReport;
pub use session::{AnonymizationSession, AnonymizedDataset, RecipientView, SessionOutcome};
pub use suppression::{SuppressionEngine, SuppressionOutcome};
