//! Domain models and types for Kanon.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Records** ([`Record`], [`RecordSet`], [`Schema`], [`Value`]) with the
//!   per-attribute [`AttributeRole`] that drives what may be released
//! - **Subject identifiers** ([`SubjectId`], [`SubjectIdGenerator`])
//! - **Error types** ([`KanonError`], [`AnonymizationError`])
//! - **Result type aliases** ([`Result`], [`AnonResult`])
//!
//! # Example
//!
//! ```rust
//! use kanon::domain::{Attribute, AttributeRole, RecordSet, Schema, SubjectId, Value, ValueKind};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::new(vec![
//!     Attribute::new("gender", AttributeRole::QuasiIdentifier, ValueKind::Categorical),
//!     Attribute::new("weight", AttributeRole::SensitiveAttribute, ValueKind::Numeric),
//! ])?;
//!
//! let mut records = RecordSet::new(schema);
//! records.push(SubjectId::new("0001")?, vec![Value::from("F"), Value::from(61.2)])?;
//! assert_eq!(records.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{AnonymizationError, KanonError};
pub use ids::{SubjectId, SubjectIdGenerator};
pub use record::{Attribute, AttributeRole, Record, RecordSet, Schema, Value, ValueKind};
pub use result::{AnonResult, Result};
