//! Domain error types
//!
//! This module defines the error hierarchy for Kanon. [`AnonymizationError`]
//! carries the abort-the-operation failures raised by the generalization,
//! equivalence and suppression layers; [`KanonError`] is the application-level
//! error that wraps them with the recipient view they occurred in.
//!
//! None of these errors is retried: every transformation is deterministic, so a
//! retry would reproduce the same failure.

use thiserror::Error;

/// Main Kanon error type
///
/// This is the primary error type used by configuration loading, adapters and
/// session orchestration.
#[derive(Debug, Error)]
pub enum KanonError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A named anonymization failure for one recipient view
    #[error("Anonymization of view '{view}' failed: {source}")]
    Anonymization {
        /// Recipient view being produced when the failure occurred
        view: String,
        /// Underlying failure
        #[source]
        source: AnonymizationError,
    },

    /// Input validation errors (schema mismatch, malformed rows)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl KanonError {
    /// Wraps an [`AnonymizationError`] with the view it was raised for
    pub fn anonymization(view: impl Into<String>, source: AnonymizationError) -> Self {
        Self::Anonymization {
            view: view.into(),
            source,
        }
    }
}

/// Anonymization failures
///
/// Every variant aborts the operation that raised it. A pipeline never
/// publishes a partially transformed record set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnonymizationError {
    /// Not enough distinct values to form the requested bands
    #[error(
        "Insufficient data for '{attribute}': {required} distinct values required, \
         {distinct} available"
    )]
    InsufficientData {
        /// Attribute being transformed
        attribute: String,
        /// Distinct values available
        distinct: usize,
        /// Bands (or values) required
        required: usize,
    },

    /// A value fell outside every configured band
    #[error("Value '{value}' of '{attribute}' is out of range: {reason}")]
    OutOfRange {
        /// Attribute being transformed
        attribute: String,
        /// Offending value
        value: String,
        /// Which boundary was violated
        reason: String,
    },

    /// A category has no entry in the configured mapping or lookup table
    #[error("Category '{value}' of '{attribute}' is not mapped")]
    UnmappedCategory {
        /// Attribute being transformed
        attribute: String,
        /// Offending category
        value: String,
    },

    /// Standardization of a column with zero standard deviation
    #[error("Column '{attribute}' is degenerate: standard deviation is zero")]
    DegenerateColumn {
        /// Attribute being standardized
        attribute: String,
    },

    /// Direct identifiers reached the transformation pipeline
    #[error("Direct identifiers present in pipeline input: {}", attributes.join(", "))]
    DirectIdentifierLeak {
        /// Direct identifier attributes that were found
        attributes: Vec<String>,
    },

    /// An operation that needs at least one record received none
    #[error("Record set is empty")]
    EmptyDataset,

    /// An attribute referenced by configuration does not exist
    #[error("Unknown attribute: {attribute}")]
    UnknownAttribute {
        /// Missing attribute name
        attribute: String,
    },

    /// A value had the wrong type for the requested operation
    #[error("Attribute '{attribute}' expected {expected} values, found {found}")]
    TypeMismatch {
        /// Attribute being transformed
        attribute: String,
        /// Expected value kind
        expected: &'static str,
        /// Actual value rendering
        found: String,
    },

    /// A value could not be interpreted by the operation
    #[error("Malformed value '{value}' for '{attribute}'")]
    Malformed {
        /// Attribute being transformed
        attribute: String,
        /// Offending value
        value: String,
    },

    /// An operation was configured with invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for KanonError {
    fn from(err: std::io::Error) -> Self {
        KanonError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for KanonError {
    fn from(err: serde_json::Error) -> Self {
        KanonError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for KanonError {
    fn from(err: toml::de::Error) -> Self {
        KanonError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv errors
impl From<csv::Error> for KanonError {
    fn from(err: csv::Error) -> Self {
        KanonError::Validation(format!("CSV error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kanon_error_display() {
        let err = KanonError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_anonymization_error_wrapped_with_view() {
        let err = KanonError::anonymization(
            "government",
            AnonymizationError::UnmappedCategory {
                attribute: "postcode".to_string(),
                value: "ZZ".to_string(),
            },
        );
        let message = err.to_string();
        assert!(message.contains("government"));
        assert!(message.contains("'ZZ'"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_direct_identifier_leak_lists_attributes() {
        let err = AnonymizationError::DirectIdentifierLeak {
            attributes: vec!["surname".to_string(), "phone_number".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Direct identifiers present in pipeline input: surname, phone_number"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: KanonError = io_err.into();
        assert!(matches!(err, KanonError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: KanonError = json_err.into();
        assert!(matches!(err, KanonError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: KanonError = toml_err.into();
        assert!(matches!(err, KanonError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
