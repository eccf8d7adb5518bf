//! Generalization library
//!
//! Side-effect-free, attribute-level transforms that reduce the cardinality of a
//! column. Each operation takes the attribute name (for error reporting) and the
//! column's values, and returns the transformed column plus an optional
//! [`CodebookEntry`] describing how to undo it.
//!
//! Operations fail loudly rather than pass a value through unmodified: an
//! untransformed high-cardinality value would silently break the k-anonymity
//! guarantee of the release.
//!
//! # Examples
//!
//! ```
//! use kanon::anonymization::generalize::{collapse_categories, quantile_bin};
//! use kanon::domain::Value;
//! use std::collections::BTreeMap;
//!
//! let ages: Vec<Value> = [21.0, 34.0, 47.0, 62.0].into_iter().map(Value::from).collect();
//! let banded = quantile_bin("age", &ages, 2, None)?;
//! assert_eq!(banded.values[0], Value::from("[21, 40.5]"));
//!
//! let mapping = BTreeMap::from([
//!     ("primary".to_string(), "school".to_string()),
//!     ("bachelor".to_string(), "college".to_string()),
//! ]);
//! let levels = vec![Value::from("primary"), Value::from("other")];
//! assert!(collapse_categories("education_level", &levels, &mapping).is_err());
//! # Ok::<(), kanon::domain::AnonymizationError>(())
//! ```

mod binning;
mod categorical;
mod numeric;
mod pseudonym;

pub use binning::{fixed_bin, quantile_bin};
pub use categorical::{
    collapse_categories, encode_categories, geo_rollup, pool_rare, postcode_area, GeoLookup,
};
pub use numeric::{derive_age, standardize};
pub use pseudonym::{pseudonymize, PseudonymScheme};

use crate::anonymization::codebook::CodebookEntry;
use crate::domain::{AnonResult, AnonymizationError, Value};

/// Output of a generalization operation
#[derive(Debug, Clone, PartialEq)]
pub struct Generalized {
    /// Transformed column, in input order
    pub values: Vec<Value>,
    /// Reverse-mapping metadata, when the operation has any
    pub entry: Option<CodebookEntry>,
}

impl Generalized {
    fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            entry: None,
        }
    }

    fn with_entry(values: Vec<Value>, entry: CodebookEntry) -> Self {
        Self {
            values,
            entry: Some(entry),
        }
    }
}

/// Extract a numeric column, rejecting non-numeric and non-finite values
fn numeric_column(attribute: &str, values: &[Value]) -> AnonResult<Vec<f64>> {
    values
        .iter()
        .map(|v| match v.as_f64() {
            Some(n) if n.is_finite() => Ok(n),
            Some(n) => Err(AnonymizationError::Malformed {
                attribute: attribute.to_string(),
                value: n.to_string(),
            }),
            None => Err(type_mismatch(attribute, "numeric", v)),
        })
        .collect()
}

/// Extract a categorical column, rejecting missing and non-label values
fn category_column<'a>(attribute: &str, values: &'a [Value]) -> AnonResult<Vec<&'a str>> {
    values
        .iter()
        .map(|v| {
            v.as_category()
                .ok_or_else(|| type_mismatch(attribute, "categorical", v))
        })
        .collect()
}

fn type_mismatch(attribute: &str, expected: &'static str, found: &Value) -> AnonymizationError {
    let found = match found {
        Value::Missing => "missing value".to_string(),
        other => format!("{} value '{}'", other.kind_name(), other),
    };
    AnonymizationError::TypeMismatch {
        attribute: attribute.to_string(),
        expected,
        found,
    }
}
