//! Numeric transforms: z-score standardization and age derivation

use super::{numeric_column, type_mismatch, Generalized};
use crate::anonymization::codebook::{CodebookEntry, Deviation, Standardization};
use crate::domain::{AnonResult, AnonymizationError, Value};
use chrono::Datelike;

/// Convert a numeric column to z-scores using its own mean and deviation
///
/// The mean and standard deviation are recorded as a `Standardization`
/// codebook entry so that `z * sd + mean` recovers the original values.
///
/// # Errors
///
/// - `InsufficientData` for an empty column, or fewer than two values with the
///   sample estimator
/// - `DegenerateColumn` when the standard deviation is zero
pub fn standardize(
    attribute: &str,
    values: &[Value],
    deviation: Deviation,
) -> AnonResult<Generalized> {
    let numbers = numeric_column(attribute, values)?;
    let required = match deviation {
        Deviation::Sample => 2,
        Deviation::Population => 1,
    };
    if numbers.len() < required {
        return Err(AnonymizationError::InsufficientData {
            attribute: attribute.to_string(),
            distinct: numbers.len(),
            required,
        });
    }

    let n = numbers.len() as f64;
    let mean = numbers.iter().sum::<f64>() / n;
    let squares: f64 = numbers.iter().map(|x| (x - mean).powi(2)).sum();
    let denominator = match deviation {
        Deviation::Sample => n - 1.0,
        Deviation::Population => n,
    };
    let standard_deviation = (squares / denominator).sqrt();

    if standard_deviation == 0.0 || !standard_deviation.is_finite() {
        return Err(AnonymizationError::DegenerateColumn {
            attribute: attribute.to_string(),
        });
    }

    let scores = numbers
        .iter()
        .map(|x| Value::Numeric((x - mean) / standard_deviation))
        .collect();

    Ok(Generalized::with_entry(
        scores,
        CodebookEntry::Standardization(Standardization {
            mean,
            standard_deviation,
            deviation,
        }),
    ))
}

/// Replace a date of birth by whole-year age at `reference_year`
///
/// Age is `reference_year - birth_year`, without month/day adjustment.
///
/// # Errors
///
/// - `OutOfRange` for a birth year after `reference_year`
/// - `TypeMismatch` for non-date values
pub fn derive_age(
    attribute: &str,
    values: &[Value],
    reference_year: i32,
) -> AnonResult<Generalized> {
    let ages = values
        .iter()
        .map(|value| {
            let date = value
                .as_date()
                .ok_or_else(|| type_mismatch(attribute, "date", value))?;
            let age = reference_year - date.year();
            if age < 0 {
                return Err(AnonymizationError::OutOfRange {
                    attribute: attribute.to_string(),
                    value: date.to_string(),
                    reason: format!("after reference year {reference_year}"),
                });
            }
            Ok(Value::Numeric(f64::from(age)))
        })
        .collect::<AnonResult<Vec<_>>>()?;
    Ok(Generalized::new(ages))
}
