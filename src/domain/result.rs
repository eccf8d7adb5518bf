//! Result type aliases for Kanon
//!
//! [`Result`] is used by configuration, adapters and sessions; the anonymization
//! core uses [`AnonResult`] so its failures stay within the anonymization
//! failure taxonomy.

use super::errors::{AnonymizationError, KanonError};

/// Result type alias for Kanon operations
///
/// # Examples
///
/// ```
/// use kanon::domain::result::Result;
/// use kanon::domain::errors::KanonError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(KanonError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, KanonError>;

/// Result type alias for anonymization core operations
pub type AnonResult<T> = std::result::Result<T, AnonymizationError>;
