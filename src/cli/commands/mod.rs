//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod anonymize;
pub mod init;
pub mod inspect;
pub mod validate;

use crate::adapters::{load_lookup, load_records};
use crate::anonymization::GeoLookup;
use crate::config::KanonConfig;
use crate::domain::{KanonError, RecordSet, Result};
use rand::Rng;

/// Exit code for a successful run
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for configuration and input validation errors
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// Exit code when at least one view could not be released
pub const EXIT_ANONYMIZATION_FAILURE: i32 = 3;
/// Exit code for I/O and other fatal errors
pub const EXIT_FATAL: i32 = 5;

/// Map an error to the process exit code
pub fn exit_code(error: &KanonError) -> i32 {
    match error {
        KanonError::Configuration(_) | KanonError::Validation(_) => EXIT_CONFIG_ERROR,
        KanonError::Anonymization { .. } => EXIT_ANONYMIZATION_FAILURE,
        KanonError::Io(_) | KanonError::Serialization(_) | KanonError::Other(_) => EXIT_FATAL,
    }
}

/// Read the configured input file against the configured schema
fn load_input<R: Rng + ?Sized>(config: &KanonConfig, rng: &mut R) -> Result<RecordSet> {
    let schema = config.schema().map_err(KanonError::Configuration)?;
    load_records(&config.input.path, &schema, rng)
}

/// Read every configured lookup table
fn load_lookups(config: &KanonConfig) -> Result<Vec<GeoLookup>> {
    config
        .lookups
        .iter()
        .map(|(name, lookup)| {
            load_lookup(&lookup.path, name, &lookup.code_column, &lookup.region_column)
        })
        .collect()
}
