//! CSV input: raw record sets and geographic lookup tables
//!
//! Headers are matched to schema attributes by name after trimming whitespace
//! and a leading byte-order mark. Every record receives a fresh [`SubjectId`]
//! drawn from the supplied random source; ids are never derived from the
//! record's own values.

use crate::anonymization::generalize::GeoLookup;
use crate::domain::{KanonError, RecordSet, Result, Schema, SubjectIdGenerator, Value};
use csv::ReaderBuilder;
use rand::Rng;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Load a raw record set from a CSV file
///
/// # Errors
///
/// [`KanonError::Validation`] if a schema attribute has no column or a cell
/// cannot be parsed as its attribute's kind; [`KanonError::Io`] if the file
/// cannot be read.
pub fn load_records<R>(path: &Path, schema: &Schema, rng: &mut R) -> Result<RecordSet>
where
    R: Rng + ?Sized,
{
    let file = std::fs::File::open(path).map_err(|e| {
        KanonError::Io(format!("Failed to open input {}: {}", path.display(), e))
    })?;
    let records = read_records(file, schema, rng)?;
    tracing::info!(
        path = %path.display(),
        records = records.len(),
        attributes = schema.len(),
        "Loaded input dataset"
    );
    Ok(records)
}

/// Read a raw record set from any CSV source
pub fn read_records<S, R>(source: S, schema: &Schema, rng: &mut R) -> Result<RecordSet>
where
    S: Read,
    R: Rng + ?Sized,
{
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(source);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let positions = schema
        .attributes()
        .iter()
        .map(|attribute| {
            headers
                .iter()
                .position(|h| h == &attribute.name)
                .ok_or_else(|| {
                    KanonError::Validation(format!(
                        "input has no column for attribute '{}'",
                        attribute.name
                    ))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let ignored: Vec<&str> = headers
        .iter()
        .filter(|h| schema.index_of(h).is_none())
        .map(String::as_str)
        .collect();
    if !ignored.is_empty() {
        tracing::warn!(columns = ?ignored, "Ignoring input columns without a declared attribute");
    }

    let mut ids = SubjectIdGenerator::new();
    let mut records = RecordSet::new(schema.clone());
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let line = row + 2;
        let values = schema
            .attributes()
            .iter()
            .zip(&positions)
            .map(|(attribute, &position)| {
                let raw = record.get(position).unwrap_or("");
                Value::parse(attribute.kind, raw).map_err(|reason| {
                    KanonError::Validation(format!(
                        "line {line}, column '{}': {reason}",
                        attribute.name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        records
            .push(ids.next_id(rng), values)
            .map_err(|e| KanonError::Validation(format!("line {line}: {e}")))?;
    }

    Ok(records)
}

/// Load a geographic lookup table from a CSV file
///
/// # Errors
///
/// [`KanonError::Validation`] for missing columns or a code mapped to two
/// different regions.
pub fn load_lookup(
    path: &Path,
    name: &str,
    code_column: &str,
    region_column: &str,
) -> Result<GeoLookup> {
    let file = std::fs::File::open(path).map_err(|e| {
        KanonError::Io(format!("Failed to open lookup {}: {}", path.display(), e))
    })?;
    let lookup = read_lookup(file, name, code_column, region_column)?;
    tracing::debug!(lookup = name, entries = lookup.len(), "Loaded lookup table");
    Ok(lookup)
}

/// Read a geographic lookup table from any CSV source
pub fn read_lookup<S: Read>(
    source: S,
    name: &str,
    code_column: &str,
    region_column: &str,
) -> Result<GeoLookup> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(source);
    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let column = |wanted: &str| {
        headers.iter().position(|h| h == wanted).ok_or_else(|| {
            KanonError::Validation(format!("lookup '{name}' has no column '{wanted}'"))
        })
    };
    let code_index = column(code_column)?;
    let region_index = column(region_column)?;

    let mut regions: BTreeMap<String, String> = BTreeMap::new();
    for result in reader.records() {
        let record = result?;
        let code = record.get(code_index).unwrap_or("").trim();
        let region = record.get(region_index).unwrap_or("").trim();
        if code.is_empty() {
            continue;
        }
        if let Some(existing) = regions.get(code) {
            if existing != region {
                return Err(KanonError::Validation(format!(
                    "lookup '{name}' maps '{code}' to both '{existing}' and '{region}'"
                )));
            }
            continue;
        }
        regions.insert(code.to_string(), region.to_string());
    }

    Ok(GeoLookup::new(name, regions))
}

fn normalize_header(header: &str) -> String {
    header.trim_matches('\u{feff}').trim().to_string()
}
