//! Release artifacts: anonymized dataset, codebook and identifier key
//!
//! The dataset and the codebook go to different directories. The dataset is
//! the public artifact; the codebook and identifier key stay with the data
//! controller.

use crate::anonymization::{AnonymizedDataset, Codebook};
use crate::domain::{AttributeRole, KanonError, RecordSet, Result};
use csv::Writer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Column holding the subject key in written CSV files
pub const SUBJECT_ID_COLUMN: &str = "subject_id";

/// File name of the identifier key
pub const IDENTIFIER_KEY_FILE: &str = "direct_identifiers.csv";

/// Usage notes written at the top of every codebook file
#[derive(Debug, Serialize)]
struct CodebookInstructions {
    categorical_variables: &'static str,
    continuous_variables: &'static str,
    pseudonymized_variables: &'static str,
    banded_variables: &'static str,
    publication: &'static str,
}

const INSTRUCTIONS: CodebookInstructions = CodebookInstructions {
    categorical_variables: "Coding information can be found in this file",
    continuous_variables:
        "Standardised: mean and standard deviation can be found in this file \
         to reverse to original values",
    pseudonymized_variables: "Token to original value mapping can be found in this file",
    banded_variables: "Band boundaries can be found in this file",
    publication: "Remove 'subject_id' before publishing the dataset",
};

#[derive(Debug, Serialize)]
struct CodebookFile<'a> {
    instructions: &'a CodebookInstructions,
    view: &'a str,
    attributes: BTreeMap<String, BTreeMap<String, String>>,
}

/// Write the released records of a view to `<dir>/<view>.csv`
///
/// The subject key comes first so the dataset can be joined back to the
/// identifier key by the data controller.
pub fn write_dataset(dir: &Path, dataset: &AnonymizedDataset) -> Result<PathBuf> {
    let path = prepare(dir, &format!("{}.csv", dataset.view))?;
    write_records(&path, &dataset.records)?;
    tracing::info!(
        view = %dataset.view,
        path = %path.display(),
        records = dataset.records.len(),
        "Wrote anonymized dataset"
    );
    Ok(path)
}

/// Write the codebook of a view to `<dir>/<view>_codebook.json`
pub fn write_codebook(dir: &Path, view: &str, codebook: &Codebook) -> Result<PathBuf> {
    let path = prepare(dir, &format!("{view}_codebook.json"))?;
    let file = CodebookFile {
        instructions: &INSTRUCTIONS,
        view,
        attributes: codebook.export(),
    };
    let json = serde_json::to_string_pretty(&file)?;
    std::fs::write(&path, json)
        .map_err(|e| KanonError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    tracing::info!(view, path = %path.display(), entries = codebook.len(), "Wrote codebook");
    Ok(path)
}

/// Write subject keys and direct identifiers to `<dir>/direct_identifiers.csv`
pub fn write_identifier_key(dir: &Path, records: &RecordSet) -> Result<PathBuf> {
    let path = prepare(dir, IDENTIFIER_KEY_FILE)?;
    let key = records.select_roles(&[AttributeRole::DirectIdentifier]);
    write_records(&path, &key)?;
    tracing::info!(
        path = %path.display(),
        columns = key.schema().len(),
        "Wrote identifier key"
    );
    Ok(path)
}

fn prepare(dir: &Path, file_name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| {
        KanonError::Io(format!("Failed to create directory {}: {}", dir.display(), e))
    })?;
    Ok(dir.join(file_name))
}

fn write_records(path: &Path, records: &RecordSet) -> Result<()> {
    let mut writer = Writer::from_path(path)?;

    let mut header = vec![SUBJECT_ID_COLUMN];
    header.extend(records.schema().names());
    writer.write_record(&header)?;

    for record in records.records() {
        let mut row = vec![record.subject_id().to_string()];
        row.extend(record.values().iter().map(ToString::to_string));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}
