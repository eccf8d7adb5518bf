//! Audit logger for dataset releases

use crate::anonymization::session::SessionOutcome;
use crate::config::AuditConfig;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Audit log entry for one released view
#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    view: String,
    input_records: usize,
    released_records: usize,
    k_target: usize,
    k_before: usize,
    k_after: usize,
    dry_run: bool,
    /// SHA-256 of each suppressed subject id (never the id itself)
    suppressed_subjects: Vec<String>,
    /// Attributes with reverse mappings; the mappings themselves stay out of the log
    codebook_attributes: Vec<String>,
}

/// Append-only audit trail of releases
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    /// Create a logger from the `[audit]` section
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        Self::new(config.log_path.clone(), config.json_format, config.enabled)
    }

    /// Record one view release
    pub fn log_release(&self, outcome: &SessionOutcome, dry_run: bool) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let report = &outcome.report;
        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            view: outcome.dataset.view.clone(),
            input_records: report.input_records,
            released_records: report.released_records,
            k_target: report.k_target,
            k_before: report.k_before,
            k_after: report.k_after,
            dry_run,
            suppressed_subjects: outcome
                .dataset
                .suppressed_ids
                .iter()
                .map(|id| hash_value(id.as_str()))
                .collect(),
            codebook_attributes: report.codebook_attributes.clone(),
        };

        self.write_entry(&entry)
    }

    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            writeln!(
                file,
                "[{}] View: {} | Released: {}/{} | k: {} -> {} (target {}) | Suppressed: {}{}",
                entry.timestamp,
                entry.view,
                entry.released_records,
                entry.input_records,
                entry.k_before,
                entry.k_after,
                entry.k_target,
                entry.suppressed_subjects.len(),
                if entry.dry_run { " | dry run" } else { "" }
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}

/// Hash a value using SHA-256
fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::session::{AnonymizationSession, RecipientView};
    use crate::domain::{Attribute, AttributeRole, RecordSet, Schema, SubjectId, Value, ValueKind};
    use tempfile::tempdir;

    fn outcome() -> SessionOutcome {
        let schema = Schema::new(vec![Attribute::new(
            "gender",
            AttributeRole::QuasiIdentifier,
            ValueKind::Categorical,
        )])
        .unwrap();
        let mut records = RecordSet::new(schema);
        for (id, gender) in [("subject-a", "F"), ("subject-b", "F"), ("subject-c", "M")] {
            records
                .push(SubjectId::new(id).unwrap(), vec![Value::from(gender)])
                .unwrap();
        }
        let view = RecipientView::new("researchers", 2, vec!["gender".to_string()]);
        AnonymizationSession::new().run(&records, &view).unwrap()
    }

    #[test]
    fn test_hash_value() {
        assert_eq!(hash_value("subject-c"), hash_value("subject-c"));
        assert_ne!(hash_value("subject-c"), hash_value("subject-d"));
        assert_eq!(hash_value("").len(), 64);
    }

    #[test]
    fn test_log_release_hashes_suppressed_ids() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit").join("releases.log");
        let logger = AuditLogger::new(log_path.clone(), true, true).unwrap();

        logger.log_release(&outcome(), false).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        let entry: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(entry["view"], "researchers");
        assert_eq!(entry["k_after"], 2);
        assert_eq!(entry["suppressed_subjects"][0], hash_value("subject-c"));
        assert!(!content.contains("subject-c"));
    }

    #[test]
    fn test_plain_text_format_appends() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("releases.log");
        let logger = AuditLogger::new(log_path.clone(), false, true).unwrap();

        logger.log_release(&outcome(), true).unwrap();
        logger.log_release(&outcome(), true).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("View: researchers | Released: 2/3"));
        assert!(content.contains("dry run"));
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("releases.log");
        let logger = AuditLogger::new(log_path.clone(), true, false).unwrap();

        logger.log_release(&outcome(), false).unwrap();
        assert!(!log_path.exists());
    }
}
