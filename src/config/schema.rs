//! Configuration schema types
//!
//! This module defines the configuration structure for Kanon.

use crate::anonymization::pipeline::Generalization;
use crate::anonymization::session::RecipientView;
use crate::domain::{Attribute, AttributeRole, Schema};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

/// Main Kanon configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KanonConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Raw dataset and its attribute schema
    pub input: InputConfig,

    /// Geographic lookup tables, by name
    #[serde(default)]
    pub lookups: BTreeMap<String, LookupConfig>,

    /// Release destinations
    pub output: OutputConfig,

    /// Release audit trail
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Recipient views to release
    #[serde(default)]
    pub views: Vec<RecipientView>,
}

impl KanonConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.input.validate()?;
        for (name, lookup) in &self.lookups {
            lookup.validate(name)?;
        }
        self.output.validate()?;
        self.audit.validate()?;
        self.logging.validate()?;

        if self.views.is_empty() {
            return Err("at least one [[views]] entry is required".to_string());
        }
        let mut names = HashSet::new();
        for view in &self.views {
            view.validate()?;
            if !names.insert(view.name.as_str()) {
                return Err(format!("duplicate view name '{}'", view.name));
            }
            self.validate_view_columns(view)?;
        }
        Ok(())
    }

    /// Attribute schema of the input dataset
    pub fn schema(&self) -> Result<Schema, String> {
        Schema::new(self.input.attributes.clone()).map_err(|e| e.to_string())
    }

    /// Look up a view by name
    pub fn view(&self, name: &str) -> Option<&RecipientView> {
        self.views.iter().find(|v| v.name == name)
    }

    /// Trace the columns a view produces through its steps and check every
    /// step input, lookup reference and quasi-identifier resolves
    fn validate_view_columns(&self, view: &RecipientView) -> Result<(), String> {
        let mut columns: Vec<String> = match &view.columns {
            Some(columns) => {
                for column in columns {
                    if !self.input.attributes.iter().any(|a| &a.name == column) {
                        return Err(format!(
                            "view '{}': column '{}' is not an input attribute",
                            view.name, column
                        ));
                    }
                }
                columns.clone()
            }
            None => self
                .input
                .attributes
                .iter()
                .filter(|a| view.include_roles.contains(&a.role))
                .map(|a| a.name.clone())
                .collect(),
        };

        for step in &view.steps {
            let position = columns
                .iter()
                .position(|c| c == &step.attribute)
                .ok_or_else(|| {
                    format!(
                        "view '{}': step '{}' reads unknown attribute '{}'",
                        view.name,
                        step.op.name(),
                        step.attribute
                    )
                })?;
            if let Generalization::GeoRollup { lookup } = &step.op {
                if !self.lookups.contains_key(lookup) {
                    return Err(format!(
                        "view '{}': lookup '{}' is not defined in [lookups]",
                        view.name, lookup
                    ));
                }
            }
            if matches!(step.op, Generalization::Drop) {
                columns.remove(position);
            } else {
                columns[position] = step.output_name().to_string();
            }
        }

        for qi in &view.quasi_identifiers {
            if !columns.contains(qi) {
                return Err(format!(
                    "view '{}': quasi-identifier '{}' is not produced by the view",
                    view.name, qi
                ));
            }
        }
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seed for randomized steps; unset draws from OS entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            seed: None,
        }
    }
}

/// Raw dataset location and attribute schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// CSV file with a header row
    pub path: PathBuf,

    /// Attribute declarations, in any order
    pub attributes: Vec<Attribute>,
}

impl InputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("input.path cannot be empty".to_string());
        }
        if self.attributes.is_empty() {
            return Err("input.attributes cannot be empty".to_string());
        }
        Schema::new(self.attributes.clone()).map_err(|e| format!("input.attributes: {e}"))?;
        Ok(())
    }

    /// Names of the direct identifiers
    pub fn direct_identifiers(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|a| a.role == AttributeRole::DirectIdentifier)
            .map(|a| a.name.as_str())
            .collect()
    }
}

/// Geographic lookup table stored as CSV
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// CSV file with a header row
    pub path: PathBuf,

    /// Column holding the fine-grained code
    #[serde(default = "default_code_column")]
    pub code_column: String,

    /// Column holding the region
    #[serde(default = "default_region_column")]
    pub region_column: String,
}

impl LookupConfig {
    fn validate(&self, name: &str) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err(format!("lookups.{name}.path cannot be empty"));
        }
        if self.code_column == self.region_column {
            return Err(format!(
                "lookups.{name}: code_column and region_column must differ"
            ));
        }
        Ok(())
    }
}

/// Release destinations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving one CSV per view
    pub dataset_dir: PathBuf,

    /// Directory receiving codebooks and the identifier key; kept apart from
    /// released datasets
    pub codebook_dir: PathBuf,

    /// Write the subject id to direct identifier key file
    #[serde(default = "default_true")]
    pub write_identifier_key: bool,
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.dataset_dir.as_os_str().is_empty() || self.codebook_dir.as_os_str().is_empty() {
            return Err("output.dataset_dir and output.codebook_dir are required".to_string());
        }
        if self.dataset_dir == self.codebook_dir {
            return Err(
                "output.codebook_dir must differ from output.dataset_dir".to_string(),
            );
        }
        Ok(())
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_true")]
    pub json_format: bool,
}

impl AuditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            return Err("audit.log_path cannot be empty when audit is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_path: default_audit_log_path(),
            json_format: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_code_column() -> String {
    "code".to_string()
}

fn default_region_column() -> String {
    "region".to_string()
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/releases.log")
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
