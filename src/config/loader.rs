//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::KanonConfig;
use crate::domain::errors::KanonError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into KanonConfig
/// 4. Applies environment variable overrides (KANON_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`KanonError::Configuration`] if any step fails.
///
/// # Examples
///
/// ```no_run
/// use kanon::config::loader::load_config;
///
/// let config = load_config("kanon.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<KanonConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(KanonError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        KanonError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses and validates configuration text
pub fn parse_config(contents: &str) -> Result<KanonConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: KanonConfig = toml::from_str(&contents)
        .map_err(|e| KanonError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        KanonError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| KanonError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(KanonError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Read and parse an override variable, failing on unparsable values
fn env_override<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val
            .parse()
            .map(Some)
            .map_err(|_| KanonError::Configuration(format!("Invalid {name} value: {val}"))),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using KANON_* prefix
///
/// Variables follow the pattern `KANON_<SECTION>_<KEY>`, for example
/// `KANON_OUTPUT_DATASET_DIR` or `KANON_APPLICATION_SEED`.
fn apply_env_overrides(config: &mut KanonConfig) -> Result<()> {
    if let Some(val) = env_override::<String>("KANON_APPLICATION_LOG_LEVEL")? {
        config.application.log_level = val;
    }
    if let Some(seed) = env_override::<u64>("KANON_APPLICATION_SEED")? {
        config.application.seed = Some(seed);
    }

    if let Some(path) = env_override::<PathBuf>("KANON_INPUT_PATH")? {
        config.input.path = path;
    }

    if let Some(dir) = env_override::<PathBuf>("KANON_OUTPUT_DATASET_DIR")? {
        config.output.dataset_dir = dir;
    }
    if let Some(dir) = env_override::<PathBuf>("KANON_OUTPUT_CODEBOOK_DIR")? {
        config.output.codebook_dir = dir;
    }
    if let Some(write) = env_override::<bool>("KANON_OUTPUT_WRITE_IDENTIFIER_KEY")? {
        config.output.write_identifier_key = write;
    }

    if let Some(enabled) = env_override::<bool>("KANON_AUDIT_ENABLED")? {
        config.audit.enabled = enabled;
    }
    if let Some(path) = env_override::<PathBuf>("KANON_AUDIT_LOG_PATH")? {
        config.audit.log_path = path;
    }
    if let Some(json) = env_override::<bool>("KANON_AUDIT_JSON_FORMAT")? {
        config.audit.json_format = json;
    }

    if let Some(enabled) = env_override::<bool>("KANON_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = enabled;
    }
    if let Some(path) = env_override::<String>("KANON_LOGGING_LOCAL_PATH")? {
        config.logging.local_path = path;
    }

    Ok(())
}
