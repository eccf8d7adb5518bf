//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{EXIT_CONFIG_ERROR, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "kanon.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Kanon configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG_ERROR);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Declare your input columns and their roles in [input]");
                println!("  2. Point [lookups] at your region lookup tables");
                println!("  3. Define one [[views]] entry per recipient");
                println!("  4. Validate configuration: kanon validate-config");
                println!(
                    "  5. Check raw re-identification risk: \
                     kanon inspect --quasi-identifiers gender,postcode"
                );
                println!("  6. Preview a release: kanon anonymize --dry-run");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate the sample configuration
    pub(crate) fn generate_config() -> &'static str {
        r#"# Kanon Configuration File
# Generalization, suppression and k-anonymity verification for record releases

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Fixed seed for subject ids and pseudonyms; omit for a fresh random release
# seed = 2022

# ============================================================================
# Input Dataset
# ============================================================================
[input]
# CSV file with a header row; ${VAR} references are substituted
path = "data/participants.csv"

# Roles: direct_identifier | quasi_identifier | sensitive_attribute | exposure_variable
# Kinds: categorical | numeric | text | date
attributes = [
    { name = "surname", role = "direct_identifier", kind = "text" },
    { name = "phone", role = "direct_identifier", kind = "text" },
    { name = "gender", role = "quasi_identifier", kind = "categorical" },
    { name = "birthdate", role = "quasi_identifier", kind = "date" },
    { name = "postcode", role = "quasi_identifier", kind = "categorical" },
    { name = "ethnicity", role = "quasi_identifier", kind = "categorical" },
    { name = "weight", role = "sensitive_attribute", kind = "numeric" },
    { name = "treatment", role = "exposure_variable", kind = "categorical" },
]

# ============================================================================
# Lookup Tables
# ============================================================================
[lookups.uk_regions]
path = "data/postcode_regions.csv"
code_column = "Postcode area"
region_column = "Country"

# ============================================================================
# Output
# ============================================================================
[output]
# Released datasets
dataset_dir = "release"

# Codebooks and the identifier key; never share with recipients
codebook_dir = "restricted"

write_identifier_key = true

# ============================================================================
# Audit Trail
# ============================================================================
[audit]
enabled = true
log_path = "./audit/releases.log"
json_format = true

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
local_enabled = false
local_path = "./logs"
# daily | hourly | never
local_rotation = "daily"

# ============================================================================
# Recipient Views
# ============================================================================
[[views]]
name = "researchers"
k_target = 3
quasi_identifiers = ["gender", "age", "ethnicity"]
max_suppression_rate = 0.05

[[views.steps]]
attribute = "birthdate"
output = "age"
op = "derive_age"
reference_year = 2022

[[views.steps]]
attribute = "age"
op = "quantile_bin"
q = 4

[[views.steps]]
attribute = "postcode"
op = "drop"

[[views.steps]]
attribute = "gender"
op = "encode_categories"
codes = { Female = "1", Male = "2", Other = "3" }

[[views.steps]]
attribute = "ethnicity"
op = "pool_rare"
min_count = 5
label = "Other"

[[views.steps]]
attribute = "weight"
op = "standardize"
deviation = "sample"

[[views.steps]]
attribute = "treatment"
op = "pseudonymize"
scheme = { type = "alphabet" }

[[views]]
name = "government"
k_target = 5
quasi_identifiers = ["gender", "age", "region"]

[[views.steps]]
attribute = "postcode"
output = "region"
op = "postcode_area"

[[views.steps]]
attribute = "region"
op = "geo_rollup"
lookup = "uk_regions"

[[views.steps]]
attribute = "birthdate"
output = "age"
op = "derive_age"
reference_year = 2022

[[views.steps]]
attribute = "age"
op = "fixed_bin"
edges = [0, 18, 40, 65, 120]
labels = ["0-17", "18-39", "40-64", "65+"]
catch_all = "Unknown"

[[views.steps]]
attribute = "ethnicity"
op = "drop"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use tempfile::TempDir;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "kanon.toml".to_string(),
            force: false,
        };

        assert_eq!(args.output, "kanon.toml");
        assert!(!args.force);
    }

    #[test]
    fn test_generated_config_parses() {
        let config = parse_config(InitArgs::generate_config()).unwrap();
        assert_eq!(config.views.len(), 2);
        assert_eq!(config.input.direct_identifiers(), vec!["surname", "phone"]);
        assert!(config.lookups.contains_key("uk_regions"));
    }

    #[test]
    fn test_existing_file_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kanon.toml");
        fs::write(&path, "# keep me").unwrap();

        let args = InitArgs {
            output: path.to_str().unwrap().to_string(),
            force: false,
        };
        assert_eq!(args.execute().unwrap(), EXIT_CONFIG_ERROR);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# keep me");

        let forced = InitArgs { force: true, ..args };
        assert_eq!(forced.execute().unwrap(), EXIT_SUCCESS);
        assert!(fs::read_to_string(&path).unwrap().contains("[[views]]"));
    }
}
