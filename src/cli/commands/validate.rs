//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Kanon configuration file.

use super::{EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use crate::config::load_config;
use crate::domain::AttributeRole;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading validates as well
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        match config.application.seed {
            Some(seed) => println!("  Seed: {seed}"),
            None => println!("  Seed: (random)"),
        }
        println!("  Input: {}", config.input.path.display());
        for role in [
            AttributeRole::DirectIdentifier,
            AttributeRole::QuasiIdentifier,
            AttributeRole::SensitiveAttribute,
            AttributeRole::ExposureVariable,
        ] {
            let names: Vec<&str> = config
                .input
                .attributes
                .iter()
                .filter(|a| a.role == role)
                .map(|a| a.name.as_str())
                .collect();
            if !names.is_empty() {
                println!("    {role}: {}", names.join(", "));
            }
        }
        if !config.lookups.is_empty() {
            let names: Vec<&str> = config.lookups.keys().map(String::as_str).collect();
            println!("  Lookups: {}", names.join(", "));
        }
        println!("  Dataset Directory: {}", config.output.dataset_dir.display());
        println!("  Codebook Directory: {}", config.output.codebook_dir.display());
        println!(
            "  Audit Log: {}",
            if config.audit.enabled {
                config.audit.log_path.display().to_string()
            } else {
                "disabled".to_string()
            }
        );
        println!("  Views:");
        for view in &config.views {
            println!(
                "    {} (k >= {}, quasi-identifiers: {}, {} step(s))",
                view.name,
                view.k_target,
                view.quasi_identifiers.join(", "),
                view.steps.len()
            );
        }
        println!();

        Ok(EXIT_SUCCESS)
    }
}
