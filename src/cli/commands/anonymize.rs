//! Anonymize command implementation
//!
//! This module implements the `anonymize` command: load the input once,
//! release every selected recipient view, then write datasets, codebooks,
//! reports and audit entries.

use super::{
    exit_code, load_input, load_lookups, EXIT_ANONYMIZATION_FAILURE, EXIT_CONFIG_ERROR,
    EXIT_SUCCESS,
};
use crate::adapters::{write_codebook, write_dataset, write_identifier_key};
use crate::anonymization::{AnonymizationSession, AuditLogger, RecipientView};
use crate::config::load_config;
use anyhow::Context;
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

/// Arguments for the anonymize command
#[derive(Args, Debug)]
pub struct AnonymizeArgs {
    /// Release only the named view (repeatable; default: all views)
    #[arg(long = "view", value_name = "NAME")]
    pub views: Vec<String>,

    /// Seed for subject ids and pseudonyms (overrides application.seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Dry run mode - compute and report without writing datasets or codebooks
    #[arg(long)]
    pub dry_run: bool,

    /// Directory to write one JSON release report per view
    #[arg(long, value_name = "DIR")]
    pub report_json: Option<PathBuf>,
}

impl AnonymizeArgs {
    /// Execute the anonymize command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting anonymize command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Configuration loading failed");
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let views = match self.select_views(&config.views) {
            Ok(v) => v,
            Err(unknown) => {
                eprintln!("❌ Unknown view(s): {}", unknown.join(", "));
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let seed = self.seed.or(config.application.seed);
        if let Some(seed) = seed {
            tracing::info!(seed, "Using fixed seed");
        }
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let records = match load_input(&config, &mut rng) {
            Ok(r) => r,
            Err(e) => {
                crate::log_error_with_context!(e, "loading input");
                eprintln!("❌ Failed to load input: {e}");
                return Ok(exit_code(&e));
            }
        };
        let lookups = match load_lookups(&config) {
            Ok(l) => l,
            Err(e) => {
                crate::log_error_with_context!(e, "loading lookups");
                eprintln!("❌ Failed to load lookup table: {e}");
                return Ok(exit_code(&e));
            }
        };

        if self.dry_run {
            tracing::info!("Dry run mode enabled - no files will be written");
            println!("🔍 DRY RUN MODE - No datasets or codebooks will be written");
            println!();
        }

        let audit = AuditLogger::from_config(&config.audit)?;
        let session = AnonymizationSession::new()
            .with_lookups(lookups)
            .with_seed(seed);

        let mut released = 0;
        let mut failed = Vec::new();
        for view in views {
            let outcome = match session.run(&records, view) {
                Ok(o) => o,
                Err(e) => {
                    crate::log_error_with_context!(e, view.name.as_str());
                    eprintln!("❌ {e}");
                    failed.push(view.name.clone());
                    continue;
                }
            };

            print!("{}", outcome.report.format_console());

            if !self.dry_run {
                write_dataset(&config.output.dataset_dir, &outcome.dataset)
                    .context("Failed to write anonymized dataset")?;
                write_codebook(&config.output.codebook_dir, &view.name, &outcome.codebook)
                    .context("Failed to write codebook")?;
            }

            if let Some(dir) = &self.report_json {
                std::fs::create_dir_all(dir).with_context(|| {
                    format!("Failed to create report directory: {}", dir.display())
                })?;
                let path = dir.join(format!("{}_report.json", view.name));
                outcome
                    .report
                    .write_to_file(&path)
                    .with_context(|| format!("Failed to write report: {}", path.display()))?;
                println!("📄 Report written to {}", path.display());
            }

            audit.log_release(&outcome, self.dry_run)?;
            released += 1;
        }

        if !self.dry_run && released > 0 && config.output.write_identifier_key {
            let path = write_identifier_key(&config.output.codebook_dir, &records)
                .context("Failed to write identifier key")?;
            println!("🔑 Identifier key written to {}", path.display());
        }

        println!();
        if failed.is_empty() {
            println!("✅ Released {released} view(s)");
            Ok(EXIT_SUCCESS)
        } else {
            println!(
                "⚠️  Released {released} view(s); failed: {}",
                failed.join(", ")
            );
            Ok(EXIT_ANONYMIZATION_FAILURE)
        }
    }

    /// Views named on the command line, or all configured views
    fn select_views<'a>(
        &self,
        configured: &'a [RecipientView],
    ) -> Result<Vec<&'a RecipientView>, Vec<String>> {
        if self.views.is_empty() {
            return Ok(configured.iter().collect());
        }

        let unknown: Vec<String> = self
            .views
            .iter()
            .filter(|name| !configured.iter().any(|v| &v.name == *name))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(unknown);
        }

        Ok(configured
            .iter()
            .filter(|v| self.views.contains(&v.name))
            .collect())
    }
}
