//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Kanon using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Kanon - k-anonymous dataset releases
#[derive(Parser, Debug)]
#[command(name = "kanon")]
#[command(version, about, long_about = None)]
#[command(author = "Kanon Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "kanon.toml", env = "KANON_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "KANON_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generalize, suppress and release the configured recipient views
    Anonymize(commands::anonymize::AnonymizeArgs),

    /// Report the k-anonymity of the raw input over a quasi-identifier tuple
    Inspect(commands::inspect::InspectArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Cli {
    /// Execute the selected command and return the process exit code
    pub fn execute(&self) -> anyhow::Result<i32> {
        match &self.command {
            Commands::Anonymize(args) => args.execute(&self.config),
            Commands::Inspect(args) => args.execute(&self.config),
            Commands::ValidateConfig(args) => args.execute(&self.config),
            Commands::Init(args) => args.execute(),
        }
    }
}
