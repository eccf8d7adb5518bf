//! Configuration management for Kanon.
//!
//! # Overview
//!
//! Kanon uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `KANON_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation of every recipient view against the input schema
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use kanon::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("kanon.toml")?;
//! for view in &config.views {
//!     println!("{}: k >= {}", view.name, view.k_target);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//! seed = 2022
//!
//! [input]
//! path = "${KANON_DATA_DIR}/participants.csv"
//! attributes = [
//!     { name = "surname", role = "direct_identifier", kind = "text" },
//!     { name = "gender", role = "quasi_identifier", kind = "categorical" },
//!     { name = "birthdate", role = "quasi_identifier", kind = "date" },
//!     { name = "weight", role = "sensitive_attribute", kind = "numeric" },
//! ]
//!
//! [output]
//! dataset_dir = "release"
//! codebook_dir = "restricted"
//!
//! [[views]]
//! name = "researchers"
//! k_target = 3
//! quasi_identifiers = ["gender", "age"]
//!
//! [[views.steps]]
//! attribute = "birthdate"
//! output = "age"
//! op = "derive_age"
//! reference_year = 2022
//!
//! [[views.steps]]
//! attribute = "age"
//! op = "quantile_bin"
//! q = 4
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, AuditConfig, InputConfig, KanonConfig, LoggingConfig, LookupConfig,
    OutputConfig,
};
