// Kanon - k-anonymity generalization, suppression and verification engine
// Copyright (c) 2025 Kanon Contributors
// Licensed under the MIT License

//! # Kanon - k-anonymous dataset releases
//!
//! Kanon turns a raw table of personal records into per-recipient releases that
//! satisfy k-anonymity over a declared quasi-identifier tuple.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Generalizing** attributes (banding, category rollup, geographic rollup,
//!   coding, pseudonyms, standardization)
//! - **Verifying** k over equivalence classes of quasi-identifier values
//! - **Suppressing** records in classes below the target k
//! - **Recording** reverse mappings in a codebook kept apart from the release
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`anonymization`] - Generalization, equivalence analysis, suppression and sessions
//! - [`adapters`] - CSV input and release output
//! - [`domain`] - Records, schema, subject ids and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kanon::adapters::load_records;
//! use kanon::anonymization::AnonymizationSession;
//! use kanon::config::load_config;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("kanon.toml")?;
//! let mut rng = StdRng::seed_from_u64(7);
//! let records = load_records(&config.input.path, &config.schema()?, &mut rng)?;
//!
//! let session = AnonymizationSession::new().with_seed(Some(7));
//! for view in &config.views {
//!     let outcome = session.run(&records, view)?;
//!     println!("{}: k = {}", view.name, outcome.dataset.k);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`] (application errors) or
//! [`domain::AnonResult`] (anonymization failures). Every failure aborts the
//! operation; no partially transformed record set is ever returned.

pub mod adapters;
pub mod anonymization;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;

// Re-export commonly used types
pub use domain::{AnonymizationError, KanonError, Result};
