//! File adapters for Kanon.
//!
//! - [`csv`] - reading raw record sets and geographic lookup tables
//! - [`export`] - writing anonymized datasets, codebooks and the identifier key
//!
//! Adapters convert between files and the domain [`RecordSet`](crate::domain::RecordSet).
//! The anonymization layer never touches the filesystem for data; it only sees
//! record sets and lookup tables.

pub mod csv;
pub mod export;

pub use self::csv::{load_lookup, load_records, read_lookup, read_records};
pub use export::{write_codebook, write_dataset, write_identifier_key};
