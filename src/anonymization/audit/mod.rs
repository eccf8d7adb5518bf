//! Audit logging module
//!
//! Records every release in an append-only log. Suppressed subjects appear only
//! as SHA-256 hashes; codebook contents never appear.

pub mod logger;

pub use logger::AuditLogger;
