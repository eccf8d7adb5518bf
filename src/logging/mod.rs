//! Logging and observability
//!
//! Structured logging through `tracing`, with:
//! - Configurable log levels
//! - Human-readable console output
//! - Optional JSON log files with daily or hourly rotation
//!
//! # Example
//!
//! ```no_run
//! use kanon::logging::init_logging;
//! use kanon::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(view = "researchers", "Release started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a recipient view release
///
/// # Example
///
/// ```no_run
/// use kanon::log_view_start;
///
/// log_view_start!("researchers", 3, 1200);
/// ```
#[macro_export]
macro_rules! log_view_start {
    ($view:expr, $k_target:expr, $records:expr) => {
        tracing::info!(
            view = %$view,
            k_target = $k_target,
            records = $records,
            "Starting view release"
        );
    };
}

/// Log the completion of a recipient view release
///
/// # Example
///
/// ```no_run
/// use kanon::log_view_complete;
/// use std::time::Duration;
///
/// log_view_complete!("government", 5, 1180, Duration::from_millis(42));
/// ```
#[macro_export]
macro_rules! log_view_complete {
    ($view:expr, $k:expr, $released:expr, $duration:expr) => {
        tracing::info!(
            view = %$view,
            k = $k,
            released = $released,
            duration_ms = $duration.as_millis(),
            "View release completed"
        );
    };
}

/// Log a suppression pass
///
/// # Example
///
/// ```no_run
/// use kanon::log_suppression;
///
/// log_suppression!("government", 1, 3, 20);
/// ```
#[macro_export]
macro_rules! log_suppression {
    ($view:expr, $k_before:expr, $k_target:expr, $suppressed:expr) => {
        tracing::warn!(
            view = %$view,
            k_before = $k_before,
            k_target = $k_target,
            suppressed = $suppressed,
            "Suppressing records below k target"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use kanon::log_error_with_context;
/// use kanon::domain::KanonError;
///
/// let error = KanonError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::KanonError;
    use std::time::Duration;

    #[test]
    fn test_macros_expand() {
        let error = KanonError::Validation("bad row".to_string());
        crate::log_view_start!("researchers", 2, 10);
        crate::log_suppression!("researchers", 1, 2, 3);
        crate::log_view_complete!("researchers", 2, 7, Duration::from_millis(5));
        crate::log_error_with_context!(&error, "loading input");
    }
}
