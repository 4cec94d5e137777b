//! Logging
//!
//! Structured logging via `tracing`: a console layer on stderr and an
//! optional JSON file layer with rotation. Log records carry offsets, labels,
//! and counts. Patient text never goes into a log record.
//!
//! # Example
//!
//! ```no_run
//! use medmask::logging::init_logging;
//! use medmask::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a recognized span that the masker dropped
///
/// Only offsets, label, and reason are recorded.
///
/// # Example
///
/// ```no_run
/// use medmask::log_skipped_span;
/// use medmask::deid::{RecognizedSpan, SkipReason, SkippedSpan};
///
/// let skipped = SkippedSpan {
///     span: RecognizedSpan::new(20, 24, "PATIENT", "Anna"),
///     reason: SkipReason::OutOfBounds,
/// };
/// log_skipped_span!(&skipped);
/// ```
#[macro_export]
macro_rules! log_skipped_span {
    ($skipped:expr) => {
        tracing::warn!(
            start = $skipped.span.start,
            end = $skipped.span.end,
            label = %$skipped.span.label,
            reason = %$skipped.reason,
            "Skipping recognized span"
        );
    };
}

/// Log a stored patient record
///
/// # Example
///
/// ```no_run
/// use medmask::log_record_saved;
///
/// log_record_saved!(7, 3, 0, false);
/// ```
#[macro_export]
macro_rules! log_record_saved {
    ($id:expr, $masked:expr, $skipped:expr, $degraded:expr) => {
        tracing::info!(
            patient_id = %$id,
            masked = $masked,
            skipped = $skipped,
            degraded = $degraded,
            "Patient record saved"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use medmask::log_error_with_context;
/// use medmask::domain::MedmaskError;
///
/// let error = MedmaskError::Configuration("Invalid config".to_string());
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
