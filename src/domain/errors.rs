//! Domain error types
//!
//! All errors surfaced by the library are expressed through [`MedmaskError`].
//! Third-party error types are converted at the boundary and never leak out.

use thiserror::Error;

/// Main medmask error type
#[derive(Debug, Error)]
pub enum MedmaskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The entity recognizer could not produce spans for a text
    #[error("Recognition unavailable: {0}")]
    RecognitionUnavailable(String),

    /// Record storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MedmaskError {
    /// Whether this error means the recognizer failed (as opposed to a local fault)
    pub fn is_recognition_unavailable(&self) -> bool {
        matches!(self, Self::RecognitionUnavailable(_))
    }
}

impl From<std::io::Error> for MedmaskError {
    fn from(err: std::io::Error) -> Self {
        MedmaskError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MedmaskError {
    fn from(err: serde_json::Error) -> Self {
        MedmaskError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for MedmaskError {
    fn from(err: toml::de::Error) -> Self {
        MedmaskError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<sqlx::Error> for MedmaskError {
    fn from(err: sqlx::Error) -> Self {
        MedmaskError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MedmaskError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");

        let err = MedmaskError::RecognitionUnavailable("endpoint down".to_string());
        assert_eq!(err.to_string(), "Recognition unavailable: endpoint down");
    }

    #[test]
    fn test_is_recognition_unavailable() {
        assert!(MedmaskError::RecognitionUnavailable("x".to_string()).is_recognition_unavailable());
        assert!(!MedmaskError::Storage("x".to_string()).is_recognition_unavailable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: MedmaskError = io_err.into();
        assert!(matches!(err, MedmaskError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: MedmaskError = json_err.into();
        assert!(matches!(err, MedmaskError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: MedmaskError = toml_err.into();
        assert!(matches!(err, MedmaskError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: MedmaskError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, MedmaskError::Storage(_)));
    }

    #[test]
    fn test_implements_std_error() {
        let err = MedmaskError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
