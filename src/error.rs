//! Error types for Audial
//!
//! This module defines the error types used by the fallible edges of the
//! application (configuration, dataset files, session storage), using
//! `thiserror` for ergonomic error handling.
//!
//! Parsing and validation of generated pattern scripts never produce these
//! errors: rejected model output is an expected outcome and is reported as
//! data (`ParsedOutput`, `ValidationResult`).

use thiserror::Error;

/// Main error type for Audial operations
#[derive(Error, Debug)]
pub enum AudialError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Corpus index or style priors could not be read or decoded
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Session blob storage errors (open, read, write, flush)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Session lookups that refer to unknown ids
    #[error("Session error: {0}")]
    Session(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Audial operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = AudialError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_dataset_error_display() {
        let error = AudialError::Dataset("index.json missing songs".to_string());
        assert_eq!(error.to_string(), "Dataset error: index.json missing songs");
    }

    #[test]
    fn test_storage_error_display() {
        let error = AudialError::Storage("flush failed".to_string());
        assert_eq!(error.to_string(), "Storage error: flush failed");
    }

    #[test]
    fn test_session_error_display() {
        let error = AudialError::Session("no version matches 01H".to_string());
        assert_eq!(error.to_string(), "Session error: no version matches 01H");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: AudialError = io_error.into();
        assert!(matches!(error, AudialError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: AudialError = json_error.into();
        assert!(matches!(error, AudialError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: AudialError = yaml_error.into();
        assert!(matches!(error, AudialError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AudialError>();
    }
}
