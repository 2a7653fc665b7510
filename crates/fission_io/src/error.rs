//! Error types for fission_io crate.
//!
//! Covers file access, the JSON and TOML codecs, export validation and
//! settings that fail engine validation.

use fission_core::SettingsError;
use thiserror::Error;

/// Main error type for fission_io operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File system errors
    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Structurally valid input that does not describe a usable design
    #[error("Validation error: {0}")]
    Validation(String),

    /// Settings rejected by the engine
    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    /// Generic error with context
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<IoError>,
    },
}

/// Result type alias for fission_io operations.
pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    /// Creates a new serialization error.
    #[must_use]
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates a new validation error.
    #[must_use]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Wraps an error with additional context.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IoError::serialization("test error");
        assert_eq!(err.to_string(), "Serialization error: test error");
    }

    #[test]
    fn test_error_context() {
        let err = IoError::validation("bad coordinate").with_context("importing design");
        assert!(err.to_string().contains("importing design"));
        assert!(err.to_string().contains("bad coordinate"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: IoError = io_err.into();
        assert!(matches!(err, IoError::FileSystem(_)));
    }

    #[test]
    fn test_settings_error_keeps_field() {
        let err: IoError = SettingsError::EmptyFuelList {
            field: "fuels".to_string(),
        }
        .into();
        assert!(err.to_string().contains("fuels"));
    }
}
