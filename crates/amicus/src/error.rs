//! Error types for amicus.
//!
//! Subsystems with their own failure vocabulary (payload decoding, ingest,
//! scanning, sign-in) define local error enums; this is the crate-level type
//! for configuration, persistence, and export failures.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for amicus operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Persistence Errors ===
    /// Failed to read a persisted state slot.
    #[error("failed to read state slot '{key}': {source}")]
    StateRead {
        /// The slot key.
        key: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a persisted state slot.
    #[error("failed to write state slot '{key}': {source}")]
    StateWrite {
        /// The slot key.
        key: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Export Errors ===
    /// There are no records to export; no file is written.
    #[error("no records to export")]
    EmptyExport,

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for amicus operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error is the empty-export signal.
    #[must_use]
    pub fn is_empty_export(&self) -> bool {
        matches!(self, Self::EmptyExport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::EmptyExport;
        assert_eq!(err.to_string(), "no records to export");

        let err = Error::internal("test error");
        assert_eq!(err.to_string(), "internal error: test error");
    }

    #[test]
    fn test_is_empty_export() {
        assert!(Error::EmptyExport.is_empty_export());
        assert!(!Error::internal("x").is_empty_export());
    }

    #[test]
    fn test_state_read_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::StateRead {
            key: "attendance-records".to_string(),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("attendance-records"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "fps must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("fps"));
    }
}
