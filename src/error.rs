//! Error types for dotsettings

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dotsettings operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for dotsettings
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to parse settings file '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },

    // -------------------------------------------------------------------------
    // Usage Errors
    // -------------------------------------------------------------------------
    #[error("Invalid key path '{key_path}': {reason}")]
    InvalidKeyPath { key_path: String, reason: String },

    #[error("Cannot write through '{key_path}': value at that path is not an object")]
    NotAnObject { key_path: String },

    #[error("Invalid settings document: {0}")]
    InvalidDocument(String),

    #[error("Type mismatch for {key_path}: {reason}")]
    TypeMismatch { key_path: String, reason: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this error came from reading or writing the file system
    #[must_use]
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            Error::FileRead { .. } | Error::FileWrite { .. } | Error::DirectoryCreate { .. }
        )
    }

    /// Check if this error is a contract violation by the caller
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidKeyPath { .. }
                | Error::NotAnObject { .. }
                | Error::InvalidDocument(_)
                | Error::TypeMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let io = Error::FileWrite {
            path: PathBuf::from("/tmp/x"),
            source: std::io::Error::other("boom"),
        };
        assert!(io.is_io_error());
        assert!(!io.is_usage_error());

        let usage = Error::NotAnObject {
            key_path: "a.b".into(),
        };
        assert!(usage.is_usage_error());
        assert!(!usage.is_io_error());

        let parse = Error::Parse {
            path: PathBuf::from("/tmp/x"),
            reason: "bad".into(),
        };
        assert!(!parse.is_io_error());
        assert!(!parse.is_usage_error());
    }

    #[test]
    fn test_error_messages_include_context() {
        let err = Error::InvalidKeyPath {
            key_path: "a..b".into(),
            reason: "empty segment".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("a..b"));
        assert!(msg.contains("empty segment"));
    }
}
