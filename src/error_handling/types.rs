//! Error type definitions.
//!
//! This module defines the errors raised while setting up a run, reading the
//! source and exporting individual records, plus the counter categories
//! reported at the end of a run.

use std::path::PathBuf;

use log::SetLoggerError;
use serde::Serialize;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// The export base directory could not be created.
    #[error("Failed to create export directory {path}: {source}")]
    BaseDirError {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
}

/// Error types for the record source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The database URL names a driver we don't read from.
    #[error("Unsupported database URL scheme: {0} (expected postgres:// or sqlite:)")]
    UnsupportedScheme(String),

    /// The table has no columns (or does not exist).
    #[error("Table '{0}' not found or has no columns")]
    TableNotFound(String),

    /// A configured column is missing from the table.
    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound {
        /// Table that was inspected
        table: String,
        /// Missing column
        column: String,
    },

    /// A column value could not be read.
    #[error("Failed to read column '{column}': {message}")]
    ValueError {
        /// Column being decoded
        column: String,
        /// Driver message
        message: String,
    },

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// Per-record export failures.
///
/// Any of these skips the record; the rest of the run continues.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The identifier is missing, empty, or would escape the record directory.
    #[error("Invalid identifier {value:?}: {reason}")]
    InvalidIdentifier {
        /// Identifier as read from the source
        value: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Another record in this run already used the identifier.
    #[error("Duplicate identifier '{0}' in this run")]
    DuplicateIdentifier(String),

    /// Directory creation or file write failed.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path being created or written
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The metadata sidecar could not be serialized.
    #[error("Failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The blocking export task panicked or was aborted.
    #[error("Export task failed: {0}")]
    TaskFailed(String),
}

impl ExportError {
    /// Builds an `Io` error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }

    /// Maps the error onto its statistics category.
    pub fn error_type(&self) -> ErrorType {
        match self {
            ExportError::InvalidIdentifier { .. } => ErrorType::InvalidIdentifier,
            ExportError::DuplicateIdentifier(_) => ErrorType::DuplicateIdentifier,
            ExportError::Io { .. } => ErrorType::IoError,
            ExportError::Serialize(_) => ErrorType::SerializeError,
            ExportError::TaskFailed(_) => ErrorType::TaskFailed,
        }
    }
}

/// Types of errors that can occur while exporting a record.
///
/// Each of these causes the record to be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    InvalidIdentifier,
    DuplicateIdentifier,
    IoError,
    SerializeError,
    TaskFailed,
}

/// Types of informational metrics tracked during a run.
///
/// These never cause a record to be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    StaleImageRemoved,     // original.jpg from an earlier run removed after a failed decode
    IdentifierOverwritten, // Duplicate identifier replaced an earlier artifact
    WhitespaceInPayload,   // Payload carried line breaks (e.g. from encode(..., 'base64'))
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::InvalidIdentifier => "Invalid identifier",
            ErrorType::DuplicateIdentifier => "Duplicate identifier",
            ErrorType::IoError => "IO error",
            ErrorType::SerializeError => "Metadata serialization error",
            ErrorType::TaskFailed => "Export task failed",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::StaleImageRemoved => "Stale image removed",
            InfoType::IdentifierOverwritten => "Identifier overwritten",
            InfoType::WhitespaceInPayload => "Whitespace stripped from image payload",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_error_type_as_str() {
        assert_eq!(ErrorType::IoError.as_str(), "IO error");
        assert_eq!(
            ErrorType::DuplicateIdentifier.as_str(),
            "Duplicate identifier"
        );
        assert_eq!(ErrorType::InvalidIdentifier.to_string(), "Invalid identifier");
    }

    #[test]
    fn test_all_types_have_string_representation() {
        for error_type in ErrorType::iter() {
            assert!(
                !error_type.as_str().is_empty(),
                "{:?} should have non-empty string",
                error_type
            );
        }
        for info_type in InfoType::iter() {
            assert!(
                !info_type.as_str().is_empty(),
                "{:?} should have non-empty string",
                info_type
            );
        }
    }

    #[test]
    fn test_export_error_maps_to_error_type() {
        let io = ExportError::io(
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(io.error_type(), ErrorType::IoError);

        let invalid = ExportError::InvalidIdentifier {
            value: "..".to_string(),
            reason: "reserved path component",
        };
        assert_eq!(invalid.error_type(), ErrorType::InvalidIdentifier);

        let duplicate = ExportError::DuplicateIdentifier("A1".to_string());
        assert_eq!(duplicate.error_type(), ErrorType::DuplicateIdentifier);
    }

    #[test]
    fn test_export_error_messages_name_the_problem() {
        let io = ExportError::io(
            "/srv/export/A1",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = io.to_string();
        assert!(message.contains("/srv/export/A1"));
        assert!(message.contains("denied"));

        let duplicate = ExportError::DuplicateIdentifier("A1".to_string());
        assert_eq!(duplicate.to_string(), "Duplicate identifier 'A1' in this run");
    }

    #[test]
    fn test_source_error_messages() {
        let missing = SourceError::ColumnNotFound {
            table: "people".to_string(),
            column: "image".to_string(),
        };
        assert_eq!(
            missing.to_string(),
            "Column 'image' not found in table 'people'"
        );
        let scheme = SourceError::UnsupportedScheme("mysql".to_string());
        assert!(scheme.to_string().contains("mysql"));
    }
}
