//! Configuration constants.
//!
//! This module defines the constants used throughout the exporter, including
//! default locations, artifact file names and the sentinel strings written
//! into the metadata sidecar.

// Defaults
/// Source table exported when `--table` is not given
pub const DEFAULT_TABLE: &str = "zzz_export_ud_w_passport";
/// Column holding the record identifier
pub const DEFAULT_ID_COLUMN: &str = "identif";
/// Column holding the base64 image payload
pub const DEFAULT_IMAGE_COLUMN: &str = "image";
/// Root directory for export artifacts
pub const DEFAULT_BASE_DIR: &str = "./export";
/// Records are processed one at a time unless asked otherwise
pub const DEFAULT_MAX_CONCURRENCY: usize = 1;
/// Seconds between background progress log lines
pub const LOGGING_INTERVAL: usize = 5;

// Artifact layout
/// Decoded image bytes, written only when the payload decodes
pub const IMAGE_FILE_NAME: &str = "original.jpg";
/// Metadata sidecar, always written for an exported record
pub const METADATA_FILE_NAME: &str = "personal_data.json";
/// Indentation used for the metadata sidecar
pub const METADATA_INDENT: &[u8] = b"    ";

// Sentinels replacing the image payload in the sidecar
/// The payload decoded; the bytes live in `original.jpg`
pub const IMAGE_PRESENT: &str = "Present";
/// The payload was absent or not valid base64
pub const IMAGE_NOT_DECODED: &str = "Could not be decoded";

// Source connections
/// Connections kept by the source pool. Rows are materialized once, so one is enough.
pub const SOURCE_MAX_CONNECTIONS: u32 = 1;
/// Seconds to wait for a source connection before giving up
pub const SOURCE_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Maximum error message length kept in the run report (characters)
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 2000;
