//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions for initialization, the record source and record export
//! - Processing statistics tracking (errors and info metrics)
//!
//! Counter categories are split into:
//! - **Errors**: Failures that caused a record to be skipped
//! - **Info**: Informational metrics (stale images removed, overwrites, etc.)

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{ErrorType, ExportError, InfoType, InitializationError, SourceError};
