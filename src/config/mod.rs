//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, artifact names, sentinels)
//! - Library configuration and its validation
//! - Option enums shared with the CLI

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{CollisionPolicy, Config, FailOn, LogFormat, LogLevel, ProgressCallback};
pub(crate) use types::redact_url;
