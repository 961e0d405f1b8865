//! record_export library: per-record export of a database table
//!
//! Every row of the source table becomes a directory named after its
//! identifier, holding the decoded image (`original.jpg`) and the remaining
//! fields as JSON (`personal_data.json`). Rows whose image payload is not valid
//! base64 still get their JSON, with a sentinel in place of the image.
//!
//! # Example
//!
//! ```no_run
//! use record_export::{run_export, Config};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     database_url: "postgres://postgres@localhost/police".to_string(),
//!     base_dir: std::path::PathBuf::from("/srv/export"),
//!     progress_callback: Some(Arc::new(|id: &str| println!("Done:{id}"))),
//!     ..Default::default()
//! };
//!
//! let report = run_export(config).await?;
//! println!("{}", report.decode_summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
pub mod cli;
pub mod config;
mod error_handling;
pub mod export;
pub mod initialization;
mod run;
pub mod source;

// Re-export public API
pub use app::evaluate_exit_code;
pub use config::{CollisionPolicy, Config, FailOn, LogFormat, LogLevel, ProgressCallback};
pub use error_handling::{
    ErrorType, ExportError, InfoType, InitializationError, ProcessingStats, SourceError,
};
pub use run::{run_export, run_export_with_cancel, ExportReport, RecordFailure, StopReason};
