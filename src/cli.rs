//! Command-line interface.
//!
//! A thin clap layer mapping flags and environment variables onto [`Config`].
//!
//! # Examples
//!
//! ```bash
//! # Export the default table from PostgreSQL
//! record_export --database-url postgres://postgres@localhost/police
//!
//! # One record, into a custom directory
//! record_export --database-url sqlite:./people.db --only A1 --base-dir /srv/export
//!
//! # Parallel, failing the process if any image could not be decoded
//! record_export --max-concurrency 8 --fail-on decode-failure
//! ```

use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    CollisionPolicy, Config, FailOn, LogFormat, LogLevel, DEFAULT_BASE_DIR, DEFAULT_ID_COLUMN,
    DEFAULT_IMAGE_COLUMN, DEFAULT_MAX_CONCURRENCY, DEFAULT_TABLE,
};

#[derive(Debug, Parser)]
#[command(
    name = "record_export",
    version,
    about = "Exports database records to per-record directories with a decoded image and a JSON sidecar."
)]
pub struct Cli {
    /// Source database URL (postgres://... or sqlite:...)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Table to export, optionally schema-qualified
    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Column holding the record identifier
    #[arg(long, default_value = DEFAULT_ID_COLUMN)]
    pub id_column: String,

    /// Column holding the base64 image payload
    #[arg(long, default_value = DEFAULT_IMAGE_COLUMN)]
    pub image_column: String,

    /// Export only the record with this identifier
    #[arg(long)]
    pub only: Option<String>,

    /// Root directory for export artifacts
    #[arg(long, env = "EXPORT_BASE_DIR", default_value = DEFAULT_BASE_DIR)]
    pub base_dir: PathBuf,

    /// Maximum records written at once (1 keeps source order)
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// What to do when two records in one run share an identifier
    #[arg(long, value_enum, default_value_t = CollisionPolicy::Fail)]
    pub on_collision: CollisionPolicy,

    /// Stop dispatching new records after the first record error
    #[arg(long)]
    pub fail_fast: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Exit code policy: never|any-failure|decode-failure|pct-greater-than
    #[arg(long, value_enum, default_value_t = FailOn::Never)]
    pub fail_on: FailOn,

    /// Failure percentage above which `pct-greater-than` exits with 2
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub fail_on_pct_threshold: u8,
}

impl Cli {
    /// Builds the library configuration. The progress callback is left unset.
    pub fn into_config(self) -> Config {
        Config {
            database_url: self.database_url,
            table: self.table,
            id_column: self.id_column,
            image_column: self.image_column,
            only: self.only,
            base_dir: self.base_dir,
            max_concurrency: self.max_concurrency,
            collision_policy: self.on_collision,
            fail_fast: self.fail_fast,
            log_level: self.log_level,
            log_format: self.log_format,
            progress_callback: None,
        }
    }
}
