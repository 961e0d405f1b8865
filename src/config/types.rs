//! Export configuration and the enums the CLI maps onto it.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_BASE_DIR, DEFAULT_ID_COLUMN, DEFAULT_IMAGE_COLUMN, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_TABLE,
};

/// Minimum level logged by this crate.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

/// Shape of each log line.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Colored, one event per line
    Plain,
    /// One JSON object per line (`ts`, `level`, `target`, `msg`)
    Json,
}

/// What to do when two records in one run share an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CollisionPolicy {
    /// Reject the later record and report it
    Fail,
    /// Let the later record replace the earlier artifact
    Overwrite,
}

/// Exit code policy applied to a finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FailOn {
    /// Always exit 0 once the run completes
    Never,
    /// Exit 2 if any record could not be exported
    AnyFailure,
    /// Exit 2 if any image payload could not be decoded
    DecodeFailure,
    /// Exit 2 if the share of failed records exceeds the threshold
    PctGreaterThan,
}

/// Callback invoked with the identifier of every fully written artifact.
pub type ProgressCallback = Option<Arc<dyn Fn(&str) + Send + Sync>>;

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use record_export::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     database_url: "postgres://postgres@localhost/police".to_string(),
///     base_dir: PathBuf::from("/srv/export"),
///     max_concurrency: 8,
///     ..Default::default()
/// };
/// ```
#[derive(Clone)]
pub struct Config {
    /// Source database URL (`postgres://...` or `sqlite:...`)
    pub database_url: String,

    /// Table to export
    pub table: String,

    /// Column holding the record identifier
    pub id_column: String,

    /// Column holding the base64 image payload
    pub image_column: String,

    /// Export a single identifier instead of the whole table
    pub only: Option<String>,

    /// Root directory for export artifacts
    pub base_dir: PathBuf,

    /// Maximum records processed at once (1 = sequential, in source order)
    pub max_concurrency: usize,

    /// Behaviour on duplicate identifiers within one run
    pub collision_policy: CollisionPolicy,

    /// Stop dispatching new records after the first record error
    pub fail_fast: bool,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Called with the identifier of every exported record
    pub progress_callback: ProgressCallback,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            table: DEFAULT_TABLE.to_string(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
            image_column: DEFAULT_IMAGE_COLUMN.to_string(),
            only: None,
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            collision_policy: CollisionPolicy::Fail,
            fail_fast: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &redact_url(&self.database_url))
            .field("table", &self.table)
            .field("id_column", &self.id_column)
            .field("image_column", &self.image_column)
            .field("only", &self.only)
            .field("base_dir", &self.base_dir)
            .field("max_concurrency", &self.max_concurrency)
            .field("collision_policy", &self.collision_policy)
            .field("fail_fast", &self.fail_fast)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl Config {
    /// Checks the configuration for values the run cannot work with.
    ///
    /// # Errors
    ///
    /// Returns a human-readable description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.trim().is_empty() {
            return Err("database URL must not be empty".to_string());
        }
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be at least 1".to_string());
        }
        for (name, value) in [
            ("table", &self.table),
            ("id_column", &self.id_column),
            ("image_column", &self.image_column),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{name} must not be empty"));
            }
        }
        if self.id_column == self.image_column {
            return Err(format!(
                "id_column and image_column must differ (both are '{}')",
                self.id_column
            ));
        }
        if self.base_dir.as_os_str().is_empty() {
            return Err("base_dir must not be empty".to_string());
        }
        Ok(())
    }
}

/// Hides the password part of a connection URL for logging.
pub(crate) fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.split_once('@') {
        Some((credentials, host)) => match credentials.split_once(':') {
            Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
            None => url.to_string(),
        },
        None => url.to_string(),
    }
}
