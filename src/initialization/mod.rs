//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources of a run:
//! - Logger (plain or JSON)
//! - Concurrency semaphore
//! - Export base directory

mod logger;

use std::path::Path;
use std::sync::Arc;

use log::debug;
use tokio::sync::Semaphore;

use crate::error_handling::InitializationError;

// Re-export public API
pub use logger::init_logger_with;

/// Initializes a semaphore for controlling concurrency.
///
/// Creates a new semaphore with the specified permit count. This semaphore is used
/// to limit the number of records being written at once.
///
/// # Arguments
///
/// * `count` - Maximum number of concurrent record tasks
///
/// # Returns
///
/// An `Arc<Semaphore>` that can be shared across multiple tasks.
pub fn init_semaphore(count: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(count))
}

/// Creates the export base directory (and parents) if missing.
///
/// # Errors
///
/// Returns `InitializationError::BaseDirError` if the directory cannot be created.
pub fn init_base_dir(path: &Path) -> Result<(), InitializationError> {
    std::fs::create_dir_all(path).map_err(|source| InitializationError::BaseDirError {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Export directory ready: {}", path.display());
    Ok(())
}
