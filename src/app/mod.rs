//! Main application modules.
//!
//! This module provides progress logging, shutdown handling, statistics
//! printing and the exit code policy used by the run and the CLI.

pub mod exit_code;
pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use exit_code::evaluate_exit_code;
pub use logging::log_progress;
pub use shutdown::shutdown_gracefully;
pub use statistics::{print_error_statistics, print_simple_summary};
