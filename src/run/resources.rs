//! Export resources and state management.
//!
//! This module defines the structs that carry initialized resources and
//! per-task parameters through an export run.

use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex};

use tokio::sync::{OwnedMutexGuard, OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::config::{Config, ProgressCallback};
use crate::error_handling::ProcessingStats;
use crate::export::{Record, RecordExporter};

use super::RecordFailure;

/// Counters and failure log shared by every record task.
#[derive(Clone, Default)]
pub struct RunCounters {
    /// Records whose artifact is fully written
    pub exported: Arc<AtomicUsize>,
    /// Exported records whose image could not be decoded
    pub decode_failures: Arc<AtomicUsize>,
    /// Records skipped because of an error
    pub failed: Arc<AtomicUsize>,
    /// Details of every skipped record
    pub failures: Arc<Mutex<Vec<RecordFailure>>>,
}

impl RunCounters {
    /// Appends a failure to the shared log.
    pub fn push_failure(&self, failure: RecordFailure) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(failure);
    }
}

/// Everything initialized before the dispatch loop starts.
pub struct ExportResources {
    /// Records materialized from the source, in source order
    pub records: Vec<Record>,
    /// Shared exporter (layout and collision registry)
    pub exporter: Arc<RecordExporter>,
    /// Bounds the number of in-flight record tasks
    pub semaphore: Arc<Semaphore>,
    /// Error and info counters
    pub error_stats: Arc<ProcessingStats>,
    pub counters: RunCounters,
    /// Unique run identifier (format: `run_<timestamp_millis>`)
    pub run_id: String,
    /// Start time for elapsed time calculations
    pub start_time: std::time::Instant,
    pub config: Config,
}

/// Result of the dispatch loop, consumed by finalization.
pub struct ExportLoopResult {
    /// Records handed to the exporter (tasks spawned or rejected up front)
    pub dispatched: usize,
    /// Whether the run token was cancelled by fail-fast
    pub fail_fast_triggered: bool,
    /// Whether the caller's token was cancelled
    pub cancelled: bool,
    /// Cancellation token for the logging task
    pub logging_cancel: CancellationToken,
    /// Handle to the logging task
    pub logging_task: Option<tokio::task::JoinHandle<()>>,
}

/// Parameters for writing a single record.
pub struct RecordTaskParams {
    pub record: Record,
    /// 1-based position of the record in the source
    pub row: usize,
    /// Identifier already validated and claimed
    pub identifier: String,
    pub exporter: Arc<RecordExporter>,
    /// Semaphore permit (dropped when the task completes)
    pub permit: OwnedSemaphorePermit,
    /// Exclusive access to the identifier's directory
    pub write_guard: OwnedMutexGuard<()>,
    pub counters: RunCounters,
    pub error_stats: Arc<ProcessingStats>,
    pub progress_callback: ProgressCallback,
    /// Cancelled after a failure when fail-fast is on
    pub fail_fast: Option<CancellationToken>,
}
