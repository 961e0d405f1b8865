//! Export run orchestration.
//!
//! A run reads every record up front, then dispatches them in source order to
//! record tasks bounded by a semaphore. Record errors are collected; only
//! source and setup errors abort the run.

mod finalize;
mod init;
mod resources;
mod task;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{info, warn};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::app::log_progress;
use crate::config::{Config, LOGGING_INTERVAL, MAX_ERROR_MESSAGE_LENGTH};
use crate::error_handling::{ErrorType, ExportError, InfoType};
use crate::export::Claim;

use finalize::finalize_export;
use init::init_export_resources;
use resources::{ExportLoopResult, ExportResources, RecordTaskParams};
use task::{handle_failure, process_record_task};

/// Why a run stopped before dispatching every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The caller's cancellation token fired (Ctrl-C in the CLI)
    Cancelled,
    /// A record failed and fail-fast is enabled
    FailFast,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Cancelled => "cancelled",
            StopReason::FailFast => "fail-fast",
        }
    }
}

/// A record that could not be exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    /// 1-based position of the record in the source
    pub row: usize,
    /// Identifier, when one could be extracted
    pub identifier: Option<String>,
    pub error_type: ErrorType,
    /// Error message, single line, truncated
    pub message: String,
}

impl RecordFailure {
    pub fn new(row: usize, identifier: Option<String>, error: &ExportError) -> Self {
        Self {
            row,
            identifier,
            error_type: error.error_type(),
            message: sanitize_message(&error.to_string()),
        }
    }

    /// Console line for the end-of-run report.
    pub fn display_line(&self) -> String {
        match &self.identifier {
            Some(id) => format!("Failed:{}: {}", id, self.message),
            None => format!("Failed:row {}: {}", self.row, self.message),
        }
    }
}

/// Collapses newlines and caps the length of an error message.
fn sanitize_message(message: &str) -> String {
    let single_line = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= MAX_ERROR_MESSAGE_LENGTH {
        single_line
    } else {
        let mut truncated: String = single_line.chars().take(MAX_ERROR_MESSAGE_LENGTH).collect();
        truncated.push_str("...");
        truncated
    }
}

/// Results of an export run.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    /// Records read from the source
    pub total_records: usize,
    /// Records whose artifact was fully written
    pub exported: usize,
    /// Exported records whose image payload could not be decoded
    pub decode_failures: usize,
    /// Records skipped because of an error
    pub failed: usize,
    /// One entry per skipped record, in source order
    pub failures: Vec<RecordFailure>,
    /// Records never handed to the exporter because the run stopped early
    pub not_dispatched: usize,
    /// Set when the run stopped before dispatching every record
    pub stop_reason: Option<StopReason>,
    /// Root directory the artifacts were written to
    pub base_dir: PathBuf,
    /// Run identifier (format: `run_<timestamp_millis>`)
    pub run_id: String,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

impl ExportReport {
    /// `Unable to decode:<n> images`
    pub fn decode_summary(&self) -> String {
        format!("Unable to decode:{} images", self.decode_failures)
    }

    /// Whether some records were never dispatched.
    pub fn is_partial(&self) -> bool {
        self.stop_reason.is_some()
    }
}

/// Runs an export with the provided configuration.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the base directory cannot
/// be created or the source cannot be read. Per-record failures are reported
/// in the returned [`ExportReport`] instead.
///
/// # Example
///
/// ```no_run
/// use record_export::{run_export, Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config {
///     database_url: "sqlite:./people.db".to_string(),
///     ..Default::default()
/// };
/// let report = run_export(config).await?;
/// println!("{}", report.decode_summary());
/// # Ok(())
/// # }
/// ```
pub async fn run_export(config: Config) -> Result<ExportReport> {
    run_export_with_cancel(config, CancellationToken::new()).await
}

/// Like [`run_export`], stopping dispatch when `cancel` fires.
///
/// Records already in flight finish; the rest are counted in
/// [`ExportReport::not_dispatched`].
///
/// # Errors
///
/// Same as [`run_export`].
pub async fn run_export_with_cancel(
    config: Config,
    cancel: CancellationToken,
) -> Result<ExportReport> {
    let mut resources = init_export_resources(config).await?;
    let records = std::mem::take(&mut resources.records);
    let total_records = records.len();

    let logging_cancel = CancellationToken::new();
    let logging_task = spawn_progress_logger(&resources, total_records, logging_cancel.child_token());

    let run_token = cancel.child_token();
    let fail_fast = resources.config.fail_fast.then(|| run_token.clone());
    let mut tasks = FuturesUnordered::new();
    let mut dispatched = 0usize;

    for (idx, record) in records.into_iter().enumerate() {
        let row = idx + 1;
        if run_token.is_cancelled() {
            break;
        }
        let permit = tokio::select! {
            biased;
            _ = run_token.cancelled() => break,
            permit = Arc::clone(&resources.semaphore).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => {
                    warn!("Semaphore closed, stopping dispatch at row {row}");
                    break;
                }
            },
        };
        dispatched += 1;

        let prepared = match resources.exporter.prepare(&record) {
            Ok(prepared) => prepared,
            Err(error) => {
                let identifier = match &error {
                    ExportError::DuplicateIdentifier(id) => Some(id.clone()),
                    _ => None,
                };
                handle_failure(
                    row,
                    identifier,
                    error,
                    &resources.counters,
                    &resources.error_stats,
                );
                if let Some(token) = &fail_fast {
                    token.cancel();
                }
                continue;
            }
        };
        if prepared.claim == Claim::Overwrite {
            resources
                .error_stats
                .increment_info(InfoType::IdentifierOverwritten);
        }
        // Taken in dispatch order: a later record with the same identifier
        // waits here until the earlier task has finished writing
        let write_guard = Arc::clone(&prepared.write_lock).lock_owned().await;

        tasks.push(tokio::spawn(process_record_task(RecordTaskParams {
            record,
            row,
            identifier: prepared.identifier,
            exporter: Arc::clone(&resources.exporter),
            permit,
            write_guard,
            counters: resources.counters.clone(),
            error_stats: Arc::clone(&resources.error_stats),
            progress_callback: resources.config.progress_callback.clone(),
            fail_fast: fail_fast.clone(),
        })));
    }

    if dispatched < total_records {
        info!(
            "Stopped dispatching after {} of {} records",
            dispatched, total_records
        );
    }

    while let Some(task_result) = tasks.next().await {
        if let Err(join_error) = task_result {
            // process_record_task records its own failures; only a panic lands here
            warn!("Record task panicked: {:?}", join_error);
        }
    }

    let loop_result = ExportLoopResult {
        dispatched,
        fail_fast_triggered: run_token.is_cancelled() && !cancel.is_cancelled(),
        cancelled: cancel.is_cancelled(),
        logging_cancel,
        logging_task,
    };
    Ok(finalize_export(resources, total_records, loop_result).await)
}

/// Spawns the periodic progress logger.
fn spawn_progress_logger(
    resources: &ExportResources,
    total_records: usize,
    cancel: CancellationToken,
) -> Option<tokio::task::JoinHandle<()>> {
    let start_time = resources.start_time;
    let exported = Arc::clone(&resources.counters.exported);
    let failed = Arc::clone(&resources.counters.failed);

    Some(tokio::task::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(LOGGING_INTERVAL as u64));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    log_progress(start_time, &exported, &failed, total_records);
                }
                _ = cancel.cancelled() => {
                    break;
                }
            }
        }
    }))
}
