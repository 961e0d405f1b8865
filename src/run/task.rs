//! Per-record task processing.
//!
//! This module contains the logic for writing a single record's artifact and
//! accounting for the outcome.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use log::{debug, warn};

use crate::config::ProgressCallback;
use crate::error_handling::{ExportError, InfoType, ProcessingStats};
use crate::export::{DecodeOutcome, ExportArtifact};

use super::resources::{RecordTaskParams, RunCounters};
use super::RecordFailure;

/// Write a single record.
///
/// Spawned as a Tokio task for each record. File IO runs on the blocking
/// pool; the semaphore permit is held until the outcome has been recorded,
/// so with one permit records complete strictly in source order.
pub async fn process_record_task(params: RecordTaskParams) {
    let RecordTaskParams {
        record,
        row,
        identifier,
        exporter,
        permit: _permit,
        write_guard: _write_guard,
        counters,
        error_stats,
        progress_callback,
        fail_fast,
    } = params;

    let task_identifier = identifier.clone();
    let result = tokio::task::spawn_blocking(move || exporter.write(&record, &task_identifier))
        .await
        .unwrap_or_else(|join_error| Err(ExportError::TaskFailed(join_error.to_string())));

    match result {
        Ok(artifact) => handle_success(&artifact, &counters, &error_stats, &progress_callback),
        Err(error) => {
            handle_failure(row, Some(identifier), error, &counters, &error_stats);
            if let Some(token) = fail_fast {
                token.cancel();
            }
        }
    }
}

/// Handle a fully written artifact.
fn handle_success(
    artifact: &ExportArtifact,
    counters: &RunCounters,
    error_stats: &Arc<ProcessingStats>,
    progress_callback: &ProgressCallback,
) {
    if artifact.outcome == DecodeOutcome::Failed {
        counters.decode_failures.fetch_add(1, Ordering::SeqCst);
    }
    if artifact.stale_image_removed {
        error_stats.increment_info(InfoType::StaleImageRemoved);
    }
    if artifact.payload_had_whitespace {
        error_stats.increment_info(InfoType::WhitespaceInPayload);
    }
    counters.exported.fetch_add(1, Ordering::SeqCst);
    debug!("Exported {}", artifact.dir.display());

    if let Some(callback) = progress_callback {
        callback(&artifact.identifier);
    }
}

/// Handle a record that could not be exported.
///
/// Also used by the dispatch loop for records rejected before a task is spawned.
pub fn handle_failure(
    row: usize,
    identifier: Option<String>,
    error: ExportError,
    counters: &RunCounters,
    error_stats: &Arc<ProcessingStats>,
) {
    counters.failed.fetch_add(1, Ordering::SeqCst);
    error_stats.increment_error(error.error_type());
    match &identifier {
        Some(id) => warn!("Failed to export record '{}' (row {}): {}", id, row, error),
        None => warn!("Failed to export row {}: {}", row, error),
    }
    counters.push_failure(RecordFailure::new(row, identifier, &error));
}
