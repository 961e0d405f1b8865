//! Export finalization.
//!
//! This module contains `finalize_export`, which shuts down background tasks
//! and turns the shared counters into an `ExportReport`.

use std::sync::atomic::Ordering;

use crate::app::{
    log_progress, print_error_statistics, print_simple_summary, shutdown_gracefully,
};

use super::resources::{ExportLoopResult, ExportResources};
use super::{ExportReport, StopReason};

/// Finalize an export run and produce the final report.
///
/// Must be called after every record task has completed.
pub async fn finalize_export(
    resources: ExportResources,
    total_records: usize,
    loop_result: ExportLoopResult,
) -> ExportReport {
    let ExportLoopResult {
        dispatched,
        fail_fast_triggered,
        cancelled,
        logging_cancel,
        logging_task,
    } = loop_result;

    shutdown_gracefully(logging_cancel, logging_task).await;

    let counters = &resources.counters;
    log_progress(
        resources.start_time,
        &counters.exported,
        &counters.failed,
        total_records,
    );

    let mut failures = std::mem::take(
        &mut *counters
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner()),
    );
    failures.sort_by_key(|failure| failure.row);

    let stop_reason = if cancelled {
        Some(StopReason::Cancelled)
    } else if fail_fast_triggered {
        Some(StopReason::FailFast)
    } else {
        None
    };
    let not_dispatched = total_records.saturating_sub(dispatched);

    let report = ExportReport {
        total_records,
        exported: counters.exported.load(Ordering::SeqCst),
        decode_failures: counters.decode_failures.load(Ordering::SeqCst),
        failed: counters.failed.load(Ordering::SeqCst),
        failures,
        not_dispatched,
        // A cancellation that lands after the last dispatch leaves nothing out
        stop_reason: stop_reason.filter(|_| not_dispatched > 0),
        base_dir: resources.config.base_dir.clone(),
        run_id: resources.run_id,
        elapsed_seconds: resources.start_time.elapsed().as_secs_f64(),
    };

    print_error_statistics(&resources.error_stats);
    print_simple_summary(&report);
    report
}
