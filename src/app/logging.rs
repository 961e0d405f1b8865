//! Progress logging utilities.

use log::info;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Logs how many records have been exported so far.
///
/// # Arguments
///
/// * `start_time` - The start time of the export loop
/// * `exported` - Records whose artifact is fully written
/// * `failed` - Records skipped because of an error
/// * `total` - Records read from the source
pub fn log_progress(
    start_time: std::time::Instant,
    exported: &Arc<AtomicUsize>,
    failed: &Arc<AtomicUsize>,
    total: usize,
) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let exported = exported.load(Ordering::SeqCst);
    let failed = failed.load(Ordering::SeqCst);
    #[allow(clippy::cast_precision_loss)]
    let rate = if elapsed_secs > 0.0 {
        (exported + failed) as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Exported {}/{} records ({} failed) in {:.2} seconds (~{:.2} records/sec)",
        exported, total, failed, elapsed_secs, rate
    );
}
