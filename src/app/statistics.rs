//! Statistics printing.

use log::{info, warn};
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, ProcessingStats};
use crate::run::ExportReport;

/// Prints a one-line summary of the run.
///
/// Works with both plain and JSON log formats (log::info! handles formatting).
pub fn print_simple_summary(report: &ExportReport) {
    info!(
        "✅ Exported {} of {} record{} ({} image{} not decoded, {} failed) in {:.1}s to {}",
        report.exported,
        report.total_records,
        if report.total_records == 1 { "" } else { "s" },
        report.decode_failures,
        if report.decode_failures == 1 { "" } else { "s" },
        report.failed,
        report.elapsed_seconds,
        report.base_dir.display()
    );
    if let Some(reason) = report.stop_reason {
        warn!(
            "Run stopped early ({}): {} record{} not dispatched",
            reason.as_str(),
            report.not_dispatched,
            if report.not_dispatched == 1 { "" } else { "s" }
        );
    }
}

/// Prints error and info statistics to the log.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    let total_info = error_stats.total_info();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = error_stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if total_info > 0 {
        info!("Info Counts ({} total):", total_info);
        for info_type in InfoType::iter() {
            let count = error_stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }
}
