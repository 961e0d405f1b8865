//! Exit code policy (`--fail-on`).

use crate::config::FailOn;
use crate::run::ExportReport;

/// Exit code when the run finished but the policy considers it failed.
pub const EXIT_POLICY_FAILURE: i32 = 2;
/// Exit code for `pct-greater-than` when the source returned no records.
pub const EXIT_NO_RECORDS: i32 = 3;

/// Maps a finished run onto a process exit code.
///
/// Fatal errors (no report) are mapped to 1 by the caller.
pub fn evaluate_exit_code(fail_on: FailOn, pct_threshold: u8, report: &ExportReport) -> i32 {
    match fail_on {
        FailOn::Never => 0,
        FailOn::AnyFailure => {
            if report.failed > 0 {
                EXIT_POLICY_FAILURE
            } else {
                0
            }
        }
        FailOn::DecodeFailure => {
            if report.decode_failures > 0 {
                EXIT_POLICY_FAILURE
            } else {
                0
            }
        }
        FailOn::PctGreaterThan => {
            if report.total_records == 0 {
                return EXIT_NO_RECORDS;
            }
            // Record counts are far below 2^53, so the f64 conversion is exact
            #[allow(clippy::cast_precision_loss)]
            let failure_pct = (report.failed as f64 / report.total_records as f64) * 100.0;
            if failure_pct > f64::from(pct_threshold) {
                EXIT_POLICY_FAILURE
            } else {
                0
            }
        }
    }
}
