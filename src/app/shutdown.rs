//! Graceful shutdown handling.

use tokio_util::sync::CancellationToken;

/// Stops the background progress logger and waits for it to exit.
///
/// `cancel` must be the logger's own token, not the run token: cancelling it
/// does not affect record dispatch.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    logging_task: Option<tokio::task::JoinHandle<()>>,
) {
    cancel.cancel();
    if let Some(logging_task) = logging_task {
        if let Err(e) = logging_task.await {
            log::debug!("Progress logging task ended abnormally: {e}");
        }
    }
}
