//! Shutdown coordination.

use crate::error::Result;
use crate::types::Event;
use std::sync::atomic::Ordering;
use std::time::Duration;

use super::MediaDownloader;

/// How long shutdown waits for running jobs to record their outcome
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

impl MediaDownloader {
    /// Gracefully shut down the downloader
    ///
    /// This method performs a graceful shutdown sequence:
    /// 1. Stops accepting submissions ([`Error::ShuttingDown`](crate::Error::ShuttingDown))
    /// 2. Drops the queued submission, if any, and removes its empty folder
    /// 3. Cancels every running job (foreground and bulk)
    /// 4. Waits up to 30 seconds for those jobs to record their outcome
    /// 5. Emits [`Event::Shutdown`]
    ///
    /// Calling it more than once is harmless.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        // 1. Stop accepting new submissions
        self.jobs.accepting_new.store(false, Ordering::SeqCst);

        // 2. Drop the queued submission; it never started
        let dropped = self.jobs.slot.lock().await.pending.take();
        if let Some(job) = dropped {
            tracing::info!(job_id = job.id, url = %job.url, "dropped queued download");
            if let Err(e) = std::fs::remove_dir(&job.folder) {
                tracing::debug!(folder = %job.folder.display(), error = %e, "queued job folder left in place");
            }
        }

        // 3. Cancel running jobs
        self.cancel_all().await;

        // 4. Wait for running jobs with timeout
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.wait_for_active_jobs()).await {
            Ok(()) => tracing::info!("All running jobs finished"),
            Err(_) => tracing::warn!("Timeout waiting for running jobs, proceeding with shutdown"),
        }

        // 5. Emit shutdown event
        self.emit_event(Event::Shutdown);

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }

    /// Signal cancellation to every running job
    async fn cancel_all(&self) {
        let active = self.jobs.active.lock().await;
        tracing::debug!(active_count = active.len(), "Cancelling running jobs");

        for (id, token) in active.iter() {
            tracing::debug!(job_id = id, "Signaling cancellation");
            token.cancel();
        }
    }

    async fn wait_for_active_jobs(&self) {
        loop {
            let active_count = self.jobs.active.lock().await.len();
            if active_count == 0 {
                return;
            }

            tracing::debug!(active_count, "Waiting for running jobs to finish");
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}
