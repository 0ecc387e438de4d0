//! Ordered batch downloads.

use crate::error::{Error, ExtractionError, Result};
use crate::platform;
use crate::types::{BulkEntry, BulkResult, DownloadRequest, DownloadResult, Event};
use futures::stream::{self, StreamExt};
use std::sync::atomic::Ordering;

use super::MediaDownloader;

impl MediaDownloader {
    /// Download a list of URLs and report one result per non-blank URL
    ///
    /// Blank entries are skipped without a trace in the result. Every other
    /// URL goes through the same classify, allocate and extract pipeline as
    /// [`submit_download`](Self::submit_download), but this call only returns
    /// once all of them have finished. One URL failing never stops the rest.
    ///
    /// Up to `bulk_concurrency` URLs run at the same time; results always come
    /// back in input order. Bulk runs leave [`poll_progress`](Self::poll_progress)
    /// untouched and report per-item progress through
    /// [`Event::BulkItemFinished`].
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the list is empty
    /// - [`Error::ShuttingDown`] after [`shutdown`](Self::shutdown) was called
    pub async fn submit_bulk(&self, urls: Vec<String>) -> Result<BulkResult> {
        if !self.jobs.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }
        if urls.is_empty() {
            return Err(Error::Validation("URLs list is required".into()));
        }

        let urls: Vec<String> = urls.into_iter().filter(|u| !u.trim().is_empty()).collect();
        let total = urls.len();

        tracing::info!(
            total,
            concurrency = self.config.download.bulk_concurrency,
            "bulk download started"
        );
        self.emit_event(Event::BulkStarted { total });

        let entries: Vec<BulkEntry> = stream::iter(urls.into_iter().enumerate())
            .map(|(index, url)| async move {
                let result = self.run_bulk_item(&url).await;
                self.emit_event(Event::BulkItemFinished {
                    index,
                    url: url.clone(),
                    status: result.status,
                });
                BulkEntry { url, result }
            })
            .buffered(self.config.download.bulk_concurrency)
            .collect()
            .await;

        let result = BulkResult { entries };
        let (succeeded, failed) = (result.succeeded(), result.failed());
        tracing::info!(succeeded, failed, "bulk download finished");
        self.emit_event(Event::BulkCompleted { succeeded, failed });

        Ok(result)
    }

    /// Run one bulk URL to completion; always yields a result
    async fn run_bulk_item(&self, url: &str) -> DownloadResult {
        let profile = platform::classify(url.trim()).profile();

        if !self.jobs.accepting_new.load(Ordering::SeqCst) {
            return DownloadResult::error(profile.error_message(ExtractionError::Cancelled));
        }

        let job = match self.prepare_job(&DownloadRequest::new(url)) {
            Ok(job) => job,
            Err(e) => {
                tracing::error!(url, error = %e, "could not prepare bulk item");
                return DownloadResult::error(profile.error_message(e));
            }
        };

        self.jobs
            .active
            .lock()
            .await
            .insert(job.id, job.cancel.clone());
        // shutdown may have swept the active map before this job was registered
        if !self.jobs.accepting_new.load(Ordering::SeqCst) {
            job.cancel.cancel();
        }

        let result = self.execute(&job).await;
        self.jobs.active.lock().await.remove(&job.id);
        result
    }
}
