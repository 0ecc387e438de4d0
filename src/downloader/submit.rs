//! Foreground submissions and the single job slot.

use crate::config::SubmissionPolicy;
use crate::error::{Error, Result};
use crate::types::{DownloadRequest, Event, ProgressSnapshot, SubmitAck};
use std::sync::atomic::Ordering;

use super::MediaDownloader;
use super::job::PreparedJob;

/// What to do with a submission given the slot occupancy
enum Admission {
    Start,
    Queue,
    Reject,
}

impl MediaDownloader {
    /// Submit a download and return as soon as it is accepted
    ///
    /// Classification and job folder allocation happen before this returns;
    /// extraction runs in a background task. Completion is only observable
    /// through [`poll_progress`](Self::poll_progress) and events.
    ///
    /// When another job is running the configured
    /// [`SubmissionPolicy`] applies: `Queue` holds one submission and rejects
    /// any further one with [`Error::Busy`], `Reject` always answers `Busy`,
    /// `Concurrent` starts the job immediately.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the URL is blank or the custom path is not allowed
    /// - [`Error::Busy`] if the slot cannot take the submission
    /// - [`Error::ShuttingDown`] after [`shutdown`](Self::shutdown) was called
    /// - [`Error::Io`] if the job folder cannot be created
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use media_dl::{Config, DownloadRequest, MediaDownloader};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let downloader = MediaDownloader::new(Config::default()).await?;
    /// let ack = downloader
    ///     .submit_download(DownloadRequest::new("https://www.tiktok.com/@user/video/1"))
    ///     .await?;
    /// println!("accepted as {}", ack.platform);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit_download(&self, request: DownloadRequest) -> Result<SubmitAck> {
        if !self.jobs.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }
        if request.trimmed_url().is_empty() {
            return Err(Error::Validation("URL is required".into()));
        }

        let mut slot = self.jobs.slot.lock().await;
        if !self.jobs.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let admission = match self.config.download.submission_policy {
            _ if slot.running == 0 => Admission::Start,
            SubmissionPolicy::Concurrent => Admission::Start,
            SubmissionPolicy::Queue if slot.pending.is_none() => Admission::Queue,
            SubmissionPolicy::Queue | SubmissionPolicy::Reject => Admission::Reject,
        };

        if let Admission::Reject = admission {
            tracing::warn!(url = request.trimmed_url(), "submission rejected: a download is already running");
            return Err(Error::Busy(
                "a download is already in progress; try again when it finishes".into(),
            ));
        }

        let job = self.prepare_job(&request).map_err(|e| {
            tracing::error!(url = request.trimmed_url(), error = %e, "could not prepare download");
            e
        })?;
        let platform = job.platform;

        match admission {
            Admission::Queue => {
                tracing::info!(
                    job_id = job.id,
                    platform = %platform,
                    url = %job.url,
                    "download queued behind running job"
                );
                self.emit_event(Event::JobQueued {
                    url: job.url.clone(),
                    platform,
                });
                slot.pending = Some(job);
                Ok(SubmitAck {
                    accepted: true,
                    platform,
                    queued: true,
                })
            }
            _ => {
                slot.running += 1;
                self.register(&job).await;
                drop(slot);

                self.announce_start(&job);
                let downloader = self.clone();
                tokio::spawn(async move { downloader.drive(job).await });

                Ok(SubmitAck {
                    accepted: true,
                    platform,
                    queued: false,
                })
            }
        }
    }

    /// Make a job cancellable by shutdown; called with the slot locked
    async fn register(&self, job: &PreparedJob) {
        self.jobs
            .active
            .lock()
            .await
            .insert(job.id, job.cancel.clone());
    }

    /// Publish the start of a job
    fn announce_start(&self, job: &PreparedJob) {
        tracing::info!(
            job_id = job.id,
            platform = %job.platform,
            folder = %job.folder.display(),
            "download started"
        );
        self.progress.set(ProgressSnapshot::starting(job.platform));
        self.emit_event(Event::JobStarted {
            url: job.url.clone(),
            platform: job.platform,
            folder: job.folder_name(),
        });
    }

    /// Run a job, then any submission queued behind it
    async fn drive(self, first: PreparedJob) {
        let mut job = first;
        loop {
            self.run_foreground(job).await;

            let next = {
                let mut slot = self.jobs.slot.lock().await;
                match slot.pending.take() {
                    Some(next) => {
                        self.register(&next).await;
                        Some(next)
                    }
                    None => {
                        slot.running = slot.running.saturating_sub(1);
                        None
                    }
                }
            };

            match next {
                Some(next) => {
                    self.announce_start(&next);
                    job = next;
                }
                None => break,
            }
        }
    }
}
