//! Core downloader implementation split into focused submodules.
//!
//! The `MediaDownloader` struct and its methods are organized by domain:
//! - [`submit`] - Foreground submissions and the single job slot
//! - [`job`] - Job preparation, extraction and result shaping
//! - [`bulk`] - Ordered batch downloads
//! - [`outputs`] - Listing, serving, archiving and clearing the download root
//! - [`lifecycle`] - Shutdown coordination

mod bulk;
mod job;
mod lifecycle;
mod outputs;
mod submit;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use outputs::OutputFile;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extractor::{Extractor, NoOpExtractor, YtDlpExtractor};
use crate::paths::PathManager;
use crate::progress::ProgressStore;
use crate::types::{Capabilities, Event, FormatListing, ProgressSnapshot, SupportedPlatforms};
use job::PreparedJob;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Occupancy of the foreground job slot
#[derive(Default)]
pub(crate) struct SlotState {
    /// Foreground jobs currently executing (at most one unless the policy is `Concurrent`)
    pub(crate) running: usize,
    /// Submission waiting for the running job to finish
    pub(crate) pending: Option<PreparedJob>,
}

/// Job scheduling and cancellation state
#[derive(Clone)]
pub(crate) struct JobTracking {
    /// Foreground slot (protected by Mutex)
    pub(crate) slot: Arc<Mutex<SlotState>>,
    /// Cancellation tokens of every executing job, foreground and bulk
    pub(crate) active: Arc<Mutex<HashMap<u64, CancellationToken>>>,
    /// Source of job ids
    pub(crate) next_id: Arc<AtomicU64>,
    /// Cleared during shutdown
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl JobTracking {
    pub(crate) fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(SlotState::default())),
            active: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            accepting_new: Arc::new(AtomicBool::new(true)),
        }
    }
}

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct MediaDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Latest foreground job snapshot
    pub(crate) progress: ProgressStore,
    /// Download root and job folder allocation
    pub(crate) paths: PathManager,
    /// Content extractor (trait object for pluggable implementations)
    pub(crate) extractor: Arc<dyn Extractor>,
    /// Job scheduling and cancellation state
    pub(crate) jobs: JobTracking,
}

impl MediaDownloader {
    /// Create a new MediaDownloader instance
    ///
    /// Validates the configuration, creates the download root and picks an
    /// extractor: the configured `ytdlp_path`, else yt-dlp from PATH (when
    /// `search_path` is set), else [`NoOpExtractor`].
    pub async fn new(config: Config) -> Result<Self> {
        let extractor: Arc<dyn Extractor> = if let Some(ref path) = config.tools.ytdlp_path {
            Arc::new(YtDlpExtractor::new(path.clone()))
        } else if config.tools.search_path {
            match YtDlpExtractor::from_path() {
                Some(found) => {
                    tracing::info!(binary = %found.binary_path().display(), "found yt-dlp on PATH");
                    Arc::new(found)
                }
                None => {
                    tracing::warn!("yt-dlp not found on PATH, downloads will fail");
                    Arc::new(NoOpExtractor)
                }
            }
        } else {
            Arc::new(NoOpExtractor)
        };

        Self::with_extractor(config, extractor).await
    }

    /// Create a MediaDownloader with an explicit extractor
    pub async fn with_extractor(config: Config, extractor: Arc<dyn Extractor>) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(config.download_dir())
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download_dir().display(),
                        e
                    ),
                ))
            })?;

        let caps = extractor.capabilities();
        tracing::info!(
            extractor = extractor.name(),
            can_download = caps.can_download,
            can_list_formats = caps.can_list_formats,
            "Extractor initialized"
        );

        // Buffer of 1000 events per subscriber
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        Ok(Self {
            paths: PathManager::new(
                config.download_dir().clone(),
                config.download.max_filename_length,
            ),
            config: Arc::new(config),
            event_tx,
            progress: ProgressStore::new(),
            extractor,
            jobs: JobTracking::new(),
        })
    }

    /// Subscribe to download events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// A subscriber that falls behind by more than 1000 events receives `RecvError::Lagged`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use media_dl::{Config, MediaDownloader};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = MediaDownloader::new(Config::default()).await?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             tracing::info!(?event, "download event");
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Latest snapshot of the foreground job; never blocks
    pub fn poll_progress(&self) -> ProgressSnapshot {
        self.progress.get()
    }

    /// Receiver notified whenever the foreground snapshot changes
    pub fn progress_updates(&self) -> tokio::sync::watch::Receiver<ProgressSnapshot> {
        self.progress.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// List the formats available for a URL without downloading it
    pub async fn list_formats(&self, url: &str) -> Result<FormatListing> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::Validation("URL is required".into()));
        }
        self.extractor.list_formats(url).await
    }

    /// Platforms and features advertised to clients
    pub fn supported_platforms(&self) -> SupportedPlatforms {
        crate::platform::supported_platforms()
    }

    /// Query the current system capabilities
    pub fn capabilities(&self) -> Capabilities {
        let caps = self.extractor.capabilities();
        Capabilities {
            extractor: self.extractor.name().to_string(),
            can_download: caps.can_download,
            can_list_formats: caps.can_list_formats,
            submission_policy: self.config.download.submission_policy.as_str().to_string(),
            bulk_concurrency: self.config.download.bulk_concurrency,
        }
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Spawn the REST API server in a background task
    ///
    /// Listens on the configured bind address (default: 127.0.0.1:5000).
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, config).await })
    }
}
