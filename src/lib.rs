//! # media-dl
//!
//! Platform-aware media download orchestration built around yt-dlp.
//!
//! Given a URL from YouTube, Instagram, TikTok, Twitter/X, Facebook, Reddit or
//! another supported site, media-dl classifies the platform, allocates a
//! unique job folder, runs the download in the background with platform
//! specific options and records the outcome for polling clients.
//!
//! ## Design
//!
//! - **Non-blocking submissions** - [`MediaDownloader::submit_download`] returns
//!   as soon as the job is accepted; completion is observed through
//!   [`MediaDownloader::poll_progress`] or [`MediaDownloader::subscribe`]
//! - **One foreground job** - a single-slot queue serializes submissions
//!   (configurable through [`SubmissionPolicy`])
//! - **Ordered bulk runs** - [`MediaDownloader::submit_bulk`] reports results in
//!   input order, optionally running several URLs at once
//! - **Pluggable extraction** - anything implementing [`Extractor`] can do the
//!   actual downloading; [`YtDlpExtractor`] is the default
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_dl::{Config, DownloadRequest, MediaDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = MediaDownloader::new(Config::default()).await?;
//!
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     downloader
//!         .submit_download(DownloadRequest::new("https://www.tiktok.com/@user/video/1"))
//!         .await?;
//!     println!("{:?}", downloader.poll_progress());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Zip packaging of output folders
pub mod archive;
/// Configuration types
pub mod config;
/// Core downloader implementation (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// Content extraction backends
pub mod extractor;
/// Output path allocation and sanitization
pub mod paths;
/// Platform classification and per-platform download profiles
pub mod platform;
/// Single-slot progress store
pub mod progress;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, SubmissionPolicy};
pub use downloader::{MediaDownloader, OutputFile};
pub use error::{ApiError, Error, ErrorDetail, ExtractionError, Result, ToHttpStatus};
pub use extractor::{Extractor, NoOpExtractor, YtDlpExtractor};
pub use platform::{ContentKind, Platform};
pub use types::{
    BulkEntry, BulkResult, Capabilities, DownloadRequest, DownloadResult, Event, FormatInfo,
    FormatListing, JobState, OutputEntry, OutputKind, ProgressSnapshot, ResultStatus, SubmitAck,
    SupportedPlatforms,
};

/// Helper function to run the downloader with graceful signal handling.
///
/// Waits for a termination signal and then calls the downloader's `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, falling back to Ctrl+C if neither can be registered.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use media_dl::{Config, MediaDownloader, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = MediaDownloader::new(Config::default()).await?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(downloader).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: MediaDownloader) -> Result<()> {
    wait_for_signal().await;
    downloader.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments (containers, tests)
    let sigterm = signal(SignalKind::terminate())
        .map_err(|e| tracing::warn!(error = %e, "Could not register SIGTERM handler"))
        .ok();
    let sigint = signal(SignalKind::interrupt())
        .map_err(|e| tracing::warn!(error = %e, "Could not register SIGINT handler"))
        .ok();

    match (sigterm, sigint) {
        (Some(mut sigterm), Some(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = sigint.recv() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            }
        }
        (Some(mut sigterm), None) => {
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (None, Some(mut sigint)) => {
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (None, None) => {
            tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C signal"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C signal"),
    }
}
