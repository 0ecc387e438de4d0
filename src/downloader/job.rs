//! Job preparation, extraction and result shaping.

use crate::error::{ExtractionError, Result};
use crate::extractor::{ExtractOptions, Extraction};
use crate::platform::{self, ContentKind, Platform};
use crate::types::{DownloadRequest, DownloadResult, Event, ProgressSnapshot};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tokio_util::sync::CancellationToken;

use super::MediaDownloader;

/// Number of playlist titles included in a result
const MAX_REPORTED_TITLES: usize = 5;

/// A classified request with its job folder already allocated
#[derive(Debug)]
pub(crate) struct PreparedJob {
    pub(crate) id: u64,
    /// Trimmed URL handed to the extractor
    pub(crate) url: String,
    pub(crate) platform: Platform,
    pub(crate) kind: ContentKind,
    pub(crate) quality: Option<String>,
    pub(crate) folder: PathBuf,
    pub(crate) cancel: CancellationToken,
}

impl PreparedJob {
    /// Name of the job folder
    pub(crate) fn folder_name(&self) -> String {
        self.folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl MediaDownloader {
    /// Classify the request and allocate its job folder
    ///
    /// The caller has already checked that the URL is not blank.
    pub(crate) fn prepare_job(&self, request: &DownloadRequest) -> Result<PreparedJob> {
        let url = request.trimmed_url().to_string();
        let platform = platform::classify(&url);
        let base = self.paths.resolve_base(
            request.custom_path.as_deref(),
            self.config.download.allow_absolute_custom_paths,
        )?;
        let folder = self.paths.allocate(&base, platform)?;

        Ok(PreparedJob {
            id: self.jobs.next_id.fetch_add(1, Ordering::Relaxed),
            kind: ContentKind::detect(platform, &url),
            quality: request.quality_override().map(str::to_string),
            url,
            platform,
            folder,
            cancel: CancellationToken::new(),
        })
    }

    /// Run the extractor for a prepared job and describe the outcome
    ///
    /// Never fails: every extractor error (and a panicking extractor) becomes
    /// an error result carrying the platform's error prefix.
    pub(crate) async fn execute(&self, job: &PreparedJob) -> DownloadResult {
        let profile = job.platform.profile();
        let options = ExtractOptions::from_profile(
            profile,
            job.kind,
            job.quality.as_deref(),
            &self.config.tools.subtitle_languages,
        );

        tracing::info!(
            job_id = job.id,
            platform = %job.platform,
            url = %job.url,
            folder = %job.folder.display(),
            format = %options.format,
            "starting download"
        );

        let outcome = AssertUnwindSafe(self.extractor.extract(
            &job.url,
            &job.folder,
            &options,
            job.cancel.clone(),
        ))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| Err(ExtractionError::failed("extractor panicked")));

        let mut result = match outcome {
            Ok(extraction) => {
                let files = reported_first(list_job_files(&job.folder).await, &extraction);
                summarize(job.platform, job.kind, &job.url, &extraction, files)
            }
            Err(e) => {
                tracing::error!(
                    job_id = job.id,
                    platform = %job.platform,
                    url = %job.url,
                    error = %e,
                    "download failed"
                );
                DownloadResult::error(profile.error_message(&e))
            }
        };
        result.folder = Some(job.folder_name());
        result
    }

    /// Execute a foreground job and record its terminal snapshot
    pub(crate) async fn run_foreground(&self, job: PreparedJob) {
        let result = self.execute(&job).await;

        if result.is_success() {
            let filename = produced_filename(&result, &job);
            tracing::info!(
                job_id = job.id,
                platform = %job.platform,
                filename = %filename,
                "download completed"
            );
            self.progress
                .set(ProgressSnapshot::completed(job.platform, filename.clone()));
            self.emit_event(Event::JobCompleted {
                url: job.url.clone(),
                platform: job.platform,
                filename,
            });
        } else {
            self.progress
                .set(ProgressSnapshot::failed(job.platform, result.message.clone()));
            self.emit_event(Event::JobFailed {
                url: job.url.clone(),
                platform: job.platform,
                error: result.message,
            });
        }

        self.jobs.active.lock().await.remove(&job.id);
    }
}

/// Shape a successful extraction into the platform's result wording
pub(crate) fn summarize(
    platform: Platform,
    kind: ContentKind,
    url: &str,
    extraction: &Extraction,
    files: Vec<String>,
) -> DownloadResult {
    let profile = platform.profile();
    let first = extraction.first();
    let uploader = || {
        first
            .and_then(|e| e.uploader.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    };

    let mut result = match (platform, kind) {
        (Platform::YouTube, _) if kind == ContentKind::Playlist || extraction.is_multi() => {
            let mut titles = extraction.titles("Unknown");
            let mut result = DownloadResult::success(format!(
                "Downloaded {} videos from playlist",
                titles.len()
            ));
            titles.truncate(MAX_REPORTED_TITLES);
            result.titles = titles;
            result.content_type = Some("playlist".into());
            result
        }
        (Platform::Instagram, ContentKind::Stories) => {
            let user = platform::instagram_username(url).unwrap_or_else(uploader);
            let mut result =
                DownloadResult::success(format!("Instagram stories downloaded for {}", user));
            result.uploader = Some(user);
            result.content_type = Some("stories".into());
            result
        }
        (Platform::Instagram, ContentKind::Profile) => {
            let user = platform::instagram_username(url).unwrap_or_else(uploader);
            let mut result = DownloadResult::success(format!(
                "Downloaded {} recent posts from {}",
                extraction.entries.len(),
                user
            ));
            result.uploader = Some(user);
            result.content_type = Some("profile".into());
            result
        }
        (Platform::Instagram, _) => {
            let label = if extraction.entries.len() > 1 {
                "carousel"
            } else if first.is_some_and(|e| e.is_video) {
                "reel"
            } else {
                "post"
            };
            let mut result =
                DownloadResult::success(format!("Instagram {} downloaded successfully!", label));
            result.uploader = Some(uploader());
            result.content_type = Some(label.into());
            result
        }
        _ => {
            let mut result = DownloadResult::success(profile.success_message);
            result.title = Some(
                first
                    .and_then(|e| e.title.clone())
                    .unwrap_or_else(|| profile.default_title.to_string()),
            );
            if profile.reports_uploader {
                result.uploader = Some(uploader());
            }
            result.content_type = Some(profile.result_type.into());
            result
        }
    };

    result.files = files;
    result.metadata = first.map(|e| e.raw.clone()).unwrap_or_default();
    result
}

/// File name reported to pollers: the first produced file, else the folder
fn produced_filename(result: &DownloadResult, job: &PreparedJob) -> String {
    result
        .files
        .first()
        .and_then(|f| Path::new(f).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| job.folder_name())
}

/// Move the media files the extractor reported to the front, keeping the rest in order
fn reported_first(mut files: Vec<String>, extraction: &Extraction) -> Vec<String> {
    let base_name = |f: &str| {
        Path::new(f)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    };
    let reported: Vec<String> = extraction
        .entries
        .iter()
        .filter_map(|e| e.filename.as_deref())
        .filter_map(base_name)
        .collect();

    files.sort_by_key(|f| {
        base_name(f.as_str())
            .and_then(|name| reported.iter().position(|r| *r == name))
            .unwrap_or(usize::MAX)
    });
    files
}

/// Regular files below a job folder, relative and `/`-separated, sorted
async fn list_job_files(folder: &Path) -> Vec<String> {
    let folder = folder.to_path_buf();
    let listed = tokio::task::spawn_blocking(move || {
        walkdir::WalkDir::new(&folder)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry.path().strip_prefix(&folder).ok().map(|rel| {
                    rel.components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect::<Vec<_>>()
                        .join("/")
                })
            })
            .collect::<Vec<_>>()
    })
    .await;

    listed.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not list job folder");
        Vec::new()
    })
}
