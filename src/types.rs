//! Core types for media-dl

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::platform::Platform;

/// A request to download the content behind one URL
///
/// Immutable once built; the runner only ever reads it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DownloadRequest {
    /// URL of the content (must not be empty)
    pub url: String,

    /// Base directory for this download instead of the configured download root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_path: Option<String>,

    /// Format selector passed verbatim to the extractor instead of the platform default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
}

impl DownloadRequest {
    /// Create a request for a URL with platform defaults
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            custom_path: None,
            quality: None,
        }
    }

    /// Override the format selector
    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    /// Download below a custom base directory
    pub fn with_custom_path(mut self, path: impl Into<String>) -> Self {
        self.custom_path = Some(path.into());
        self
    }

    /// The URL with surrounding whitespace removed
    pub fn trimmed_url(&self) -> &str {
        self.url.trim()
    }

    /// The quality override exactly as given, ignoring blank values
    pub fn quality_override(&self) -> Option<&str> {
        self.quality.as_deref().filter(|q| !q.trim().is_empty())
    }
}

/// Lifecycle state of the foreground job
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// No job has run since startup
    #[default]
    Idle,
    /// A job is being extracted
    Running,
    /// The last job finished successfully
    Succeeded,
    /// The last job failed
    Failed,
}

impl JobState {
    /// Whether the state is a final outcome
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

/// Outcome status of a single download
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    /// Content was downloaded (possibly with some playlist entries skipped)
    Success,
    /// Nothing usable was downloaded
    Error,
}

/// Result of one download, as reported to pollers and bulk callers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DownloadResult {
    /// Success or error
    pub status: ResultStatus,

    /// Human-readable summary (e.g. "TikTok video downloaded successfully!")
    pub message: String,

    /// Title of the downloaded item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Uploader / account name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,

    /// Kind of content ("video", "playlist", "reel", "stories", ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Titles of playlist entries (first five only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub titles: Vec<String>,

    /// Files written by the extractor, relative to the job folder
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,

    /// Name of the job folder under the download root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,

    /// Raw platform-specific metadata of the first entry
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl DownloadResult {
    /// A successful result with only a message
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Success,
            message: message.into(),
            title: None,
            uploader: None,
            content_type: None,
            titles: Vec::new(),
            files: Vec::new(),
            folder: None,
            metadata: serde_json::Value::Null,
        }
    }

    /// A failed result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Error,
            ..Self::success(message)
        }
    }

    /// Whether the download succeeded
    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }
}

/// Latest reported state of the current (or most recent) foreground job
///
/// Serialized with the `progress`/`status`/`filename` keys pollers expect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProgressSnapshot {
    /// 0 while running or after failure, 100 after success
    #[serde(rename = "progress")]
    pub percent: u8,

    /// Status line ("idle", "Starting download...", "Download completed!", "Download failed")
    pub status: String,

    /// Name of the produced file once the job succeeded
    pub filename: String,

    /// Lifecycle state of the job
    pub state: JobState,

    /// Platform of the job, once one has started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,

    /// Failure message of the last job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressSnapshot {
    /// Status text of the snapshot before any job ran
    pub const IDLE: &'static str = "idle";
    /// Status text written when a job starts
    pub const STARTING: &'static str = "Starting download...";
    /// Status text written when a job succeeds
    pub const COMPLETED: &'static str = "Download completed!";
    /// Status text written when a job fails
    pub const FAILED: &'static str = "Download failed";

    /// Snapshot before any job ran
    pub fn idle() -> Self {
        Self {
            percent: 0,
            status: Self::IDLE.to_string(),
            filename: String::new(),
            state: JobState::Idle,
            platform: None,
            error: None,
        }
    }

    /// Snapshot written when a job starts
    pub fn starting(platform: Platform) -> Self {
        Self {
            percent: 0,
            status: Self::STARTING.to_string(),
            filename: String::new(),
            state: JobState::Running,
            platform: Some(platform),
            error: None,
        }
    }

    /// Snapshot written when a job succeeds
    pub fn completed(platform: Platform, filename: impl Into<String>) -> Self {
        Self {
            percent: 100,
            status: Self::COMPLETED.to_string(),
            filename: filename.into(),
            state: JobState::Succeeded,
            platform: Some(platform),
            error: None,
        }
    }

    /// Snapshot written when a job fails
    pub fn failed(platform: Platform, error: impl Into<String>) -> Self {
        Self {
            percent: 0,
            status: Self::FAILED.to_string(),
            filename: String::new(),
            state: JobState::Failed,
            platform: Some(platform),
            error: Some(error.into()),
        }
    }
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}

/// Acknowledgement of an accepted download submission
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubmitAck {
    /// Always true; rejected submissions are reported as errors
    pub accepted: bool,
    /// Platform the URL was classified as
    pub platform: Platform,
    /// Whether the job waits behind a running one
    pub queued: bool,
}

/// Outcome for one URL of a bulk submission
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BulkEntry {
    /// The URL exactly as submitted
    pub url: String,
    /// Result of downloading it
    #[serde(flatten)]
    pub result: DownloadResult,
}

/// Ordered per-URL outcomes of a bulk submission
///
/// Entries appear in input order; blank input entries are not represented.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct BulkResult {
    /// Entries in input order
    pub entries: Vec<BulkEntry>,
}

impl BulkResult {
    /// Number of processed URLs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no URL was processed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in input order
    pub fn iter(&self) -> std::slice::Iter<'_, BulkEntry> {
        self.entries.iter()
    }

    /// Number of successful entries
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_success()).count()
    }

    /// Number of failed entries
    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }
}

impl IntoIterator for BulkResult {
    type Item = BulkEntry;
    type IntoIter = std::vec::IntoIter<BulkEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Kind of an item directly under the download root
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Regular file
    File,
    /// Directory (usually a job folder)
    Folder,
}

/// One item directly under the download root
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OutputEntry {
    /// File or folder name
    pub name: String,
    /// File or folder
    #[serde(rename = "type")]
    pub kind: OutputKind,
    /// Size in bytes (files only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Number of regular files directly inside (folders only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<usize>,
}

/// One downloadable format reported by the extractor
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormatInfo {
    /// Format identifier usable as a quality selector
    pub format_id: String,
    /// Container extension
    pub ext: String,
    /// Resolution ("1920x1080", "audio only", ...)
    pub resolution: String,
    /// Size in bytes when known (0 otherwise)
    pub filesize: u64,
    /// Human-readable note ("1080p", "medium", ...)
    pub format_note: String,
    /// Video codec ("none" for audio-only formats)
    pub vcodec: String,
    /// Audio codec ("none" for video-only formats)
    pub acodec: String,
}

/// Formats available for a URL
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormatListing {
    /// Title of the content
    pub title: String,
    /// Uploader of the content
    pub uploader: String,
    /// Formats with both a note and an extension
    pub formats: Vec<FormatInfo>,
}

/// Supported platforms and features, for display
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SupportedPlatforms {
    /// Platforms with video downloads
    pub video_platforms: Vec<String>,
    /// Platforms with post/story/profile downloads
    pub social_platforms: Vec<String>,
    /// Feature list
    pub features: Vec<String>,
}

/// Current system capabilities
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Capabilities {
    /// Name of the extractor implementation in use
    pub extractor: String,
    /// Whether the extractor can download content
    pub can_download: bool,
    /// Whether the extractor can list formats
    pub can_list_formats: bool,
    /// Active submission policy ("queue", "reject" or "concurrent")
    pub submission_policy: String,
    /// Number of bulk URLs processed at once
    pub bulk_concurrency: usize,
}

/// Event emitted during the download lifecycle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A submission is waiting behind the running job
    JobQueued {
        /// Submitted URL
        url: String,
        /// Detected platform
        platform: Platform,
    },

    /// A foreground job started
    JobStarted {
        /// Submitted URL
        url: String,
        /// Detected platform
        platform: Platform,
        /// Allocated job folder name
        folder: String,
    },

    /// A foreground job finished successfully
    JobCompleted {
        /// Submitted URL
        url: String,
        /// Detected platform
        platform: Platform,
        /// Produced file name
        filename: String,
    },

    /// A foreground job failed
    JobFailed {
        /// Submitted URL
        url: String,
        /// Detected platform
        platform: Platform,
        /// Failure message
        error: String,
    },

    /// A bulk submission started
    BulkStarted {
        /// Number of non-blank URLs
        total: usize,
    },

    /// One URL of a bulk submission finished
    BulkItemFinished {
        /// Position among the non-blank URLs
        index: usize,
        /// The URL as submitted
        url: String,
        /// Outcome
        status: ResultStatus,
    },

    /// A bulk submission finished
    BulkCompleted {
        /// Number of successful URLs
        succeeded: usize,
        /// Number of failed URLs
        failed: usize,
    },

    /// The download root was cleared
    OutputsCleared,

    /// Shutdown initiated
    Shutdown,
}

impl Event {
    /// Event name used for server-sent events
    pub fn name(&self) -> &'static str {
        match self {
            Event::JobQueued { .. } => "job_queued",
            Event::JobStarted { .. } => "job_started",
            Event::JobCompleted { .. } => "job_completed",
            Event::JobFailed { .. } => "job_failed",
            Event::BulkStarted { .. } => "bulk_started",
            Event::BulkItemFinished { .. } => "bulk_item_finished",
            Event::BulkCompleted { .. } => "bulk_completed",
            Event::OutputsCleared => "outputs_cleared",
            Event::Shutdown => "shutdown",
        }
    }
}
