//! Configuration types for media-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf};

/// What happens when a download is submitted while another one is running
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPolicy {
    /// Hold at most one further submission and start it when the running job ends (default)
    #[default]
    Queue,
    /// Reject any submission while a job is running
    Reject,
    /// Run every submission immediately; concurrent jobs race on the shared progress slot
    Concurrent,
}

impl SubmissionPolicy {
    /// Name as used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionPolicy::Queue => "queue",
            SubmissionPolicy::Reject => "reject",
            SubmissionPolicy::Concurrent => "concurrent",
        }
    }
}

/// Download behavior configuration (directories, submission handling, bulk concurrency)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Download root directory (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Handling of submissions that arrive while a job is running
    #[serde(default)]
    pub submission_policy: SubmissionPolicy,

    /// Number of bulk URLs processed at the same time (default: 1 = sequential)
    ///
    /// Results are always reported in input order regardless of this value.
    #[serde(default = "default_bulk_concurrency")]
    pub bulk_concurrency: usize,

    /// Allow absolute `custom_path` values in download requests (default: false)
    ///
    /// When disabled, a custom path must be relative and is resolved under
    /// `download_dir`.
    #[serde(default)]
    pub allow_absolute_custom_paths: bool,

    /// Maximum length of sanitized file names (default: 100)
    #[serde(default = "default_max_filename_length")]
    pub max_filename_length: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            submission_policy: SubmissionPolicy::default(),
            bulk_concurrency: default_bulk_concurrency(),
            allow_absolute_custom_paths: false,
            max_filename_length: default_max_filename_length(),
        }
    }
}

/// External tool configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Subtitle languages requested from platforms that download subtitles (default: ["en"])
    #[serde(default = "default_subtitle_languages")]
    pub subtitle_languages: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
            subtitle_languages: default_subtitle_languages(),
        }
    }
}

/// API and external server integration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerIntegrationConfig {
    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Main configuration for MediaDownloader
///
/// Fields are organized into sub-configs:
/// - [`download`](DownloadConfig) - download root, submission policy, bulk concurrency
/// - [`tools`](ToolsConfig) - yt-dlp discovery and subtitle languages
/// - [`server`](ServerIntegrationConfig) - REST API
///
/// Sub-configs are flattened, so the JSON form has no nesting.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download behavior settings
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// External tool settings
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// API and external server integration
    #[serde(flatten)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Download root directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Check settings that have no meaningful zero value
    pub fn validate(&self) -> Result<()> {
        if self.download.bulk_concurrency == 0 {
            return Err(Error::Config {
                message: "bulk_concurrency must be at least 1".into(),
                key: Some("bulk_concurrency".into()),
            });
        }
        if self.download.max_filename_length == 0 {
            return Err(Error::Config {
                message: "max_filename_length must be at least 1".into(),
                key: Some("max_filename_length".into()),
            });
        }
        if self.download.download_dir.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "download_dir must not be empty".into(),
                key: Some("download_dir".into()),
            });
        }
        Ok(())
    }
}

// Default value functions
fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_bulk_concurrency() -> usize {
    1
}

fn default_max_filename_length() -> usize {
    100
}

fn default_true() -> bool {
    true
}

fn default_subtitle_languages() -> Vec<String> {
    vec!["en".into()]
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}
