//! Traits and types for content extraction

use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::error::ExtractionError;
use crate::platform::{ContentKind, PlatformProfile};
use crate::types::FormatListing;

/// Options handed to an extractor for one download
///
/// Built from a [`PlatformProfile`]; the extractor applies them verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Format selector (platform default or the caller's quality override)
    pub format: String,
    /// Output file name template, relative to the target directory
    pub output_template: String,
    /// Download uploaded subtitles
    pub write_subtitles: bool,
    /// Download automatically generated subtitles
    pub write_auto_subtitles: bool,
    /// Subtitle languages, used when either subtitle flag is set
    pub subtitle_languages: Vec<String>,
    /// Continue past unavailable playlist entries
    pub ignore_errors: bool,
    /// HTTP chunk size in bytes
    pub http_chunk_size: Option<u64>,
    /// Stop after this many entries
    pub max_entries: Option<usize>,
}

impl ExtractOptions {
    /// Options for a platform profile and content kind
    pub fn from_profile(
        profile: &PlatformProfile,
        kind: ContentKind,
        quality: Option<&str>,
        subtitle_languages: &[String],
    ) -> Self {
        Self {
            format: profile.format_for(quality).to_string(),
            output_template: profile.output_template.to_string(),
            write_subtitles: profile.write_subtitles,
            write_auto_subtitles: profile.write_auto_subtitles,
            subtitle_languages: subtitle_languages.to_vec(),
            ignore_errors: profile.ignore_errors,
            http_chunk_size: profile.http_chunk_size,
            max_entries: profile.entry_limit(kind),
        }
    }

    /// Whether any subtitles are requested
    pub fn wants_subtitles(&self) -> bool {
        self.write_subtitles || self.write_auto_subtitles
    }
}

/// One downloaded item as reported by the extractor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedEntry {
    /// Platform-specific identifier
    pub id: Option<String>,
    /// Title of the item
    pub title: Option<String>,
    /// Uploader or account name
    pub uploader: Option<String>,
    /// Name of the site extractor that handled the item
    pub extractor: Option<String>,
    /// Path of the written media file, as reported by the tool
    pub filename: Option<String>,
    /// Whether the item is a video (as opposed to an image)
    pub is_video: bool,
    /// Position within a playlist, if the item came from one
    pub playlist_index: Option<u64>,
    /// Raw metadata object
    pub raw: serde_json::Value,
}

/// Structured result of a successful extraction
///
/// An extraction with skipped playlist entries is still a success; only the
/// entries that were actually downloaded are listed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Downloaded items in download order
    pub entries: Vec<ExtractedEntry>,
}

impl Extraction {
    /// An extraction with a single item
    pub fn single(entry: ExtractedEntry) -> Self {
        Self {
            entries: vec![entry],
        }
    }

    /// The first (or only) item
    pub fn first(&self) -> Option<&ExtractedEntry> {
        self.entries.first()
    }

    /// Whether the items came from a playlist or carousel
    pub fn is_multi(&self) -> bool {
        self.entries.len() > 1 || self.entries.iter().any(|e| e.playlist_index.is_some())
    }

    /// Titles of all items, with `default` for untitled ones
    pub fn titles(&self, default: &str) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.title.clone().unwrap_or_else(|| default.to_string()))
            .collect()
    }
}

/// Capabilities of an extractor implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorCapabilities {
    /// Can download content
    pub can_download: bool,
    /// Can list available formats
    pub can_list_formats: bool,
}

/// Trait for platform content extraction
///
/// Implementations fetch metadata and write media files for a URL. Every
/// failure is returned as an [`ExtractionError`]; the job runner turns it into
/// a recorded error result.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Download the content behind `url` into `target_dir`
    ///
    /// Implementations should stop promptly and return
    /// [`ExtractionError::Cancelled`] once `cancel` fires.
    async fn extract(
        &self,
        url: &str,
        target_dir: &Path,
        options: &ExtractOptions,
        cancel: CancellationToken,
    ) -> Result<Extraction, ExtractionError>;

    /// List the formats available for `url` without downloading
    async fn list_formats(&self, url: &str) -> crate::Result<FormatListing> {
        let _ = url;
        Err(crate::Error::NotSupported(format!(
            "format listing is not available with the {} extractor",
            self.name()
        )))
    }

    /// Query capabilities of this extractor
    fn capabilities(&self) -> ExtractorCapabilities;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
