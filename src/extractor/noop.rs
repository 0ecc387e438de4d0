//! No-op extractor for graceful degradation

use super::traits::{ExtractOptions, Extraction, Extractor, ExtractorCapabilities};
use crate::error::ExtractionError;
use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Extractor used when no yt-dlp binary is available
///
/// Every download fails with [`ExtractionError::ToolUnavailable`]. Jobs still
/// run through the normal pipeline and record that failure, so pollers see a
/// "Download failed" snapshot instead of a stuck job.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpExtractor;

const UNAVAILABLE: &str = "yt-dlp is not available. \
     Configure ytdlp_path in config or ensure yt-dlp is in PATH.";

#[async_trait]
impl Extractor for NoOpExtractor {
    async fn extract(
        &self,
        _url: &str,
        _target_dir: &Path,
        _options: &ExtractOptions,
        _cancel: CancellationToken,
    ) -> Result<Extraction, ExtractionError> {
        Err(ExtractionError::ToolUnavailable(UNAVAILABLE.into()))
    }

    fn capabilities(&self) -> ExtractorCapabilities {
        ExtractorCapabilities {
            can_download: false,
            can_list_formats: false,
        }
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
