//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use media_dl::extractor::{ExtractOptions, ExtractedEntry, Extraction, ExtractorCapabilities};
use media_dl::{Config, Extractor, ExtractionError, MediaDownloader, ProgressSnapshot};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Extractor that writes `{title}.mp4` for every URL not containing "private"
pub struct FakeExtractor;

#[async_trait]
impl Extractor for FakeExtractor {
    async fn extract(
        &self,
        url: &str,
        target_dir: &Path,
        _options: &ExtractOptions,
        _cancel: CancellationToken,
    ) -> Result<Extraction, ExtractionError> {
        if url.contains("private") {
            return Err(ExtractionError::failed("Private video"));
        }

        let title = url.rsplit('/').next().unwrap_or("video").to_string();
        let file = target_dir.join(format!("{}.mp4", title));
        tokio::fs::write(&file, title.as_bytes())
            .await
            .map_err(|e| ExtractionError::failed(e.to_string()))?;

        Ok(Extraction::single(ExtractedEntry {
            title: Some(title),
            uploader: Some("uploader".into()),
            filename: Some(file.to_string_lossy().into_owned()),
            is_video: true,
            ..Default::default()
        }))
    }

    fn capabilities(&self) -> ExtractorCapabilities {
        ExtractorCapabilities {
            can_download: true,
            can_list_formats: false,
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Downloader over a fresh temporary root
pub async fn create_downloader() -> (MediaDownloader, TempDir) {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");

    let downloader = MediaDownloader::with_extractor(config, Arc::new(FakeExtractor))
        .await
        .expect("downloader");
    (downloader, temp_dir)
}

/// Poll until the foreground job reaches a terminal state
pub async fn poll_until_done(downloader: &MediaDownloader) -> ProgressSnapshot {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = downloader.poll_progress();
            if snapshot.state.is_terminal() {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("download did not finish in time")
}
