//! Shared test helpers for creating MediaDownloader instances in tests.

use crate::config::Config;
use crate::downloader::MediaDownloader;
use crate::error::ExtractionError;
use crate::extractor::{ExtractOptions, ExtractedEntry, Extraction, Extractor, ExtractorCapabilities};
use crate::types::{FormatInfo, FormatListing};
use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Name of the media file the mock writes for every successful URL
pub(crate) const MOCK_FILE: &str = "clip.mp4";

/// Scripted extractor
///
/// Behaviour is chosen by the URL:
/// - containing `fail`: fails with "HTTP Error 404: Not Found"
/// - containing `unsupported`: fails as an unsupported URL
/// - containing `panic`: panics
/// - anything else: writes [`MOCK_FILE`] into the target directory and succeeds
///
/// A gated mock blocks every call until [`release`](Self::release) hands out a
/// permit or the job is cancelled.
pub(crate) struct MockExtractor {
    gate: Option<Arc<Semaphore>>,
    calls: Mutex<Vec<(String, ExtractOptions)>>,
}

impl MockExtractor {
    /// Mock that finishes every call immediately
    pub(crate) fn new() -> Self {
        Self {
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Mock whose calls wait for [`release`](Self::release)
    pub(crate) fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Let `n` waiting (or future) calls proceed
    pub(crate) fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// URLs seen so far, in call order
    pub(crate) fn urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Options passed with the most recent call
    pub(crate) fn last_options(&self) -> Option<ExtractOptions> {
        self.calls.lock().unwrap().last().map(|(_, o)| o.clone())
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(
        &self,
        url: &str,
        target_dir: &Path,
        options: &ExtractOptions,
        cancel: CancellationToken,
    ) -> Result<Extraction, ExtractionError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), options.clone()));

        if let Some(gate) = &self.gate {
            tokio::select! {
                permit = gate.acquire() => permit.unwrap().forget(),
                _ = cancel.cancelled() => return Err(ExtractionError::Cancelled),
            }
        }

        if url.contains("panic") {
            panic!("mock extractor asked to panic");
        }
        if url.contains("unsupported") {
            return Err(ExtractionError::UnsupportedUrl(url.to_string()));
        }
        if url.contains("fail") {
            return Err(ExtractionError::failed("HTTP Error 404: Not Found"));
        }

        let file = target_dir.join(MOCK_FILE);
        tokio::fs::write(&file, b"media").await.unwrap();

        Ok(Extraction::single(ExtractedEntry {
            id: Some("abc123".into()),
            title: Some("Test Clip".into()),
            uploader: Some("tester".into()),
            extractor: Some("mock".into()),
            filename: Some(file.to_string_lossy().into_owned()),
            is_video: true,
            playlist_index: None,
            raw: json!({ "id": "abc123", "title": "Test Clip" }),
        }))
    }

    async fn list_formats(&self, url: &str) -> crate::Result<FormatListing> {
        if url.contains("fail") {
            return Err(ExtractionError::failed("HTTP Error 404: Not Found").into());
        }
        Ok(FormatListing {
            title: "Test Clip".into(),
            uploader: "tester".into(),
            formats: vec![FormatInfo {
                format_id: "18".into(),
                ext: "mp4".into(),
                resolution: "640x360".into(),
                filesize: 1024,
                format_note: "360p".into(),
                vcodec: "avc1".into(),
                acodec: "mp4a".into(),
            }],
        })
    }

    fn capabilities(&self) -> ExtractorCapabilities {
        ExtractorCapabilities {
            can_download: true,
            can_list_formats: true,
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to create a test MediaDownloader backed by an immediate [`MockExtractor`].
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader() -> (MediaDownloader, tempfile::TempDir) {
    let (downloader, _mock, temp_dir) =
        create_test_downloader_with(|_| {}, MockExtractor::new()).await;
    (downloader, temp_dir)
}

/// Helper to create a test MediaDownloader with config tweaks and a given mock.
/// The mock is returned as well so tests can release gated calls and inspect them.
pub(crate) async fn create_test_downloader_with(
    tweak: impl FnOnce(&mut Config),
    mock: MockExtractor,
) -> (MediaDownloader, Arc<MockExtractor>, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();

    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.tools.search_path = false;
    tweak(&mut config);

    let mock = Arc::new(mock);
    let downloader = MediaDownloader::with_extractor(config, mock.clone())
        .await
        .unwrap();

    (downloader, mock, temp_dir)
}

/// Poll until the foreground snapshot reaches a terminal state
pub(crate) async fn wait_for_terminal(downloader: &MediaDownloader) -> crate::types::ProgressSnapshot {
    let mut updates = downloader.progress_updates();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = updates.borrow_and_update().clone();
            if snapshot.state.is_terminal() {
                return snapshot;
            }
            updates.changed().await.unwrap();
        }
    })
    .await
    .expect("job did not finish in time")
}

/// Wait until the mock has been called `n` times
pub(crate) async fn wait_for_calls(mock: &MockExtractor, n: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while mock.urls().len() < n {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("extractor was not called in time");
}

/// Receive events until one matches `pred`
pub(crate) async fn wait_for_event(
    events: &mut tokio::sync::broadcast::Receiver<crate::types::Event>,
    pred: impl Fn(&crate::types::Event) -> bool,
) -> crate::types::Event {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = events.recv().await.unwrap();
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("event not received in time")
}
