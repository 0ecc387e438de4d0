//! Extractor backed by the yt-dlp command line tool

use super::parser::{parse_entries, parse_failure, parse_format_listing};
use super::traits::{ExtractOptions, Extraction, Extractor, ExtractorCapabilities};
use crate::error::ExtractionError;
use crate::types::FormatListing;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Extractor that runs an external `yt-dlp` binary
///
/// Each download is one yt-dlp invocation with `--dump-json --no-simulate`,
/// so the tool prints a metadata object for every entry it writes. The child
/// process is killed when the job is cancelled.
///
/// # Examples
///
/// ```no_run
/// use media_dl::extractor::{Extractor, YtDlpExtractor};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = YtDlpExtractor::from_path().expect("yt-dlp not found in PATH");
/// let listing = extractor.list_formats("https://youtu.be/dQw4w9WgXcQ").await?;
/// println!("{} formats", listing.formats.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    binary_path: PathBuf,
}

impl YtDlpExtractor {
    /// Create an extractor with an explicit binary path
    pub fn new(binary_path: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Path of the binary this extractor runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary_path);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

/// Command line arguments for one download
pub(crate) fn download_args(url: &str, target_dir: &Path, options: &ExtractOptions) -> Vec<String> {
    let template = target_dir.join(&options.output_template);

    let mut args = vec![
        "--dump-json".to_string(),
        "--no-simulate".to_string(),
        "--no-progress".to_string(),
        "-f".to_string(),
        options.format.clone(),
        "-o".to_string(),
        template.to_string_lossy().into_owned(),
    ];

    if options.write_subtitles {
        args.push("--write-subs".into());
    }
    if options.write_auto_subtitles {
        args.push("--write-auto-subs".into());
    }
    if options.wants_subtitles() && !options.subtitle_languages.is_empty() {
        args.push("--sub-langs".into());
        args.push(options.subtitle_languages.join(","));
    }
    if options.ignore_errors {
        args.push("--ignore-errors".into());
    }
    if let Some(chunk) = options.http_chunk_size {
        args.push("--http-chunk-size".into());
        args.push(chunk.to_string());
    }
    if let Some(limit) = options.max_entries {
        args.push("--playlist-end".into());
        args.push(limit.to_string());
    }

    args.push("--".into());
    args.push(url.to_string());
    args
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    async fn extract(
        &self,
        url: &str,
        target_dir: &Path,
        options: &ExtractOptions,
        cancel: CancellationToken,
    ) -> Result<Extraction, ExtractionError> {
        let args = download_args(url, target_dir, options);
        tracing::debug!(binary = %self.binary_path.display(), ?args, "running yt-dlp");

        let child = self.command().args(&args).spawn().map_err(|e| {
            ExtractionError::ToolUnavailable(format!(
                "failed to execute {}: {}",
                self.binary_path.display(),
                e
            ))
        })?;

        let output = tokio::select! {
            output = child.wait_with_output() => output.map_err(|e| {
                ExtractionError::failed(format!("yt-dlp did not finish: {}", e))
            })?,
            _ = cancel.cancelled() => {
                tracing::info!(url, "yt-dlp cancelled");
                return Err(ExtractionError::Cancelled);
            }
        };

        let entries = parse_entries(&output.stdout);
        let succeeded = output.status.success();

        if !entries.is_empty() && (succeeded || options.ignore_errors) {
            if !succeeded {
                tracing::warn!(
                    url,
                    downloaded = entries.len(),
                    "yt-dlp skipped some entries"
                );
            }
            return Ok(Extraction { entries });
        }

        if succeeded {
            return Err(ExtractionError::InvalidOutput(
                "yt-dlp reported no downloaded entries".into(),
            ));
        }

        Err(parse_failure(url, &output.stderr, output.status.code()))
    }

    async fn list_formats(&self, url: &str) -> crate::Result<FormatListing> {
        let output = self
            .command()
            .args(["--dump-single-json", "--skip-download", "--no-warnings", "--", url])
            .output()
            .await
            .map_err(|e| {
                ExtractionError::ToolUnavailable(format!(
                    "failed to execute {}: {}",
                    self.binary_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(parse_failure(url, &output.stderr, output.status.code()).into());
        }

        let info: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| ExtractionError::InvalidOutput(e.to_string()))?;
        Ok(parse_format_listing(&info))
    }

    fn capabilities(&self) -> ExtractorCapabilities {
        ExtractorCapabilities {
            can_download: true,
            can_list_formats: true,
        }
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ContentKind, Platform};
    use tempfile::TempDir;

    fn options_for(platform: Platform, kind: ContentKind, quality: Option<&str>) -> ExtractOptions {
        ExtractOptions::from_profile(platform.profile(), kind, quality, &["en".to_string()])
    }

    #[test]
    fn youtube_args_carry_profile_flags() {
        let opts = options_for(Platform::YouTube, ContentKind::Single, None);
        let args = download_args("https://youtu.be/x", Path::new("/dl/job"), &opts);

        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("-f") + 1], opts.format);
        assert_eq!(
            args[pos("-o") + 1],
            "/dl/job/%(uploader)s - %(title)s.%(ext)s"
        );
        assert_eq!(args[pos("--sub-langs") + 1], "en");
        assert_eq!(args[pos("--http-chunk-size") + 1], "10485760");
        assert!(args.contains(&"--write-subs".to_string()));
        assert!(args.contains(&"--write-auto-subs".to_string()));
        assert!(args.contains(&"--ignore-errors".to_string()));
        assert_eq!(args[args.len() - 2], "--");
        assert_eq!(args.last().unwrap(), "https://youtu.be/x");
    }

    #[test]
    fn generic_args_are_minimal() {
        let opts = options_for(Platform::Unknown, ContentKind::Single, Some("worst"));
        let args = download_args("https://vimeo.com/1", Path::new("/dl"), &opts);

        assert!(args.contains(&"worst".to_string()));
        for flag in ["--write-subs", "--sub-langs", "--ignore-errors", "--playlist-end"] {
            assert!(!args.contains(&flag.to_string()), "{} unexpected", flag);
        }
    }

    #[test]
    fn instagram_profile_limits_entries() {
        let opts = options_for(Platform::Instagram, ContentKind::Profile, None);
        let args = download_args("https://instagram.com/alice", Path::new("/dl"), &opts);

        let pos = args.iter().position(|a| a == "--playlist-end").unwrap();
        assert_eq!(args[pos + 1], "10");
    }

    #[test]
    fn from_path_consistency_with_which_crate() {
        assert_eq!(
            which::which("yt-dlp").ok(),
            YtDlpExtractor::from_path().map(|e| e.binary_path().to_path_buf())
        );
    }

    #[tokio::test]
    async fn missing_binary_is_tool_unavailable() {
        let tmp = TempDir::new().unwrap();
        let extractor = YtDlpExtractor::new(tmp.path().join("no-such-yt-dlp"));
        let opts = options_for(Platform::TikTok, ContentKind::Single, None);

        let err = extractor
            .extract("https://tiktok.com/@a/video/1", tmp.path(), &opts, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::ToolUnavailable(_)));

        let err = extractor.list_formats("https://tiktok.com/@a/video/1").await.unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Extraction(ExtractionError::ToolUnavailable(_))
        ));
    }

    #[cfg(unix)]
    mod scripted {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Write an executable shell script standing in for yt-dlp
        fn fake_ytdlp(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-yt-dlp");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn successful_run_yields_entries() {
            let tmp = TempDir::new().unwrap();
            let script = fake_ytdlp(
                tmp.path(),
                r#"echo '{"id":"1","title":"Clip","uploader":"bob","ext":"mp4"}'"#,
            );
            let extractor = YtDlpExtractor::new(script);
            let opts = options_for(Platform::TikTok, ContentKind::Single, None);

            let extraction = extractor
                .extract("https://tiktok.com/@bob/video/1", tmp.path(), &opts, CancellationToken::new())
                .await
                .unwrap();

            assert_eq!(extraction.entries.len(), 1);
            assert_eq!(extraction.entries[0].title.as_deref(), Some("Clip"));
        }

        #[tokio::test]
        async fn failing_run_reports_error_line() {
            let tmp = TempDir::new().unwrap();
            let script = fake_ytdlp(tmp.path(), "echo 'ERROR: Private video' >&2\nexit 1");
            let extractor = YtDlpExtractor::new(script);
            let opts = options_for(Platform::Twitter, ContentKind::Single, None);

            let err = extractor
                .extract("https://x.com/a/status/1", tmp.path(), &opts, CancellationToken::new())
                .await
                .unwrap_err();

            assert_eq!(err, ExtractionError::failed("Private video"));
        }

        #[tokio::test]
        async fn partial_playlist_with_ignore_errors_succeeds() {
            let tmp = TempDir::new().unwrap();
            let script = fake_ytdlp(
                tmp.path(),
                "echo '{\"id\":\"1\",\"title\":\"One\",\"playlist_index\":1}'\n\
                 echo 'ERROR: entry 2 unavailable' >&2\nexit 1",
            );
            let extractor = YtDlpExtractor::new(script);
            let opts = options_for(Platform::YouTube, ContentKind::Playlist, None);

            let extraction = extractor
                .extract("https://youtube.com/playlist?list=PL1", tmp.path(), &opts, CancellationToken::new())
                .await
                .unwrap();

            assert_eq!(extraction.titles("Unknown"), vec!["One"]);
        }

        #[tokio::test]
        async fn silent_success_is_invalid_output() {
            let tmp = TempDir::new().unwrap();
            let script = fake_ytdlp(tmp.path(), "exit 0");
            let extractor = YtDlpExtractor::new(script);
            let opts = options_for(Platform::Reddit, ContentKind::Single, None);

            let err = extractor
                .extract("https://reddit.com/r/a", tmp.path(), &opts, CancellationToken::new())
                .await
                .unwrap_err();

            assert!(matches!(err, ExtractionError::InvalidOutput(_)));
        }

        #[tokio::test]
        async fn cancellation_stops_the_tool() {
            let tmp = TempDir::new().unwrap();
            let script = fake_ytdlp(tmp.path(), "sleep 30");
            let extractor = YtDlpExtractor::new(script);
            let opts = options_for(Platform::Unknown, ContentKind::Single, None);
            let cancel = CancellationToken::new();

            let trigger = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                trigger.cancel();
            });

            let started = std::time::Instant::now();
            let err = extractor
                .extract("https://example.org/v", tmp.path(), &opts, cancel)
                .await
                .unwrap_err();

            assert_eq!(err, ExtractionError::Cancelled);
            assert!(started.elapsed() < std::time::Duration::from_secs(10));
        }

        #[tokio::test]
        async fn format_listing_is_parsed() {
            let tmp = TempDir::new().unwrap();
            let script = fake_ytdlp(
                tmp.path(),
                r#"echo '{"title":"T","uploader":"U","formats":[{"format_id":"18","ext":"mp4","format_note":"360p"}]}'"#,
            );
            let extractor = YtDlpExtractor::new(script);

            let listing = extractor.list_formats("https://youtu.be/x").await.unwrap();
            assert_eq!(listing.title, "T");
            assert_eq!(listing.formats.len(), 1);
        }
    }
}
