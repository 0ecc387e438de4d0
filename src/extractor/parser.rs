//! Parser for yt-dlp output

use super::traits::ExtractedEntry;
use crate::error::ExtractionError;
use crate::types::{FormatInfo, FormatListing};
use serde_json::Value;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mkv", "mov", "flv", "avi", "m4v"];

/// Parse `--dump-json` output: one JSON object per downloaded entry
///
/// Lines that are not JSON objects (progress noise, warnings printed to
/// stdout) are skipped.
pub fn parse_entries(stdout: &[u8]) -> Vec<ExtractedEntry> {
    let text = String::from_utf8_lossy(stdout);
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| match serde_json::from_str::<Value>(line) {
            Ok(value) if value.is_object() => Some(parse_entry(value)),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unparseable yt-dlp line");
                None
            }
        })
        .collect()
}

/// Build an entry from one metadata object
pub fn parse_entry(raw: Value) -> ExtractedEntry {
    let text = |key: &str| {
        raw.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let filename = raw
        .get("requested_downloads")
        .and_then(Value::as_array)
        .and_then(|downloads| downloads.first())
        .and_then(|d| d.get("filepath"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| text("filepath"))
        .or_else(|| text("_filename"))
        .or_else(|| text("filename"));

    let is_video = match raw.get("vcodec").and_then(Value::as_str) {
        Some(codec) => codec != "none",
        None => text("ext")
            .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false),
    };

    ExtractedEntry {
        id: text("id"),
        title: text("title"),
        uploader: text("uploader").or_else(|| text("channel")),
        extractor: text("extractor_key").or_else(|| text("extractor")),
        filename,
        is_video,
        playlist_index: raw.get("playlist_index").and_then(Value::as_u64),
        raw,
    }
}

/// Parse a single-object `--dump-single-json` format listing
///
/// Only formats carrying both a `format_note` and an `ext` are kept.
pub fn parse_format_listing(info: &Value) -> FormatListing {
    let text = |v: &Value, key: &str| {
        v.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let formats = info
        .get("formats")
        .and_then(Value::as_array)
        .map(|formats| {
            formats
                .iter()
                .filter(|f| {
                    let has = |key: &str| {
                        f.get(key)
                            .and_then(Value::as_str)
                            .is_some_and(|s| !s.is_empty())
                    };
                    has("format_note") && has("ext")
                })
                .map(|f| FormatInfo {
                    format_id: text(f, "format_id"),
                    ext: text(f, "ext"),
                    resolution: text(f, "resolution"),
                    filesize: f
                        .get("filesize")
                        .and_then(Value::as_u64)
                        .unwrap_or_default(),
                    format_note: text(f, "format_note"),
                    vcodec: text(f, "vcodec"),
                    acodec: text(f, "acodec"),
                })
                .collect()
        })
        .unwrap_or_default();

    let or_unknown = |key: &str| {
        info.get(key)
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string()
    };

    FormatListing {
        title: or_unknown("title"),
        uploader: or_unknown("uploader"),
        formats,
    }
}

/// Turn yt-dlp diagnostics into an extraction error
///
/// The last `ERROR:` line wins; without one the last non-empty stderr line is
/// used. Unsupported URLs get their own variant.
pub fn parse_failure(url: &str, stderr: &[u8], exit_code: Option<i32>) -> ExtractionError {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let message = lines
        .iter()
        .rev()
        .find_map(|l| l.strip_prefix("ERROR:"))
        .map(str::trim)
        .or_else(|| lines.last().copied())
        .map(str::to_string)
        .unwrap_or_else(|| match exit_code {
            Some(code) => format!("yt-dlp exited with status {}", code),
            None => "yt-dlp was terminated by a signal".to_string(),
        });

    if message.contains("Unsupported URL") {
        return ExtractionError::UnsupportedUrl(url.to_string());
    }
    ExtractionError::failed(message)
}
