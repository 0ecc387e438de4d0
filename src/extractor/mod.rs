//! Content extraction
//!
//! The downloader never talks to a platform itself. It hands a URL, a target
//! directory and a set of [`ExtractOptions`] to an [`Extractor`] and records
//! whatever comes back.
//!
//! - [`YtDlpExtractor`]: runs the external `yt-dlp` binary
//! - [`NoOpExtractor`]: used when yt-dlp is unavailable; every download fails
//!
//! ## Usage
//!
//! ```no_run
//! use media_dl::extractor::{ExtractOptions, Extractor, YtDlpExtractor};
//! use media_dl::platform::{classify, ContentKind};
//! use std::path::Path;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let url = "https://www.tiktok.com/@user/video/123";
//!     let platform = classify(url);
//!     let options = ExtractOptions::from_profile(
//!         platform.profile(),
//!         ContentKind::detect(platform, url),
//!         None,
//!         &["en".to_string()],
//!     );
//!
//!     let extractor = YtDlpExtractor::from_path().expect("yt-dlp not found");
//!     let extraction = extractor
//!         .extract(url, Path::new("downloads"), &options, CancellationToken::new())
//!         .await?;
//!     println!("downloaded {} item(s)", extraction.entries.len());
//!     Ok(())
//! }
//! ```

mod noop;
pub mod parser;
mod traits;
mod ytdlp;

pub use noop::NoOpExtractor;
pub use traits::{ExtractOptions, ExtractedEntry, Extraction, Extractor, ExtractorCapabilities};
pub use ytdlp::YtDlpExtractor;
