//! Basic download example
//!
//! Downloads one URL (given on the command line) and prints progress until it
//! finishes. Requires yt-dlp in PATH.
//!
//! ```bash
//! cargo run --example basic_download -- https://www.tiktok.com/@user/video/123
//! ```

use media_dl::{Config, DownloadRequest, Event, MediaDownloader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .ok_or("usage: basic_download <url> [quality]")?;
    let quality = std::env::args().nth(2);

    let downloader = MediaDownloader::new(Config::default()).await?;
    if !downloader.capabilities().can_download {
        eprintln!("yt-dlp was not found; the download will fail");
    }

    let mut events = downloader.subscribe();

    let mut request = DownloadRequest::new(url);
    if let Some(quality) = quality {
        request = request.with_quality(quality);
    }
    let ack = downloader.submit_download(request).await?;
    println!("Accepted as {} download", ack.platform);

    while let Ok(event) = events.recv().await {
        match event {
            Event::JobStarted { folder, .. } => println!("Writing into {}", folder),
            Event::JobCompleted { filename, .. } => {
                println!("Done: {}", filename);
                break;
            }
            Event::JobFailed { error, .. } => {
                println!("Failed: {}", error);
                break;
            }
            _ => {}
        }
    }

    println!("Final snapshot: {:?}", downloader.poll_progress());
    Ok(())
}
