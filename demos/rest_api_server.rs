//! REST API server example
//!
//! Runs media-dl with the REST API enabled so a web front-end (or curl) can
//! drive it.
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:5000/swagger-ui
//! - Start a download via POST http://localhost:5000/download
//! - Poll progress via GET http://localhost:5000/progress
//! - Stream events via GET http://localhost:5000/events

use media_dl::config::{ApiConfig, Config, DownloadConfig, ServerIntegrationConfig};
use media_dl::{MediaDownloader, run_with_shutdown};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let config = Config {
        download: DownloadConfig {
            download_dir: "downloads".into(),
            ..Default::default()
        },
        server: ServerIntegrationConfig {
            api: ApiConfig {
                bind_address: "127.0.0.1:5000".parse()?,
                ..Default::default()
            },
        },
        ..Default::default()
    };

    let downloader = Arc::new(MediaDownloader::new(config).await?);

    let caps = downloader.capabilities();
    println!("Starting media-dl REST API server");
    println!("Extractor: {} (can download: {})", caps.extractor, caps.can_download);
    println!("Swagger UI: http://localhost:5000/swagger-ui");
    println!("Events stream: http://localhost:5000/events");
    println!();
    println!("Example commands:");
    println!("  curl -X POST http://localhost:5000/download \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"url\": \"https://www.tiktok.com/@user/video/123\"}}'");
    println!("  curl http://localhost:5000/progress");
    println!("  curl http://localhost:5000/downloads");
    println!();

    let api_handle = downloader.spawn_api_server();

    // Wait for Ctrl+C / SIGTERM, then let running jobs record their outcome
    run_with_shutdown((*downloader).clone()).await?;
    api_handle.abort();

    Ok(())
}
