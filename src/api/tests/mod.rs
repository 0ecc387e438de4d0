use super::*;
use crate::downloader::test_helpers::{MockExtractor, create_test_downloader_with};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;


const TIKTOK_URL: &str = "https://www.tiktok.com/@someone/video/7301234567890";

/// Router, downloader and mock for one test; the tempdir must stay alive
struct TestApp {
    router: Router,
    downloader: Arc<MediaDownloader>,
    mock: Arc<MockExtractor>,
    temp_dir: tempfile::TempDir,
}

async fn create_test_app_with(tweak: impl FnOnce(&mut Config), mock: MockExtractor) -> TestApp {
    let (downloader, mock, temp_dir) = create_test_downloader_with(tweak, mock).await;
    let downloader = Arc::new(downloader);
    let config = downloader.get_config();

    TestApp {
        router: create_router(downloader.clone(), config),
        downloader,
        mock,
        temp_dir,
    }
}

async fn create_test_app() -> TestApp {
    create_test_app_with(|_| {}, MockExtractor::new()).await
}

impl TestApp {
    async fn get(&self, uri: &str) -> Response {
        self.router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_json(&self, uri: &str, body: Value) -> Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    fn download_dir(&self) -> std::path::PathBuf {
        self.downloader.get_config().download_dir().clone()
    }
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn api_server_spawns() {
    let app = create_test_app().await;

    let mut config = (*app.downloader.get_config()).clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);

    let api_handle = tokio::spawn({
        let downloader = app.downloader.clone();
        async move { start_api_server(downloader, config).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server exited early");
    api_handle.abort();
}

#[tokio::test]
async fn cors_headers_when_enabled() {
    let app = create_test_app().await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn cors_specific_origins() {
    let app = create_test_app_with(
        |c| c.server.api.cors_origins = vec!["http://localhost:3000".into()],
        MockExtractor::new(),
    )
    .await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn no_cors_headers_when_disabled() {
    let app = create_test_app_with(
        |c| c.server.api.cors_enabled = false,
        MockExtractor::new(),
    )
    .await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn swagger_ui_can_be_disabled() {
    let enabled = create_test_app().await;
    assert_eq!(
        enabled.get("/api-docs/openapi.json").await.status(),
        StatusCode::OK
    );

    let disabled =
        create_test_app_with(|c| c.server.api.swagger_ui = false, MockExtractor::new()).await;
    assert_eq!(
        disabled.get("/api-docs/openapi.json").await.status(),
        StatusCode::NOT_FOUND
    );
}
