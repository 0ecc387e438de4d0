//! Submission handlers: single and bulk downloads, progress, formats.

use super::{
    BulkDownloadBody, BulkDownloadResponse, DownloadAccepted, DownloadBody, FormatsBody,
    FormatsResponse,
};
use crate::api::AppState;
use crate::error::Result;
use crate::types::{DownloadRequest, ProgressSnapshot};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// POST /download - Start a download in the background
#[utoipa::path(
    post,
    path = "/download",
    tag = "downloads",
    request_body = DownloadBody,
    responses(
        (status = 202, description = "Download accepted", body = DownloadAccepted),
        (status = 400, description = "Missing URL or invalid custom path", body = crate::error::ApiError),
        (status = 409, description = "Another download is running", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn start_download(
    State(state): State<AppState>,
    Json(body): Json<DownloadBody>,
) -> Result<impl IntoResponse> {
    let request = DownloadRequest {
        url: body.url,
        custom_path: body.custom_path,
        quality: body.quality,
    };
    let ack = state.downloader.submit_download(request).await?;

    let (status, message) = if ack.queued {
        ("queued", "Download queued")
    } else {
        ("started", "Download started")
    };

    Ok((
        StatusCode::ACCEPTED,
        Json(DownloadAccepted {
            status: status.into(),
            message: message.into(),
            platform: ack.platform,
        }),
    ))
}

/// POST /bulk-download - Download several URLs and wait for all of them
#[utoipa::path(
    post,
    path = "/bulk-download",
    tag = "downloads",
    request_body = BulkDownloadBody,
    responses(
        (status = 200, description = "Every URL was processed", body = BulkDownloadResponse),
        (status = 400, description = "Empty URL list", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn bulk_download(
    State(state): State<AppState>,
    Json(body): Json<BulkDownloadBody>,
) -> Result<Json<BulkDownloadResponse>> {
    let results = state.downloader.submit_bulk(body.urls).await?;

    Ok(Json(BulkDownloadResponse {
        status: "success".into(),
        message: format!("Processed {} URLs", results.len()),
        results,
    }))
}

/// GET /progress - Latest snapshot of the foreground download
#[utoipa::path(
    get,
    path = "/progress",
    tag = "downloads",
    responses(
        (status = 200, description = "Current progress", body = ProgressSnapshot)
    )
)]
pub async fn get_progress(State(state): State<AppState>) -> Json<ProgressSnapshot> {
    Json(state.downloader.poll_progress())
}

/// POST /get-formats - List available formats without downloading
#[utoipa::path(
    post,
    path = "/get-formats",
    tag = "downloads",
    request_body = FormatsBody,
    responses(
        (status = 200, description = "Available formats", body = FormatsResponse),
        (status = 400, description = "Missing URL", body = crate::error::ApiError),
        (status = 501, description = "Extractor cannot list formats", body = crate::error::ApiError),
        (status = 502, description = "Extractor failed", body = crate::error::ApiError)
    )
)]
pub async fn get_formats(
    State(state): State<AppState>,
    Json(body): Json<FormatsBody>,
) -> Result<Json<FormatsResponse>> {
    let listing = state.downloader.list_formats(&body.url).await?;

    Ok(Json(FormatsResponse {
        status: "success".into(),
        formats: listing.formats,
        title: listing.title,
        uploader: listing.uploader,
    }))
}
