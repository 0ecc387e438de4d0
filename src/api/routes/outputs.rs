//! Output handlers: listing, file download, folder archive, clearing.

use super::{OutputListing, StatusMessage};
use crate::api::AppState;
use crate::error::Result;
use crate::downloader::OutputFile;
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

/// GET /downloads - List items directly under the download root
#[utoipa::path(
    get,
    path = "/downloads",
    tag = "outputs",
    responses(
        (status = 200, description = "Files and folders, sorted by name", body = OutputListing),
        (status = 500, description = "Download root could not be read", body = crate::error::ApiError)
    )
)]
pub async fn list_downloads(State(state): State<AppState>) -> Result<Json<OutputListing>> {
    let items = state.downloader.list_outputs().await?;
    Ok(Json(OutputListing { items }))
}

/// GET /download-file/*filename - Download a file from the download root
#[utoipa::path(
    get,
    path = "/download-file/{filename}",
    tag = "outputs",
    params(
        ("filename" = String, Path, description = "File name directly under the download root")
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = crate::error::ApiError)
    )
)]
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let file = state.downloader.fetch_file(&filename).await?;
    Ok(attachment(file, "application/octet-stream"))
}

/// GET /download-folder/:name - Download a folder as a zip archive
#[utoipa::path(
    get,
    path = "/download-folder/{name}",
    tag = "outputs",
    params(
        ("name" = String, Path, description = "Folder name directly under the download root")
    ),
    responses(
        (status = 200, description = "Zip archive of the folder", content_type = "application/zip"),
        (status = 404, description = "Folder not found", body = crate::error::ApiError)
    )
)]
pub async fn download_folder(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response> {
    let archive = state.downloader.fetch_folder_archive(&name).await?;
    Ok(attachment(archive, "application/zip"))
}

/// POST /clear-downloads - Delete everything under the download root
#[utoipa::path(
    post,
    path = "/clear-downloads",
    tag = "outputs",
    responses(
        (status = 200, description = "Download root emptied", body = StatusMessage),
        (status = 500, description = "Download root could not be cleared", body = crate::error::ApiError)
    )
)]
pub async fn clear_downloads(State(state): State<AppState>) -> Result<Json<StatusMessage>> {
    state.downloader.clear_all().await?;
    Ok(Json(StatusMessage {
        status: "success".into(),
        message: "Downloads cleared successfully".into(),
    }))
}

fn attachment(file: OutputFile, content_type: &'static str) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file.name.replace('"', "_"));
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, file.len.to_string()),
        ],
        Body::from_stream(file.into_stream()),
    )
        .into_response()
}
