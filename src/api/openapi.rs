//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the media-dl REST API using utoipa
//! for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-dl REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-dl REST API",
        version = "0.1.0",
        description = "REST API for platform-aware media downloads: submissions, progress polling, output retrieval",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Downloads
        crate::api::routes::start_download,
        crate::api::routes::bulk_download,
        crate::api::routes::get_progress,
        crate::api::routes::get_formats,

        // Outputs
        crate::api::routes::list_downloads,
        crate::api::routes::download_file,
        crate::api::routes::download_folder,
        crate::api::routes::clear_downloads,

        // System
        crate::api::routes::health_check,
        crate::api::routes::get_capabilities,
        crate::api::routes::supported_platforms,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::platform::Platform,
        crate::types::DownloadRequest,
        crate::types::JobState,
        crate::types::ResultStatus,
        crate::types::DownloadResult,
        crate::types::ProgressSnapshot,
        crate::types::SubmitAck,
        crate::types::BulkEntry,
        crate::types::BulkResult,
        crate::types::OutputKind,
        crate::types::OutputEntry,
        crate::types::FormatInfo,
        crate::types::FormatListing,
        crate::types::SupportedPlatforms,
        crate::types::Capabilities,
        crate::types::Event,

        // API request/response types from routes
        crate::api::routes::DownloadBody,
        crate::api::routes::BulkDownloadBody,
        crate::api::routes::FormatsBody,
        crate::api::routes::DownloadAccepted,
        crate::api::routes::BulkDownloadResponse,
        crate::api::routes::OutputListing,
        crate::api::routes::FormatsResponse,
        crate::api::routes::StatusMessage,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "downloads", description = "Submit single and bulk downloads, poll progress, list formats"),
        (name = "outputs", description = "Browse, fetch, archive and clear downloaded content"),
        (name = "system", description = "Health, capabilities, supported platforms, OpenAPI spec, events"),
    )
)]
pub struct ApiDoc;
