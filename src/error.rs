//! Error types for media-dl
//!
//! This module provides error handling for the library, including:
//! - The crate-wide [`Error`] enum covering validation, lookup, extraction and filesystem failures
//! - [`ExtractionError`] for failures reported by an [`Extractor`](crate::extractor::Extractor)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-dl
///
/// Errors returned synchronously to callers. Extraction failures inside a
/// background job never surface here; they are recorded in the progress store
/// and in the job's [`DownloadResult`](crate::types::DownloadResult) instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "bulk_concurrency")
        key: Option<String>,
    },

    /// Empty or malformed input (missing URL, bad custom path, ...)
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested file or folder does not exist under the download root
    #[error("not found: {0}")]
    NotFound(String),

    /// The extractor failed (only surfaced by synchronous operations such as format listing)
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error (directory allocation, listing, clearing)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive creation failed
    #[error("archive error: {0}")]
    Archive(String),

    /// A job is already running and the submission policy does not allow another one
    #[error("busy: {0}")]
    Busy(String),

    /// Shutdown in progress - not accepting new downloads
    #[error("shutdown in progress: not accepting new downloads")]
    ShuttingDown,

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation not supported by the configured extractor
    #[error("not supported: {0}")]
    NotSupported(String),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// Failures reported by an extractor
///
/// The `Display` output is the human-readable part of a failed job's message;
/// the job runner prefixes it with the platform's error prefix (e.g. `"TikTok error: "`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The extraction tool is not installed or could not be started
    #[error("{0}")]
    ToolUnavailable(String),

    /// The tool ran and reported a failure (network, private content, API rejection, ...)
    #[error("{message}")]
    Failed {
        /// Message derived from the tool's diagnostics
        message: String,
    },

    /// No extractor understands the URL
    #[error("unsupported URL: {0}")]
    UnsupportedUrl(String),

    /// The tool succeeded but produced output that could not be interpreted
    #[error("invalid extractor output: {0}")]
    InvalidOutput(String),

    /// The job was cancelled before the tool finished
    #[error("download cancelled")]
    Cancelled,
}

impl ExtractionError {
    /// Build a [`ExtractionError::Failed`] from any message
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "config_error",
///     "message": "configuration error: must be at least 1",
///     "details": {
///       "key": "bulk_concurrency"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::Validation(_) => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 409 Conflict - a job already occupies the slot
            Error::Busy(_) => 409,

            // 502 Bad Gateway - the platform or the tool rejected the request
            Error::Extraction(ExtractionError::UnsupportedUrl(_)) => 422,
            Error::Extraction(_) => 502,

            // 500 Internal Server Error - Server-side issues
            Error::Io(_) => 500,
            Error::Archive(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,

            // 501 Not Implemented - Feature not supported
            Error::NotSupported(_) => 501,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::NotFound(_) => "not_found",
            Error::Extraction(e) => match e {
                ExtractionError::ToolUnavailable(_) => "extractor_unavailable",
                ExtractionError::Failed { .. } => "extraction_failed",
                ExtractionError::UnsupportedUrl(_) => "unsupported_url",
                ExtractionError::InvalidOutput(_) => "invalid_extractor_output",
                ExtractionError::Cancelled => "cancelled",
            },
            Error::Io(_) => "io_error",
            Error::Archive(_) => "archive_error",
            Error::Busy(_) => "busy",
            Error::ShuttingDown => "shutting_down",
            Error::Serialization(_) => "serialization_error",
            Error::NotSupported(_) => "not_supported",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::Extraction(ExtractionError::UnsupportedUrl(url)) => Some(serde_json::json!({
                "url": url,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Returns (Error, expected_status_code, expected_error_code) for every match arm.
    fn all_error_variants() -> Vec<(Error, u16, &'static str)> {
        vec![
            (
                Error::Config {
                    message: "must be positive".into(),
                    key: Some("bulk_concurrency".into()),
                },
                400,
                "config_error",
            ),
            (
                Error::Validation("URL is required".into()),
                400,
                "validation_error",
            ),
            (Error::NotFound("File not found".into()), 404, "not_found"),
            (Error::Busy("a job is running".into()), 409, "busy"),
            (
                Error::Extraction(ExtractionError::failed("HTTP Error 403")),
                502,
                "extraction_failed",
            ),
            (
                Error::Extraction(ExtractionError::ToolUnavailable("yt-dlp".into())),
                502,
                "extractor_unavailable",
            ),
            (
                Error::Extraction(ExtractionError::UnsupportedUrl("ftp://x".into())),
                422,
                "unsupported_url",
            ),
            (
                Error::Extraction(ExtractionError::InvalidOutput("not json".into())),
                502,
                "invalid_extractor_output",
            ),
            (
                Error::Extraction(ExtractionError::Cancelled),
                502,
                "cancelled",
            ),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                500,
                "io_error",
            ),
            (Error::Archive("zip failed".into()), 500, "archive_error"),
            (
                Error::ApiServerError("bind failed".into()),
                500,
                "api_server_error",
            ),
            (Error::ShuttingDown, 503, "shutting_down"),
            (
                Error::NotSupported("format listing".into()),
                501,
                "not_supported",
            ),
        ]
    }

    #[test]
    fn every_variant_maps_to_expected_status_and_code() {
        for (error, status, code) in all_error_variants() {
            assert_eq!(error.status_code(), status, "status for {:?}", error);
            assert_eq!(error.error_code(), code, "code for {:?}", error);
        }
    }

    #[test]
    fn serialization_error_is_internal() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = Error::from(err);
        assert_eq!(error.status_code(), 500);
        assert_eq!(error.error_code(), "serialization_error");
    }

    #[test]
    fn extraction_error_display_is_bare_message() {
        // The job runner prepends the platform prefix, so Failed must not add its own.
        let err = ExtractionError::failed("Private video");
        assert_eq!(err.to_string(), "Private video");
        assert_eq!(ExtractionError::Cancelled.to_string(), "download cancelled");
    }

    #[test]
    fn api_error_carries_config_key() {
        let api: ApiError = Error::Config {
            message: "bad".into(),
            key: Some("max_filename_length".into()),
        }
        .into();

        assert_eq!(api.error.code, "config_error");
        assert_eq!(api.error.details.unwrap()["key"], "max_filename_length");
    }

    #[test]
    fn api_error_without_details_skips_field() {
        let api: ApiError = Error::NotFound("Folder not found".into()).into();
        let json = serde_json::to_value(&api).unwrap();

        assert_eq!(json["error"]["code"], "not_found");
        assert!(json["error"].get("details").is_none());
    }
}
