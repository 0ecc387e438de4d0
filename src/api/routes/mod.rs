//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`downloads`] - Submissions, progress and format listing
//! - [`outputs`] - Listing, serving, archiving and clearing downloaded content
//! - [`system`] - Health, capabilities, platforms, events, OpenAPI

use crate::platform::Platform;
use crate::types::{BulkResult, FormatInfo, OutputEntry};
use serde::{Deserialize, Serialize};

mod downloads;
mod outputs;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use downloads::*;
pub use outputs::*;
pub use system::*;

// ============================================================================
// Request Types
// ============================================================================

/// Request body for POST /download
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DownloadBody {
    /// Content URL
    #[serde(default)]
    pub url: String,
    /// Directory for the job folder, relative to the download root
    #[serde(default)]
    pub custom_path: Option<String>,
    /// Format selector overriding the platform default
    #[serde(default)]
    pub quality: Option<String>,
}

/// Request body for POST /bulk-download
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct BulkDownloadBody {
    /// URLs in the order results should be reported; blank entries are skipped
    #[serde(default)]
    pub urls: Vec<String>,
}

/// Request body for POST /get-formats
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct FormatsBody {
    /// Content URL
    #[serde(default)]
    pub url: String,
}

// ============================================================================
// Response Types
// ============================================================================

/// Response of POST /download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DownloadAccepted {
    /// "started", or "queued" when waiting behind a running job
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Detected platform
    pub platform: Platform,
}

/// Response of POST /bulk-download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct BulkDownloadResponse {
    /// Always "success"; per-URL failures are reported in `results`
    pub status: String,
    /// "Processed {n} URLs"
    pub message: String,
    /// Per-URL results in input order
    pub results: BulkResult,
}

/// Response of GET /downloads
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct OutputListing {
    /// Items directly under the download root
    pub items: Vec<OutputEntry>,
}

/// Response of POST /get-formats
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct FormatsResponse {
    /// Always "success"
    pub status: String,
    /// Available formats
    pub formats: Vec<FormatInfo>,
    /// Content title
    pub title: String,
    /// Content uploader
    pub uploader: String,
}

/// Plain status/message response
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StatusMessage {
    /// "success"
    pub status: String,
    /// Human-readable message
    pub message: String,
}
