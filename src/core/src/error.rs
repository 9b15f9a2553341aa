use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::image::AnalysisStatus;

/// Request context attached to every content retrieval failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub account_id: String,
    /// Requested content type, or the comma-joined selector for multi-type reads
    pub content_type: Option<String>,
    pub image_digest: String,
}

impl ErrorDetail {
    pub fn new(
        account_id: impl Into<String>,
        content_type: Option<String>,
        image_digest: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            content_type,
            image_digest: image_digest.into(),
        }
    }
}

/// Image content error types
#[derive(Error, Debug)]
pub enum ContentError {
    /// No image record for the digest/account pair
    #[error("Image not found")]
    NotFound { detail: ErrorDetail },

    /// Image record exists but analysis has not reached a readable state
    #[error("image is not analyzed - analysis_status: {status}")]
    InvalidState {
        status: AnalysisStatus,
        detail: ErrorDetail,
    },

    /// Requested content is unavailable or unusable for this image
    #[error("{message}")]
    InvalidRequest {
        message: String,
        detail: ErrorDetail,
    },

    /// Object store read or decode failure
    #[error("{message}")]
    UpstreamFailure {
        message: String,
        detail: ErrorDetail,
        #[source]
        source: StoreError,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ContentError {
    /// Request context, when the error was raised while serving a request.
    pub fn detail(&self) -> Option<&ErrorDetail> {
        match self {
            ContentError::NotFound { detail }
            | ContentError::InvalidState { detail, .. }
            | ContentError::InvalidRequest { detail, .. }
            | ContentError::UpstreamFailure { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// HTTP status class a caller should render this error with.
    ///
    /// An image that is not yet analyzed is reported as not found since its
    /// content is not consumable.
    pub fn http_status(&self) -> u16 {
        match self {
            ContentError::NotFound { .. } | ContentError::InvalidState { .. } => 404,
            ContentError::InvalidRequest { .. } => 400,
            _ => 500,
        }
    }
}

/// Failures reported by record and object store backends.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No object stored under the key
    #[error("object not found: {category}/{key}")]
    NotFound { category: String, key: String },

    /// Stored bytes could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure
    #[error("{0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for image content operations
pub type Result<T> = std::result::Result<T, ContentError>;
