//! Image Content Core - Foundational Types
//!
//! This module provides the types shared by the content retrieval
//! crates: image records, content documents, the supported-type
//! registry, configuration and the error taxonomy.

pub mod config;
pub mod content_types;
pub mod document;
pub mod error;
pub mod image;
pub mod log;

// Re-export commonly used types
pub use config::ContentConfig;
pub use content_types::ContentTypeRegistry;
pub use document::ContentDocument;
pub use error::{ContentError, ErrorDetail, Result, StoreError};
pub use image::{AnalysisStatus, DockerfileMode, ImageDetail, ImageRecord};
pub use log::LogLevel;

/// Image content version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Object store category holding per-image content documents.
pub const CONTENT_CATEGORY: &str = "image_content_data";

/// Object store category holding per-image manifest documents.
pub const MANIFEST_CATEGORY: &str = "manifest_data";
