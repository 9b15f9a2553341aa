//! Image Content - analyzed image content retrieval.
//!
//! Serves the package listings, manifest and Dockerfile recorded for an
//! analyzed image: validates the image's analysis state, loads the stored
//! content document and normalizes it into response records. Dockerfiles
//! kept in the legacy per-reference layout are migrated on first read.

pub mod format;
pub mod getter;
pub mod services;
pub mod store;

// Re-export common types
pub use format::{FormatError, NormalizedContent, PackageFormatter, ResponseFormatter};
pub use getter::{get_image_content, ContentByType, ContentGetter, ContentSelector, ContentVariant};
pub use getter::{DockerfileContent, ManifestContent, MigrationOutcome, MultiTypeContent, SingleType};
pub use getter::{Category, LoadedContent, RequestContext, VariantProfile, ALL_CONTENT_TYPES};
pub use services::ContentServices;
pub use store::{FileObjectStore, FileRecordStore, MemoryObjectStore, MemoryRecordStore};
pub use store::{ObjectStore, RecordStore};

/// Image content version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
