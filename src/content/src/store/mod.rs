//! Storage collaborators for content retrieval.
//!
//! Two seams are consumed by the getters:
//!
//! - [`RecordStore`]: catalog image records, looked up by digest and account
//! - [`ObjectStore`]: opaque JSON blobs addressed by (account, category, key)
//!
//! File-backed implementations persist under a data directory; the in-memory
//! ones back tests and embedding callers.

mod memory;
mod object;
mod record;

use image_content_core::error::StoreError;
use image_content_core::ImageRecord;

pub use memory::{MemoryObjectStore, MemoryRecordStore};
pub use object::FileObjectStore;
pub use record::FileRecordStore;

/// Lookup of catalog image records.
pub trait RecordStore: Send + Sync {
    /// Fetch the record for an image digest owned by `account_id`.
    fn get(&self, image_digest: &str, account_id: &str)
        -> Result<Option<ImageRecord>, StoreError>;
}

/// Key/value blob storage partitioned by account and category.
pub trait ObjectStore: Send + Sync {
    /// Read the object stored under `key`.
    ///
    /// A missing object is reported as [`StoreError::NotFound`].
    fn get(&self, account_id: &str, category: &str, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Store `data` under `key`, replacing any previous object.
    fn put(&self, account_id: &str, category: &str, key: &str, data: &[u8])
        -> Result<(), StoreError>;
}
