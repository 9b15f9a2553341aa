//! In-memory record and object stores.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use image_content_core::error::StoreError;
use image_content_core::ImageRecord;
use parking_lot::RwLock;

use super::{ObjectStore, RecordStore};

/// In-memory image record store keyed by (account, digest).
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<(String, String), ImageRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub fn insert(&self, record: ImageRecord) {
        let key = (record.account_id.clone(), record.image_digest.clone());
        self.records.write().insert(key, record);
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(
        &self,
        image_digest: &str,
        account_id: &str,
    ) -> Result<Option<ImageRecord>, StoreError> {
        let key = (account_id.to_string(), image_digest.to_string());
        Ok(self.records.read().get(&key).cloned())
    }
}

/// In-memory object store keyed by (account, category, key).
///
/// Counts successful writes and can be switched read-only, in which case
/// every `put` fails.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<(String, String, String), Vec<u8>>>,
    puts: AtomicUsize,
    read_only: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object directly, bypassing the write counter.
    pub fn insert(&self, account_id: &str, category: &str, key: &str, data: impl Into<Vec<u8>>) {
        self.objects.write().insert(
            (account_id.to_string(), category.to_string(), key.to_string()),
            data.into(),
        );
    }

    /// Number of successful `put` calls.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get(&self, account_id: &str, category: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let lookup = (account_id.to_string(), category.to_string(), key.to_string());
        self.objects
            .read()
            .get(&lookup)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                category: category.to_string(),
                key: key.to_string(),
            })
    }

    fn put(
        &self,
        account_id: &str,
        category: &str,
        key: &str,
        data: &[u8],
    ) -> Result<(), StoreError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("object store is read-only".to_string()));
        }
        self.insert(account_id, category, key, data);
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
