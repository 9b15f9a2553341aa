//! Persistent storage for catalog image records.
//!
//! Records are stored as JSON in `<data_dir>/records.json`, grouped by
//! account, with atomic writes (write to tmp file, then rename).

use image_content_core::error::StoreError;
use image_content_core::ImageRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::RecordStore;

/// File-backed image record store.
#[derive(Debug)]
pub struct FileRecordStore {
    /// Path to the JSON file.
    path: PathBuf,
}

/// Serializable wrapper for the records file: account → digest → record.
#[derive(Debug, serde::Serialize, serde::Deserialize, Default)]
struct RecordsFile {
    records: HashMap<String, HashMap<String, ImageRecord>>,
}

impl FileRecordStore {
    /// Create a new store at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<RecordsFile, StoreError> {
        if !self.path.exists() {
            return Ok(RecordsFile::default());
        }

        let data = std::fs::read_to_string(&self.path).map_err(|e| {
            StoreError::Backend(format!(
                "failed to read records file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        serde_json::from_str(&data).map_err(|e| {
            StoreError::Serialization(format!("failed to parse records file: {}", e))
        })
    }

    fn save(&self, file: &RecordsFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Backend(format!(
                    "failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(file)?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json).map_err(|e| {
            StoreError::Backend(format!(
                "failed to write tmp file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            StoreError::Backend(format!(
                "failed to rename {} → {}: {}",
                tmp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Insert or replace a record.
    pub fn upsert(&self, record: ImageRecord) -> Result<(), StoreError> {
        let mut file = self.load()?;
        file.records
            .entry(record.account_id.clone())
            .or_default()
            .insert(record.image_digest.clone(), record);
        self.save(&file)
    }

    /// Remove a record. Returns the removed record, if any.
    pub fn remove(
        &self,
        account_id: &str,
        image_digest: &str,
    ) -> Result<Option<ImageRecord>, StoreError> {
        let mut file = self.load()?;
        let removed = file
            .records
            .get_mut(account_id)
            .and_then(|images| images.remove(image_digest));
        if removed.is_some() {
            file.records.retain(|_, images| !images.is_empty());
            self.save(&file)?;
        }
        Ok(removed)
    }

    /// List an account's records ordered by digest.
    pub fn list(&self, account_id: &str) -> Result<Vec<ImageRecord>, StoreError> {
        let mut file = self.load()?;
        let mut records: Vec<ImageRecord> = file
            .records
            .remove(account_id)
            .map(|images| images.into_values().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| a.image_digest.cmp(&b.image_digest));
        Ok(records)
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for FileRecordStore {
    fn get(
        &self,
        image_digest: &str,
        account_id: &str,
    ) -> Result<Option<ImageRecord>, StoreError> {
        let mut file = self.load()?;
        Ok(file
            .records
            .get_mut(account_id)
            .and_then(|images| images.remove(image_digest)))
    }
}
