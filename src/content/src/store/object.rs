//! Directory-backed object store.
//!
//! Objects live at `<root>/<account>/<category>/<key>.json`. Path segments
//! are sanitized so digests like `sha256:abc` map to `sha256_abc`. Writes are
//! atomic (tmp file, then rename).

use image_content_core::error::StoreError;
use std::path::{Path, PathBuf};

use super::ObjectStore;

/// File-backed object store rooted at a directory.
#[derive(Debug)]
pub struct FileObjectStore {
    root: PathBuf,
}

impl FileObjectStore {
    /// Create a new object store at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path an object is stored at.
    pub fn object_path(
        &self,
        account_id: &str,
        category: &str,
        key: &str,
    ) -> Result<PathBuf, StoreError> {
        Ok(self
            .root
            .join(Self::segment(account_id)?)
            .join(Self::segment(category)?)
            .join(format!("{}.json", Self::segment(key)?)))
    }

    /// Whether an object exists.
    pub fn exists(&self, account_id: &str, category: &str, key: &str) -> bool {
        self.object_path(account_id, category, key)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// Remove an object. Removing a missing object is not an error.
    pub fn delete(&self, account_id: &str, category: &str, key: &str) -> Result<(), StoreError> {
        let path = self.object_path(account_id, category, key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Backend(format!(
                "failed to remove object {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Get the store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Convert an account, category or key into a single safe path segment.
    fn segment(raw: &str) -> Result<String, StoreError> {
        if raw.is_empty() || raw == "." || raw == ".." {
            return Err(StoreError::Backend(format!(
                "invalid object store path segment: '{}'",
                raw
            )));
        }
        Ok(raw.replace([':', '/', '\\'], "_"))
    }
}

impl ObjectStore for FileObjectStore {
    fn get(&self, account_id: &str, category: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(account_id, category, key)?;
        match std::fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
                category: category.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn put(
        &self,
        account_id: &str,
        category: &str,
        key: &str,
        data: &[u8],
    ) -> Result<(), StoreError> {
        let path = self.object_path(account_id, category, key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Backend(format!(
                    "failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, data).map_err(|e| {
            StoreError::Backend(format!(
                "failed to write tmp file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;
        std::fs::rename(&tmp_path, &path).map_err(|e| {
            StoreError::Backend(format!(
                "failed to rename {} → {}: {}",
                tmp_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::debug!(
            account_id,
            category,
            key,
            size_bytes = data.len(),
            "Stored object"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_and_get() {
        let tmp = TempDir::new().unwrap();
        let store = FileObjectStore::new(tmp.path());

        store
            .put("admin", "image_content_data", "sha256:abc", b"{\"document\": {}}")
            .unwrap();
        let data = store.get("admin", "image_content_data", "sha256:abc").unwrap();
        assert_eq!(data, b"{\"document\": {}}");
        assert!(store.exists("admin", "image_content_data", "sha256:abc"));
    }

    #[test]
    fn test_digest_sanitized_path() {
        let tmp = TempDir::new().unwrap();
        let store = FileObjectStore::new(tmp.path());
        let path = store
            .object_path("admin", "manifest_data", "sha256:abc")
            .unwrap();
        assert_eq!(
            path,
            tmp.path().join("admin").join("manifest_data").join("sha256_abc.json")
        );
    }

    #[test]
    fn test_rejects_traversal_segments() {
        let tmp = TempDir::new().unwrap();
        let store = FileObjectStore::new(tmp.path());
        assert!(store.object_path("..", "manifest_data", "k").is_err());
        assert!(store.object_path("admin", "", "k").is_err());
        assert!(store.put("admin", "c", ".", b"x").is_err());

        let path = store.object_path("admin", "c", "../../etc").unwrap();
        assert!(path.starts_with(tmp.path().join("admin").join("c")));
    }

    #[test]
    fn test_get_missing() {
        let tmp = TempDir::new().unwrap();
        let store = FileObjectStore::new(tmp.path());
        let err = store.get("admin", "image_content_data", "sha256:nope").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_categories_are_separate() {
        let tmp = TempDir::new().unwrap();
        let store = FileObjectStore::new(tmp.path());
        store.put("admin", "manifest_data", "sha256:abc", b"m").unwrap();
        assert!(store.get("admin", "image_content_data", "sha256:abc").is_err());
        assert!(store.get("other", "manifest_data", "sha256:abc").is_err());
    }

    #[test]
    fn test_put_replaces_without_tmp_leftover() {
        let tmp = TempDir::new().unwrap();
        let store = FileObjectStore::new(tmp.path());
        store.put("admin", "c", "k", b"one").unwrap();
        store.put("admin", "c", "k", b"two").unwrap();
        assert_eq!(store.get("admin", "c", "k").unwrap(), b"two");

        let path = store.object_path("admin", "c", "k").unwrap();
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_delete() {
        let tmp = TempDir::new().unwrap();
        let store = FileObjectStore::new(tmp.path());
        store.put("admin", "c", "k", b"x").unwrap();
        store.delete("admin", "c", "k").unwrap();
        assert!(!store.exists("admin", "c", "k"));
        store.delete("admin", "c", "k").unwrap();
    }
}
