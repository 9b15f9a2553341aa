//! Collaborators shared by every content getter.

use std::sync::Arc;

use image_content_core::{ContentConfig, ContentTypeRegistry, CONTENT_CATEGORY, MANIFEST_CATEGORY};

use crate::format::{PackageFormatter, ResponseFormatter};
use crate::store::{FileObjectStore, FileRecordStore, ObjectStore, RecordStore};

/// Injected stores, formatter and registry.
///
/// Cheap to clone; getters take their own copy per request.
#[derive(Clone)]
pub struct ContentServices {
    records: Arc<dyn RecordStore>,
    objects: Arc<dyn ObjectStore>,
    formatter: Arc<dyn ResponseFormatter>,
    registry: Arc<ContentTypeRegistry>,
    content_category: String,
    manifest_category: String,
}

impl ContentServices {
    /// Services over the given stores with the default formatter and registry.
    pub fn new(records: Arc<dyn RecordStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self {
            records,
            objects,
            formatter: Arc::new(PackageFormatter::default()),
            registry: Arc::new(ContentTypeRegistry::default()),
            content_category: CONTENT_CATEGORY.to_string(),
            manifest_category: MANIFEST_CATEGORY.to_string(),
        }
    }

    /// File-backed services as described by `config`.
    pub fn from_config(config: &ContentConfig) -> Self {
        let registry = config.registry();
        Self::new(
            Arc::new(FileRecordStore::new(config.records_path())),
            Arc::new(FileObjectStore::new(config.objects_path())),
        )
        .with_formatter(Arc::new(PackageFormatter::new(registry.clone())))
        .with_registry(registry)
        .with_categories(&config.content_category, &config.manifest_category)
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn ResponseFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_registry(mut self, registry: ContentTypeRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn with_categories(mut self, content: &str, manifest: &str) -> Self {
        self.content_category = content.to_string();
        self.manifest_category = manifest.to_string();
        self
    }

    pub fn records(&self) -> &dyn RecordStore {
        self.records.as_ref()
    }

    pub fn objects(&self) -> &dyn ObjectStore {
        self.objects.as_ref()
    }

    pub fn formatter(&self) -> &dyn ResponseFormatter {
        self.formatter.as_ref()
    }

    pub fn registry(&self) -> &ContentTypeRegistry {
        &self.registry
    }

    pub fn content_category(&self) -> &str {
        &self.content_category
    }

    pub fn manifest_category(&self) -> &str {
        &self.manifest_category
    }
}

impl std::fmt::Debug for ContentServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentServices")
            .field("registry", &self.registry)
            .field("content_category", &self.content_category)
            .field("manifest_category", &self.manifest_category)
            .finish_non_exhaustive()
    }
}
