use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::content_types::ContentTypeRegistry;
use crate::error::{ContentError, Result};
use crate::log::LogLevel;
use crate::{CONTENT_CATEGORY, MANIFEST_CATEGORY};

/// Content service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Base directory for file-backed stores (~/.image-content)
    pub data_dir: PathBuf,

    /// Image record file (defaults to `<data_dir>/records.json`)
    pub records_file: Option<PathBuf>,

    /// Object store root (defaults to `<data_dir>/objects`)
    pub objects_dir: Option<PathBuf>,

    /// Object store category for content documents
    pub content_category: String,

    /// Object store category for manifest documents
    pub manifest_category: String,

    /// Log level
    pub log_level: LogLevel,

    /// Content types accepted in addition to the built-in set
    pub extra_content_types: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            records_file: None,
            objects_dir: None,
            content_category: CONTENT_CATEGORY.to_string(),
            manifest_category: MANIFEST_CATEGORY.to_string(),
            log_level: LogLevel::default(),
            extra_content_types: Vec::new(),
        }
    }
}

impl ContentConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            ContentError::ConfigError(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&data)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml_str(data: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(data)
            .map_err(|e| ContentError::ConfigError(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.content_category.is_empty() || self.manifest_category.is_empty() {
            return Err(ContentError::ConfigError(
                "object store categories must not be empty".to_string(),
            ));
        }
        if self.content_category == self.manifest_category {
            return Err(ContentError::ConfigError(format!(
                "content and manifest categories must differ (both '{}')",
                self.content_category
            )));
        }
        Ok(())
    }

    /// Path of the image record file.
    pub fn records_path(&self) -> PathBuf {
        self.records_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("records.json"))
    }

    /// Root directory of the object store.
    pub fn objects_path(&self) -> PathBuf {
        self.objects_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("objects"))
    }

    /// Supported-type registry for this configuration.
    pub fn registry(&self) -> ContentTypeRegistry {
        ContentTypeRegistry::with_content_types(self.extra_content_types.iter().cloned())
    }
}

/// Return the default data directory (~/.image-content).
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".image-content"))
        .unwrap_or_else(|| PathBuf::from(".image-content"))
}
