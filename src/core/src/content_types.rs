//! Registry of supported content type identifiers.

use std::collections::BTreeSet;

/// Package and file content types produced by image analysis.
pub const CONTENT_TYPES: &[&str] = &[
    "os", "files", "npm", "gem", "python", "java", "binary", "go", "malware", "nuget",
];

/// Image metadata types. These are not package listings and are served
/// base64-encoded.
pub const METADATA_TYPES: &[&str] = &["manifest", "docker_history", "dockerfile"];

/// Set of content types the catalog knows how to serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeRegistry {
    content: BTreeSet<String>,
    metadata: BTreeSet<String>,
}

impl Default for ContentTypeRegistry {
    fn default() -> Self {
        Self {
            content: CONTENT_TYPES.iter().map(|s| s.to_string()).collect(),
            metadata: METADATA_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ContentTypeRegistry {
    /// Default registry extended with additional content types.
    pub fn with_content_types<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::default();
        registry.content.extend(extra.into_iter().map(Into::into));
        registry
    }

    /// Whether `name` is a package/file content type.
    pub fn is_content_type(&self, name: &str) -> bool {
        self.content.contains(name)
    }

    /// Whether `name` is an image metadata type.
    pub fn is_metadata_type(&self, name: &str) -> bool {
        self.metadata.contains(name)
    }

    pub fn is_supported(&self, name: &str) -> bool {
        self.is_content_type(name) || self.is_metadata_type(name)
    }

    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.content.iter().map(String::as_str)
    }

    pub fn metadata_types(&self) -> impl Iterator<Item = &str> {
        self.metadata.iter().map(String::as_str)
    }
}
