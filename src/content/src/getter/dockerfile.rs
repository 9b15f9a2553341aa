//! Dockerfile retrieval with migration of legacy storage.
//!
//! Older catalogs kept a user-supplied Dockerfile base64-encoded on each
//! image detail entry instead of in the content document. The first read of
//! such an image copies the body into the document under `dockerfile` and
//! writes the document back, so later reads find it in place.
//!
//! The write-back is an unguarded read-modify-write. Concurrent first reads
//! of the same image may both migrate; both derive the same document from
//! the same legacy body, so the stored result converges.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use image_content_core::error::Result;
use image_content_core::{ContentDocument, ImageRecord};
use serde_json::Value;

use super::{
    Category, ContentSelector, ContentVariant, LoadedContent, RequestContext, VariantProfile,
};
use crate::format::NormalizedContent;

pub(crate) const DOCKERFILE: &str = "dockerfile";

/// Lenient decoder for legacy bodies: non-canonical trailing bits and
/// missing or extra padding are accepted.
const LEGACY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Result of a migration attempt. Never an error: failures are logged and
/// the read continues with whatever content is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Document already carries Dockerfile content
    AlreadyPresent,
    /// Dockerfile was not user-supplied; nothing to migrate
    NotApplicable,
    /// No image detail entry carries a legacy body
    NoLegacyContent,
    /// Legacy body copied into the document and persisted
    Migrated { detail_index: usize },
    /// Legacy body could not be decoded
    DecodeFailed { detail_index: usize, reason: String },
    /// Body decoded and served, but the write-back failed
    PersistFailed { detail_index: usize, reason: String },
}

impl MigrationOutcome {
    /// Whether the document in the object store now holds the Dockerfile.
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::AlreadyPresent | Self::Migrated { .. })
    }
}

/// Image Dockerfile from the content document.
#[derive(Debug, Clone)]
pub struct DockerfileContent {
    selector: ContentSelector,
}

impl DockerfileContent {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            selector: ContentSelector::Single(content_type.into()),
        }
    }

    pub fn content_type(&self) -> &str {
        self.selector.single().unwrap_or(DOCKERFILE)
    }

    /// Move a legacy Dockerfile body into `document` and persist it.
    pub fn migrate(
        &self,
        cx: &RequestContext<'_>,
        document: &mut ContentDocument,
        record: &ImageRecord,
    ) -> MigrationOutcome {
        if document.has_content(DOCKERFILE) {
            return MigrationOutcome::AlreadyPresent;
        }
        if !record.has_actual_dockerfile() {
            return MigrationOutcome::NotApplicable;
        }
        let Some((detail_index, encoded)) = record.legacy_dockerfiles().next() else {
            return MigrationOutcome::NoLegacyContent;
        };

        tracing::debug!(
            account_id = cx.account_id(),
            image_digest = %record.image_digest,
            detail_index,
            reference = %record
                .image_detail
                .get(detail_index)
                .map(|d| d.full_reference())
                .unwrap_or_default(),
            "Migrating legacy Dockerfile content"
        );

        let text = match decode_legacy(encoded) {
            Ok(text) => text,
            Err(reason) => {
                tracing::warn!(
                    account_id = cx.account_id(),
                    image_digest = %record.image_digest,
                    detail_index,
                    error = %reason,
                    "Cannot decode Dockerfile contents from image detail"
                );
                return MigrationOutcome::DecodeFailed {
                    detail_index,
                    reason,
                };
            }
        };

        document.insert(DOCKERFILE, Value::String(text));

        let persisted = document.to_vec().and_then(|bytes| {
            cx.services().objects().put(
                cx.account_id(),
                cx.category_name(Category::Content),
                &record.image_digest,
                &bytes,
            )
        });
        match persisted {
            Ok(()) => {
                tracing::info!(
                    account_id = cx.account_id(),
                    image_digest = %record.image_digest,
                    "Migrated legacy Dockerfile into content document"
                );
                MigrationOutcome::Migrated { detail_index }
            }
            Err(e) => {
                tracing::warn!(
                    account_id = cx.account_id(),
                    image_digest = %record.image_digest,
                    error = %e,
                    "Cannot store migrated Dockerfile content"
                );
                MigrationOutcome::PersistFailed {
                    detail_index,
                    reason: e.to_string(),
                }
            }
        }
    }
}

impl Default for DockerfileContent {
    fn default() -> Self {
        Self::new(DOCKERFILE)
    }
}

impl ContentVariant for DockerfileContent {
    type Output = NormalizedContent;

    fn selector(&self) -> &ContentSelector {
        &self.selector
    }

    // Presence is checked after migration has had a chance to fill the entry.
    fn profile(&self) -> VariantProfile {
        VariantProfile {
            validates_presence: false,
            normalizes_on_load: false,
            ..VariantProfile::default()
        }
    }

    fn post_process(
        &self,
        cx: &RequestContext<'_>,
        content: LoadedContent,
        record: &ImageRecord,
    ) -> Result<NormalizedContent> {
        let mut document = content.document;
        let outcome = self.migrate(cx, &mut document, record);
        tracing::debug!(
            account_id = cx.account_id(),
            image_digest = cx.image_digest(),
            persisted = outcome.is_persisted(),
            ?outcome,
            "Dockerfile migration check complete"
        );
        cx.format_selected(&document, self.content_type())
    }
}

/// Decode a legacy base64 Dockerfile body, discarding characters outside the
/// base64 alphabet (line breaks included).
fn decode_legacy(encoded: &str) -> std::result::Result<String, String> {
    let compact: String = encoded
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect();
    let bytes = LEGACY_ENGINE
        .decode(compact.as_bytes())
        .map_err(|e| format!("invalid base64: {}", e))?;
    String::from_utf8(bytes).map_err(|e| format!("Dockerfile is not UTF-8: {}", e))
}
