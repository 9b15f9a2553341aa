use image_content_core::document::decode_envelope;
use image_content_core::error::{Result, StoreError};
use image_content_core::{ContentDocument, ImageRecord};

use super::{
    Category, ContentSelector, ContentVariant, LoadedContent, RequestContext, VariantProfile,
};
use crate::format::NormalizedContent;

pub(crate) const MANIFEST: &str = "manifest";

/// Image manifest, read from the manifest category.
///
/// The stored manifest body is exposed to the base flow as a one-entry
/// document under `manifest`, so any other requested type is rejected by the
/// presence check.
#[derive(Debug, Clone)]
pub struct ManifestContent {
    selector: ContentSelector,
}

impl ManifestContent {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            selector: ContentSelector::Single(content_type.into()),
        }
    }
}

impl Default for ManifestContent {
    fn default() -> Self {
        Self::new(MANIFEST)
    }
}

impl ContentVariant for ManifestContent {
    type Output = NormalizedContent;

    fn selector(&self) -> &ContentSelector {
        &self.selector
    }

    fn profile(&self) -> VariantProfile {
        VariantProfile {
            category: Category::Manifest,
            ..VariantProfile::default()
        }
    }

    fn fetch(&self, cx: &RequestContext<'_>) -> std::result::Result<ContentDocument, StoreError> {
        let manifest = decode_envelope(&cx.fetch_object(Category::Manifest)?)?;
        let mut document = ContentDocument::new();
        document.insert(MANIFEST, manifest);
        Ok(document)
    }

    fn post_process(
        &self,
        cx: &RequestContext<'_>,
        content: LoadedContent,
        _record: &ImageRecord,
    ) -> Result<NormalizedContent> {
        match content.normalized {
            Some(normalized) => Ok(normalized),
            None => cx.format_selected(&content.document, MANIFEST),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::super::ContentGetter;
    use super::*;
    use image_content_core::{AnalysisStatus, ContentError};
    use serde_json::json;

    #[test]
    fn test_reads_manifest_category() {
        let manifest = json!({"schemaVersion": 2, "layers": []});
        let fixture = Fixture::new()
            .with_record(AnalysisStatus::Analyzed)
            .with_content(json!({"manifest": "from the wrong category"}))
            .with_manifest(manifest.clone());

        let out = ContentGetter::manifest(fixture.services.clone(), ACCOUNT, DIGEST)
            .get(false)
            .unwrap();
        assert_eq!(out.decoded_text().unwrap(), manifest.to_string());
    }

    #[test]
    fn test_missing_manifest_is_upstream_failure() {
        let fixture = Fixture::new()
            .with_record(AnalysisStatus::Analyzed)
            .with_content(json!({"manifest": {}}));
        let err = ContentGetter::manifest(fixture.services.clone(), ACCOUNT, DIGEST)
            .get(false)
            .unwrap_err();
        assert!(matches!(err, ContentError::UpstreamFailure { .. }));
        assert_eq!(err.detail().unwrap().content_type.as_deref(), Some("manifest"));
    }

    #[test]
    fn test_other_type_rejected() {
        let fixture = Fixture::new()
            .with_record(AnalysisStatus::Analyzed)
            .with_manifest(json!({"schemaVersion": 2}));
        let getter = ContentGetter::new(
            fixture.services.clone(),
            ACCOUNT,
            DIGEST,
            ManifestContent::new("os"),
        );
        assert!(matches!(
            getter.get(false).unwrap_err(),
            ContentError::InvalidRequest { .. }
        ));
    }

    #[test]
    fn test_status_checked_before_fetch() {
        let fixture = Fixture::new().with_record(AnalysisStatus::NotAnalyzed);
        let err = ContentGetter::manifest(fixture.services.clone(), ACCOUNT, DIGEST)
            .get(true)
            .unwrap_err();
        assert!(matches!(err, ContentError::InvalidState { .. }));
    }
}
