use std::collections::BTreeMap;

use image_content_core::document::{decode_envelope, is_populated};
use image_content_core::error::{Result, StoreError};
use image_content_core::{ContentDocument, ImageRecord};

use super::{
    Category, ContentSelector, ContentVariant, LoadedContent, RequestContext, VariantProfile,
    ALL_CONTENT_TYPES,
};
use crate::format::NormalizedContent;

/// Formatted content keyed by content type.
pub type ContentByType = BTreeMap<String, NormalizedContent>;

/// Several package content types from one document.
///
/// Best-effort projection: types missing from the document, unknown to the
/// registry or not formattable are left out rather than reported. A null or
/// empty stored document yields an empty mapping. Metadata types (manifest,
/// Dockerfile) are never included.
#[derive(Debug, Clone)]
pub struct MultiTypeContent {
    selector: ContentSelector,
}

impl MultiTypeContent {
    pub fn new<I, S>(content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            selector: ContentSelector::many(content_types),
        }
    }

    fn requested(&self) -> impl Iterator<Item = &str> {
        let types = match &self.selector {
            ContentSelector::Many(types) => Some(types),
            ContentSelector::Single(_) => None,
        };
        types.into_iter().flatten().map(String::as_str)
    }

    fn is_requested(&self, cx: &RequestContext<'_>, content_type: &str) -> bool {
        if !cx.services().registry().is_content_type(content_type) {
            return false;
        }
        let lowered = content_type.to_lowercase();
        self.requested()
            .any(|t| t == ALL_CONTENT_TYPES || t == lowered)
    }
}

impl ContentVariant for MultiTypeContent {
    type Output = ContentByType;

    fn selector(&self) -> &ContentSelector {
        &self.selector
    }

    fn profile(&self) -> VariantProfile {
        VariantProfile {
            validates_presence: false,
            normalizes_on_load: false,
            ..VariantProfile::default()
        }
    }

    fn fetch(&self, cx: &RequestContext<'_>) -> std::result::Result<ContentDocument, StoreError> {
        let document = decode_envelope(&cx.fetch_object(Category::Content)?)?;
        if !is_populated(&document) {
            return Ok(ContentDocument::new());
        }
        ContentDocument::from_value(document)
    }

    fn post_process(
        &self,
        cx: &RequestContext<'_>,
        content: LoadedContent,
        _record: &ImageRecord,
    ) -> Result<ContentByType> {
        let mut results = ContentByType::new();
        if content.document.is_empty() || self.requested().next().is_none() {
            return Ok(results);
        }

        for (content_type, payload) in content.document.iter() {
            if !self.is_requested(cx, content_type) {
                continue;
            }
            match cx.services().formatter().format(content_type, payload) {
                Ok(normalized) => {
                    results.insert(content_type.clone(), normalized);
                }
                Err(e) => tracing::warn!(
                    account_id = cx.account_id(),
                    image_digest = cx.image_digest(),
                    content_type = content_type.as_str(),
                    error = %e,
                    "Skipping content type that could not be formatted"
                ),
            }
        }
        Ok(results)
    }
}
