use image_content_core::error::Result;
use image_content_core::ImageRecord;

use super::{ContentSelector, ContentVariant, LoadedContent, RequestContext};
use crate::format::NormalizedContent;

/// One content type from the image's content document.
#[derive(Debug, Clone)]
pub struct SingleType {
    selector: ContentSelector,
}

impl SingleType {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            selector: ContentSelector::Single(content_type.into()),
        }
    }

    pub fn content_type(&self) -> &str {
        self.selector.single().unwrap_or_default()
    }
}

impl ContentVariant for SingleType {
    type Output = NormalizedContent;

    fn selector(&self) -> &ContentSelector {
        &self.selector
    }

    fn post_process(
        &self,
        cx: &RequestContext<'_>,
        content: LoadedContent,
        _record: &ImageRecord,
    ) -> Result<NormalizedContent> {
        match content.normalized {
            Some(normalized) => Ok(normalized),
            None => cx.format_selected(&content.document, self.content_type()),
        }
    }
}
