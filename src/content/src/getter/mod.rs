//! Image content getters.
//!
//! Every getter runs the same request flow and differs only in a few hooks
//! supplied by its [`ContentVariant`]:
//!
//! ```text
//! record lookup ──► status check ──► fetch document ──► presence check ──► format ──► post-process
//!   NotFound         InvalidState     UpstreamFailure    InvalidRequest     (profile)    (variant)
//! ```
//!
//! | Variant              | Category     | Presence | Format on load | Post-process            |
//! |----------------------|--------------|----------|----------------|-------------------------|
//! | [`SingleType`]       | content      | yes      | yes            | passthrough             |
//! | [`ManifestContent`]  | manifest     | yes      | yes            | passthrough             |
//! | [`DockerfileContent`]| content      | no       | no             | legacy migration        |
//! | [`MultiTypeContent`] | content      | no       | no             | filter by requested set |

mod dockerfile;
mod manifest;
mod multi;
mod single;

use std::collections::BTreeSet;

use image_content_core::error::{ContentError, ErrorDetail, Result, StoreError};
use image_content_core::{ContentDocument, ImageRecord};
use serde_json::Value;

use crate::format::NormalizedContent;
use crate::services::ContentServices;

pub use dockerfile::{DockerfileContent, MigrationOutcome};
pub use manifest::ManifestContent;
pub use multi::{ContentByType, MultiTypeContent};
pub use single::SingleType;

/// Sentinel selecting every supported content type.
pub const ALL_CONTENT_TYPES: &str = "all";

/// Upstream failure message; the store error is kept as the source only.
const FETCH_CONTENT_FAILED: &str = "cannot fetch content data from archive";
const FETCH_RECORD_FAILED: &str = "cannot fetch image record from catalog";

/// Object store category a variant reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Per-image content documents
    Content,
    /// Per-image manifest documents
    Manifest,
}

/// Base-flow switches of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantProfile {
    pub category: Category,
    /// Reject a single-type request whose type is not a document key
    pub validates_presence: bool,
    /// Format the selected payload before post-processing
    pub normalizes_on_load: bool,
}

impl Default for VariantProfile {
    fn default() -> Self {
        Self {
            category: Category::Content,
            validates_presence: true,
            normalizes_on_load: true,
        }
    }
}

/// Content types requested by a getter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSelector {
    /// One content type, matched case-sensitively
    Single(String),
    /// Lower-cased set of content types, possibly containing `all`
    Many(BTreeSet<String>),
}

impl ContentSelector {
    pub fn many<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Many(
            types
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .collect(),
        )
    }

    pub fn single(&self) -> Option<&str> {
        match self {
            Self::Single(t) => Some(t),
            Self::Many(_) => None,
        }
    }

    /// Selector as reported in error details.
    pub fn label(&self) -> Option<String> {
        match self {
            Self::Single(t) => Some(t.clone()),
            Self::Many(types) if types.is_empty() => None,
            Self::Many(types) => Some(types.iter().cloned().collect::<Vec<_>>().join(",")),
        }
    }
}

/// Fetched document handed to a variant's post-processing hook.
#[derive(Debug, Clone)]
pub struct LoadedContent {
    pub document: ContentDocument,
    /// Formatted selected payload, when the variant formats on load
    pub normalized: Option<NormalizedContent>,
}

/// Per-request view of the services plus request identity.
pub struct RequestContext<'a> {
    services: &'a ContentServices,
    account_id: &'a str,
    image_digest: &'a str,
    selector: &'a ContentSelector,
}

impl<'a> RequestContext<'a> {
    pub fn services(&self) -> &'a ContentServices {
        self.services
    }

    pub fn account_id(&self) -> &'a str {
        self.account_id
    }

    pub fn image_digest(&self) -> &'a str {
        self.image_digest
    }

    pub fn detail(&self) -> ErrorDetail {
        ErrorDetail::new(self.account_id, self.selector.label(), self.image_digest)
    }

    pub fn category_name(&self, category: Category) -> &'a str {
        match category {
            Category::Content => self.services.content_category(),
            Category::Manifest => self.services.manifest_category(),
        }
    }

    /// Raw object for this image in `category`.
    pub fn fetch_object(&self, category: Category) -> std::result::Result<Vec<u8>, StoreError> {
        self.services.objects().get(
            self.account_id,
            self.category_name(category),
            self.image_digest,
        )
    }

    /// Decoded content document for this image in `category`.
    pub fn load_document(
        &self,
        category: Category,
    ) -> std::result::Result<ContentDocument, StoreError> {
        ContentDocument::from_slice(&self.fetch_object(category)?)
    }

    /// Format a payload, reporting an unusable payload as a bad request.
    pub fn format(&self, content_type: &str, payload: &Value) -> Result<NormalizedContent> {
        self.services
            .formatter()
            .format(content_type, payload)
            .map_err(|e| ContentError::InvalidRequest {
                message: format!(
                    "image content of type ({}) could not be formatted: {}",
                    content_type, e
                ),
                detail: self.detail(),
            })
    }

    /// Format the document entry for `content_type`, which must be present.
    pub fn format_selected(
        &self,
        document: &ContentDocument,
        content_type: &str,
    ) -> Result<NormalizedContent> {
        match document.get(content_type) {
            Some(payload) => self.format(content_type, payload),
            None => Err(self.not_available(content_type)),
        }
    }

    pub fn not_available(&self, content_type: &str) -> ContentError {
        ContentError::InvalidRequest {
            message: format!(
                "image content of type ({}) was not an available type at analysis time for this image",
                content_type
            ),
            detail: self.detail(),
        }
    }
}

/// Behavior that distinguishes one getter from another.
pub trait ContentVariant {
    type Output;

    fn selector(&self) -> &ContentSelector;

    fn profile(&self) -> VariantProfile {
        VariantProfile::default()
    }

    /// Load the document the rest of the flow operates on.
    fn fetch(&self, cx: &RequestContext<'_>) -> std::result::Result<ContentDocument, StoreError> {
        cx.load_document(self.profile().category)
    }

    /// Produce the response from the loaded content.
    fn post_process(
        &self,
        cx: &RequestContext<'_>,
        content: LoadedContent,
        record: &ImageRecord,
    ) -> Result<Self::Output>;
}

/// One content retrieval for one image, serving a single request.
#[derive(Debug, Clone)]
pub struct ContentGetter<V> {
    services: ContentServices,
    account_id: String,
    image_digest: String,
    variant: V,
}

impl<V: ContentVariant> ContentGetter<V> {
    pub fn new(
        services: ContentServices,
        account_id: impl Into<String>,
        image_digest: impl Into<String>,
        variant: V,
    ) -> Self {
        Self {
            services,
            account_id: account_id.into(),
            image_digest: image_digest.into(),
            variant,
        }
    }

    pub fn variant(&self) -> &V {
        &self.variant
    }

    /// Run the retrieval.
    ///
    /// Images must be fully analyzed; `allow_analyzing_state` also admits
    /// images whose analysis is still in progress.
    pub fn get(&self, allow_analyzing_state: bool) -> Result<V::Output> {
        let cx = RequestContext {
            services: &self.services,
            account_id: &self.account_id,
            image_digest: &self.image_digest,
            selector: self.variant.selector(),
        };
        let profile = self.variant.profile();

        tracing::debug!(
            account_id = %self.account_id,
            image_digest = %self.image_digest,
            content_type = ?cx.selector.label(),
            "Fetching image content"
        );

        let record = self
            .services
            .records()
            .get(&self.image_digest, &self.account_id)
            .map_err(|source| {
                tracing::error!(
                    account_id = %self.account_id,
                    image_digest = %self.image_digest,
                    error = %source,
                    "Failed to load image record"
                );
                ContentError::UpstreamFailure {
                    message: FETCH_RECORD_FAILED.to_string(),
                    detail: cx.detail(),
                    source,
                }
            })?
            .ok_or_else(|| ContentError::NotFound {
                detail: cx.detail(),
            })?;

        if !record.analysis_status.is_readable(allow_analyzing_state) {
            return Err(ContentError::InvalidState {
                status: record.analysis_status,
                detail: cx.detail(),
            });
        }

        let document = self.variant.fetch(&cx).map_err(|source| {
            tracing::error!(
                account_id = %self.account_id,
                image_digest = %self.image_digest,
                category = cx.category_name(profile.category),
                error = %source,
                "Failed to load image content data"
            );
            ContentError::UpstreamFailure {
                message: FETCH_CONTENT_FAILED.to_string(),
                detail: cx.detail(),
                source,
            }
        })?;

        let selected = cx.selector.single();
        if profile.validates_presence {
            if let Some(content_type) = selected {
                if !document.contains(content_type) {
                    return Err(cx.not_available(content_type));
                }
            }
        }

        let normalized = match selected {
            Some(content_type) if profile.normalizes_on_load => {
                Some(cx.format_selected(&document, content_type)?)
            }
            _ => None,
        };

        self.variant.post_process(
            &cx,
            LoadedContent {
                document,
                normalized,
            },
            &record,
        )
    }
}

impl ContentGetter<SingleType> {
    /// Getter for one package or metadata content type.
    pub fn content(
        services: ContentServices,
        account_id: impl Into<String>,
        image_digest: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self::new(services, account_id, image_digest, SingleType::new(content_type))
    }
}

impl ContentGetter<ManifestContent> {
    /// Getter for the image manifest.
    pub fn manifest(
        services: ContentServices,
        account_id: impl Into<String>,
        image_digest: impl Into<String>,
    ) -> Self {
        Self::new(services, account_id, image_digest, ManifestContent::default())
    }
}

impl ContentGetter<DockerfileContent> {
    /// Getter for the image Dockerfile, migrating legacy storage on read.
    pub fn dockerfile(
        services: ContentServices,
        account_id: impl Into<String>,
        image_digest: impl Into<String>,
    ) -> Self {
        Self::new(services, account_id, image_digest, DockerfileContent::default())
    }
}

impl ContentGetter<MultiTypeContent> {
    /// Getter for several content types at once; `all` selects everything.
    pub fn multi<I, S>(
        services: ContentServices,
        account_id: impl Into<String>,
        image_digest: impl Into<String>,
        content_types: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            services,
            account_id,
            image_digest,
            MultiTypeContent::new(content_types),
        )
    }
}

/// Fetch one content type using the getter appropriate for it.
pub fn get_image_content(
    services: &ContentServices,
    account_id: &str,
    image_digest: &str,
    content_type: &str,
    allow_analyzing_state: bool,
) -> Result<NormalizedContent> {
    match content_type {
        manifest::MANIFEST => {
            ContentGetter::manifest(services.clone(), account_id, image_digest)
                .get(allow_analyzing_state)
        }
        dockerfile::DOCKERFILE => {
            ContentGetter::dockerfile(services.clone(), account_id, image_digest)
                .get(allow_analyzing_state)
        }
        _ => ContentGetter::content(services.clone(), account_id, image_digest, content_type)
            .get(allow_analyzing_state),
    }
}
