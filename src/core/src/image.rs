//! Catalog image records.
//!
//! An [`ImageRecord`] describes one analyzed image for one account. Records
//! are owned by the record store and only read by content retrieval.

use serde::{Deserialize, Serialize};

/// Analysis lifecycle of an image.
///
/// ```text
/// not_analyzed ──► analyzing ──► analyzed
///                      │
///                      └──────► analysis_failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    NotAnalyzed,
    Analyzing,
    Analyzed,
    AnalysisFailed,
}

impl AnalysisStatus {
    /// Whether content for an image in this state may be read.
    ///
    /// Only `analyzed` is readable by default; `allow_analyzing` additionally
    /// admits images still being analyzed.
    pub fn is_readable(self, allow_analyzing: bool) -> bool {
        match self {
            AnalysisStatus::Analyzed => true,
            AnalysisStatus::Analyzing => allow_analyzing,
            AnalysisStatus::NotAnalyzed | AnalysisStatus::AnalysisFailed => false,
        }
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnalyzed => write!(f, "not_analyzed"),
            Self::Analyzing => write!(f, "analyzing"),
            Self::Analyzed => write!(f, "analyzed"),
            Self::AnalysisFailed => write!(f, "analysis_failed"),
        }
    }
}

/// How the Dockerfile recorded for an image was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DockerfileMode {
    /// Supplied by the user at image add time
    Actual,
    /// Reconstructed from image history
    Guessed,
    #[serde(other)]
    Unknown,
}

/// Per-reference detail entry (registry/repo/tag) of an image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageDetail {
    #[serde(default)]
    pub registry: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub tag: String,
    /// Base64-encoded Dockerfile body (legacy storage location)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,
}

impl ImageDetail {
    /// Full `registry/repo:tag` reference string.
    pub fn full_reference(&self) -> String {
        format!("{}/{}:{}", self.registry, self.repo, self.tag)
    }
}

/// One analyzed image as tracked by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(rename = "imageDigest")]
    pub image_digest: String,
    #[serde(rename = "userId")]
    pub account_id: String,
    pub analysis_status: AnalysisStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile_mode: Option<DockerfileMode>,
    #[serde(default)]
    pub image_detail: Vec<ImageDetail>,
}

impl ImageRecord {
    pub fn new(
        account_id: impl Into<String>,
        image_digest: impl Into<String>,
        analysis_status: AnalysisStatus,
    ) -> Self {
        Self {
            image_digest: image_digest.into(),
            account_id: account_id.into(),
            analysis_status,
            dockerfile_mode: None,
            image_detail: Vec::new(),
        }
    }

    /// Whether the recorded Dockerfile was supplied by the user.
    pub fn has_actual_dockerfile(&self) -> bool {
        self.dockerfile_mode == Some(DockerfileMode::Actual)
    }

    /// Legacy base64 Dockerfile bodies in detail order, skipping empty ones.
    pub fn legacy_dockerfiles(&self) -> impl Iterator<Item = (usize, &str)> {
        self.image_detail
            .iter()
            .enumerate()
            .filter_map(|(i, d)| match d.dockerfile.as_deref() {
                Some(body) if !body.is_empty() => Some((i, body)),
                _ => None,
            })
    }
}
