//! End-to-end retrieval against the file-backed stores.

use base64::Engine;
use image_content::{
    get_image_content, ContentGetter, ContentServices, FileObjectStore, FileRecordStore,
    NormalizedContent, ObjectStore,
};
use image_content_core::document::{decode_envelope, encode_envelope};
use image_content_core::{
    AnalysisStatus, ContentConfig, ContentError, DockerfileMode, ImageDetail, ImageRecord,
};
use serde_json::json;
use tempfile::TempDir;

const ACCOUNT: &str = "admin";
const DIGEST: &str = "sha256:6a1c8ee1ad7c0e7b2b0f1e5a0e4d1f59d8ca0e4d7c5a38fd2f6d8c7f3b1c0a91";
const DOCKERFILE: &str = "FROM python:3.12-slim\nCOPY . /app\nCMD [\"python\", \"/app/main.py\"]\n";

struct Catalog {
    _tmp: TempDir,
    config: ContentConfig,
}

impl Catalog {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let config = ContentConfig::from_yaml_str(&format!("data_dir: {}\n", tmp.path().display()))
            .unwrap();
        Self { _tmp: tmp, config }
    }

    fn records(&self) -> FileRecordStore {
        FileRecordStore::new(self.config.records_path())
    }

    fn objects(&self) -> FileObjectStore {
        FileObjectStore::new(self.config.objects_path())
    }

    fn services(&self) -> ContentServices {
        ContentServices::from_config(&self.config)
    }

    fn seed(&self, status: AnalysisStatus) {
        let mut record = ImageRecord::new(ACCOUNT, DIGEST, status);
        record.dockerfile_mode = Some(DockerfileMode::Actual);
        record.image_detail = vec![
            ImageDetail {
                registry: "docker.io".to_string(),
                repo: "acme/app".to_string(),
                tag: "latest".to_string(),
                dockerfile: None,
            },
            ImageDetail {
                registry: "docker.io".to_string(),
                repo: "acme/app".to_string(),
                tag: "1.0".to_string(),
                dockerfile: Some(base64::engine::general_purpose::STANDARD.encode(DOCKERFILE)),
            },
        ];
        self.records().upsert(record).unwrap();

        let content = json!({
            "os": {
                "libc6": {"version": "2.36", "release": "9+deb12u4", "type": "dpkg", "license": "LGPL-2.1"},
                "bash": {"version": "5.2.15", "type": "dpkg"}
            },
            "python": {
                "/usr/local/lib/python3.12/site-packages/requests": {
                    "name": "requests", "version": "2.31.0", "type": "python", "license": "Apache-2.0"
                }
            },
            "docker_history": []
        });
        self.objects()
            .put(ACCOUNT, "image_content_data", DIGEST, &encode_envelope(&content).unwrap())
            .unwrap();
        self.objects()
            .put(
                ACCOUNT,
                "manifest_data",
                DIGEST,
                &encode_envelope(&json!({"schemaVersion": 2, "mediaType": "application/vnd.oci.image.manifest.v1+json"}))
                    .unwrap(),
            )
            .unwrap();
    }
}

#[test]
fn test_os_packages_from_disk() {
    let catalog = Catalog::new();
    catalog.seed(AnalysisStatus::Analyzed);

    let out = get_image_content(&catalog.services(), ACCOUNT, DIGEST, "os", false).unwrap();
    let NormalizedContent::Records(records) = out else {
        panic!("expected records");
    };
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["package"], "bash");
    assert_eq!(records[1]["package"], "libc6");
    assert_eq!(records[1]["version"], "2.36-9+deb12u4");
}

#[test]
fn test_manifest_from_disk() {
    let catalog = Catalog::new();
    catalog.seed(AnalysisStatus::Analyzed);

    let out = ContentGetter::manifest(catalog.services(), ACCOUNT, DIGEST)
        .get(false)
        .unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&out.decoded_text().unwrap()).unwrap();
    assert_eq!(manifest["schemaVersion"], 2);
}

#[test]
fn test_dockerfile_migration_persists_to_disk() {
    let catalog = Catalog::new();
    catalog.seed(AnalysisStatus::Analyzed);

    let first = ContentGetter::dockerfile(catalog.services(), ACCOUNT, DIGEST)
        .get(false)
        .unwrap();
    assert_eq!(first.decoded_text().unwrap(), DOCKERFILE);

    let bytes = catalog
        .objects()
        .get(ACCOUNT, "image_content_data", DIGEST)
        .unwrap();
    let stored = decode_envelope(&bytes).unwrap();
    assert_eq!(stored["dockerfile"], DOCKERFILE);
    assert_eq!(stored["python"].as_object().unwrap().len(), 1);

    // A fresh set of services sees the migrated document.
    let second = ContentGetter::dockerfile(catalog.services(), ACCOUNT, DIGEST)
        .get(false)
        .unwrap();
    assert_eq!(second, first);
}

#[test]
fn test_multi_type_from_disk() {
    let catalog = Catalog::new();
    catalog.seed(AnalysisStatus::Analyzed);

    let out = ContentGetter::multi(catalog.services(), ACCOUNT, DIGEST, ["ALL"])
        .get(false)
        .unwrap();
    let keys: Vec<_> = out.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["os", "python"]);
}

#[test]
fn test_analyzing_image_requires_opt_in() {
    let catalog = Catalog::new();
    catalog.seed(AnalysisStatus::Analyzing);

    let err = get_image_content(&catalog.services(), ACCOUNT, DIGEST, "os", false).unwrap_err();
    assert!(matches!(err, ContentError::InvalidState { .. }));
    assert_eq!(err.http_status(), 404);

    assert!(get_image_content(&catalog.services(), ACCOUNT, DIGEST, "os", true).is_ok());
}

#[test]
fn test_unknown_digest() {
    let catalog = Catalog::new();
    catalog.seed(AnalysisStatus::Analyzed);

    for content_type in ["os", "manifest", "dockerfile"] {
        let err = get_image_content(&catalog.services(), ACCOUNT, "sha256:missing", content_type, false)
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound { .. }), "{}", content_type);
    }
    let err = ContentGetter::multi(catalog.services(), ACCOUNT, "sha256:missing", ["all"])
        .get(false)
        .unwrap_err();
    assert!(matches!(err, ContentError::NotFound { .. }));
}
