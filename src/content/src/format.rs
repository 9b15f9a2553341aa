//! Conversion of stored payloads into API response records.
//!
//! Package content types are stored as maps from a package identifier to a
//! type-specific record; responses are flat lists of records with a common
//! field vocabulary per type. Image metadata (manifest, Dockerfile, history)
//! is returned base64-encoded.

use base64::Engine;
use image_content_core::ContentTypeRegistry;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Canonical response shape for one content type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedContent {
    /// Base64-encoded metadata body
    Encoded(String),
    /// Package or file records
    Records(Vec<Value>),
}

impl NormalizedContent {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Encoded(s) => s.is_empty(),
            Self::Records(r) => r.is_empty(),
        }
    }

    /// Decoded text of an encoded metadata body.
    pub fn decoded_text(&self) -> Option<String> {
        match self {
            Self::Encoded(s) => base64::engine::general_purpose::STANDARD
                .decode(s)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok()),
            Self::Records(_) => None,
        }
    }
}

/// Payload could not be converted for its content type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("payload for content type '{content_type}' must be {expected}, found {found}")]
    UnexpectedShape {
        content_type: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("record '{id}' of content type '{content_type}' is not an object")]
    InvalidRecord { content_type: String, id: String },
}

/// Converts a raw stored payload into its response shape.
pub trait ResponseFormatter: Send + Sync {
    fn format(&self, content_type: &str, payload: &Value) -> Result<NormalizedContent, FormatError>;
}

/// Formatter for the built-in content and metadata types.
#[derive(Debug, Clone, Default)]
pub struct PackageFormatter {
    registry: ContentTypeRegistry,
}

impl PackageFormatter {
    pub fn new(registry: ContentTypeRegistry) -> Self {
        Self { registry }
    }

    fn encode_metadata(payload: &Value) -> NormalizedContent {
        let engine = &base64::engine::general_purpose::STANDARD;
        let encoded = match payload {
            Value::Null => String::new(),
            Value::String(s) if s.is_empty() => String::new(),
            Value::String(s) => engine.encode(s.as_bytes()),
            other => engine.encode(other.to_string().as_bytes()),
        };
        NormalizedContent::Encoded(encoded)
    }

    fn format_records(
        content_type: &str,
        payload: &Value,
    ) -> Result<NormalizedContent, FormatError> {
        let entries = match payload {
            Value::Null => return Ok(NormalizedContent::Records(Vec::new())),
            Value::Object(entries) => entries,
            // Malware findings are already a flat list
            Value::Array(items) if content_type == "malware" => {
                return Ok(NormalizedContent::Records(items.clone()))
            }
            other => {
                return Err(FormatError::UnexpectedShape {
                    content_type: content_type.to_string(),
                    expected: "an object keyed by package identifier",
                    found: json_kind(other),
                })
            }
        };

        let mut records = Vec::with_capacity(entries.len());
        for (id, entry) in entries {
            let record = entry.as_object().ok_or_else(|| FormatError::InvalidRecord {
                content_type: content_type.to_string(),
                id: id.clone(),
            })?;
            records.push(match content_type {
                "os" => os_record(id, record),
                "java" => java_record(id, record),
                "files" => file_record(id, record),
                "malware" => Value::Object(record.clone()),
                _ => language_record(id, record),
            });
        }
        Ok(NormalizedContent::Records(records))
    }
}

impl ResponseFormatter for PackageFormatter {
    fn format(&self, content_type: &str, payload: &Value) -> Result<NormalizedContent, FormatError> {
        if self.registry.is_metadata_type(content_type) {
            return Ok(Self::encode_metadata(payload));
        }
        if self.registry.is_content_type(content_type) {
            return Self::format_records(content_type, payload);
        }
        tracing::warn!(content_type, "Unsupported content type requested for formatting");
        Ok(NormalizedContent::Records(Vec::new()))
    }
}

fn os_record(id: &str, pkg: &Map<String, Value>) -> Value {
    let version = text(pkg, &["version"]).unwrap_or_else(|| "N/A".to_string());
    let version = match text(pkg, &["release"]) {
        Some(release) if release != "N/A" && !release.is_empty() => {
            format!("{}-{}", version, release)
        }
        _ => version,
    };
    let license = text(pkg, &["license"]).unwrap_or_else(|| "Unknown".to_string());
    let licenses: Vec<&str> = license.split_whitespace().collect();
    json!({
        "package": text(pkg, &["name"]).unwrap_or_else(|| id.to_string()),
        "version": version,
        "size": pick(pkg, &["size"]).unwrap_or_else(|| json!("N/A")),
        "type": text(pkg, &["type"]).unwrap_or_else(|| "N/A".to_string()).to_uppercase(),
        "origin": text(pkg, &["origin", "sourcepkg"]).unwrap_or_else(|| "N/A".to_string()),
        "license": license,
        "licenses": licenses,
    })
}

fn java_record(id: &str, pkg: &Map<String, Value>) -> Value {
    let na = || "N/A".to_string();
    json!({
        "package": text(pkg, &["name"]).unwrap_or_else(|| id.to_string()),
        "specification-version": text(pkg, &["specification-version"]).unwrap_or_else(na),
        "implementation-version": text(pkg, &["implementation-version"]).unwrap_or_else(na),
        "maven-version": text(pkg, &["maven-version"]).unwrap_or_else(na),
        "location": text(pkg, &["location"]).unwrap_or_else(|| id.to_string()),
        "type": text(pkg, &["type"]).unwrap_or_else(na).to_uppercase(),
        "origin": text(pkg, &["origin"]).unwrap_or_else(na),
    })
}

fn language_record(id: &str, pkg: &Map<String, Value>) -> Value {
    let version = text(pkg, &["version"])
        .or_else(|| first_text(pkg, "versions"))
        .unwrap_or_else(|| "N/A".to_string());
    let licenses: Vec<String> = match pick(pkg, &["licenses", "lics"]) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => text(pkg, &["license"])
            .map(|l| l.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default(),
    };
    let license = if licenses.is_empty() {
        "Unknown".to_string()
    } else {
        licenses.join(" ")
    };
    json!({
        "package": text(pkg, &["name"]).unwrap_or_else(|| id.to_string()),
        "version": version,
        "location": text(pkg, &["location"]).unwrap_or_else(|| id.to_string()),
        "type": text(pkg, &["type"]).unwrap_or_else(|| "N/A".to_string()).to_uppercase(),
        "origin": text(pkg, &["origin"]).unwrap_or_else(|| "N/A".to_string()),
        "license": license,
        "licenses": licenses,
    })
}

fn file_record(id: &str, entry: &Map<String, Value>) -> Value {
    let field = |name: &str| entry.get(name).cloned().unwrap_or(Value::Null);
    json!({
        "filename": text(entry, &["name"]).unwrap_or_else(|| id.to_string()),
        "gid": field("gid"),
        "uid": field("uid"),
        "mode": field("mode"),
        "linkdest": field("linkdst"),
        "size": field("size"),
        "type": field("type"),
        "sha256": field("sha256"),
    })
}

/// First non-null value among `keys`.
fn pick(map: &Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
        .cloned()
}

/// First value among `keys` rendered as text.
fn text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    pick(map, keys).map(|v| match v {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn first_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
