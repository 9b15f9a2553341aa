//! Content documents as kept in the object store.
//!
//! Every stored object is a UTF-8 JSON envelope of the form
//! `{"document": ...}`. For the content category the document is a map from
//! content type to that type's payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    document: T,
}

/// Decode the `document` member of a stored envelope.
pub fn decode_envelope(bytes: &[u8]) -> Result<Value, StoreError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| StoreError::Serialization(format!("stored object is not UTF-8: {}", e)))?;
    let envelope: Envelope<Value> = serde_json::from_str(text)?;
    Ok(envelope.document)
}

/// Per-image mapping from content type to stored payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentDocument {
    entries: Map<String, Value>,
}

impl ContentDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a content-category object.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, StoreError> {
        Self::from_value(decode_envelope(bytes)?)
    }

    /// Build from a decoded document, which must be an object.
    pub fn from_value(document: Value) -> Result<Self, StoreError> {
        match document {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(StoreError::Serialization(format!(
                "content document must be an object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Encode as a stored envelope.
    pub fn to_vec(&self) -> Result<Vec<u8>, StoreError> {
        let envelope = Envelope {
            document: &self.entries,
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    pub fn get(&self, content_type: &str) -> Option<&Value> {
        self.entries.get(content_type)
    }

    pub fn contains(&self, content_type: &str) -> bool {
        self.entries.contains_key(content_type)
    }

    /// Whether the entry exists and carries content (not null, empty or zero).
    pub fn has_content(&self, content_type: &str) -> bool {
        self.entries.get(content_type).is_some_and(is_populated)
    }

    pub fn insert(&mut self, content_type: impl Into<String>, payload: Value) {
        self.entries.insert(content_type.into(), payload);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl From<Map<String, Value>> for ContentDocument {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(String, Value)> for ContentDocument {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Encode an arbitrary document value as a stored envelope.
pub fn encode_envelope(document: &Value) -> Result<Vec<u8>, StoreError> {
    Ok(serde_json::to_vec(&Envelope { document })?)
}

/// Whether a JSON value carries content (not null, false, zero or empty).
pub fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_slice() {
        let bytes = br#"{"document": {"os": {"bash": {"version": "5.1"}}, "java": {}}}"#;
        let doc = ContentDocument::from_slice(bytes).unwrap();
        assert_eq!(doc.len(), 2);
        assert!(doc.contains("os"));
        assert!(doc.contains("java"));
        assert!(!doc.contains("npm"));
        assert_eq!(doc.get("os").unwrap()["bash"]["version"], "5.1");
    }

    #[test]
    fn test_from_slice_missing_envelope() {
        let err = ContentDocument::from_slice(br#"{"os": {}}"#).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn test_from_slice_non_object_document() {
        let err = ContentDocument::from_slice(br#"{"document": [1, 2]}"#).unwrap_err();
        assert!(err.to_string().contains("found array"));
    }

    #[test]
    fn test_from_slice_invalid_utf8() {
        let err = ContentDocument::from_slice(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(err.to_string().contains("not UTF-8"));
    }

    #[test]
    fn test_to_vec_keeps_envelope() {
        let mut doc = ContentDocument::new();
        doc.insert("dockerfile", json!("FROM alpine"));
        let bytes = doc.to_vec().unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({"document": {"dockerfile": "FROM alpine"}}));
        assert_eq!(ContentDocument::from_slice(&bytes).unwrap(), doc);
    }

    #[test]
    fn test_has_content() {
        let doc: ContentDocument = vec![
            ("dockerfile".to_string(), json!("")),
            ("os".to_string(), json!({})),
            ("java".to_string(), json!({"a": 1})),
            ("files".to_string(), Value::Null),
        ]
        .into_iter()
        .collect();
        assert!(!doc.has_content("dockerfile"));
        assert!(!doc.has_content("os"));
        assert!(doc.has_content("java"));
        assert!(!doc.has_content("files"));
        assert!(!doc.has_content("npm"));
        assert!(doc.contains("files"));
    }

    #[test]
    fn test_is_populated() {
        assert!(!is_populated(&Value::Null));
        assert!(!is_populated(&json!({})));
        assert!(!is_populated(&json!([])));
        assert!(!is_populated(&json!(0)));
        assert!(is_populated(&json!({"os": {}})));
        assert!(is_populated(&json!("FROM alpine")));
    }

    #[test]
    fn test_encode_envelope_manifest() {
        let bytes = encode_envelope(&json!({"schemaVersion": 2})).unwrap();
        assert_eq!(decode_envelope(&bytes).unwrap(), json!({"schemaVersion": 2}));
    }
}
