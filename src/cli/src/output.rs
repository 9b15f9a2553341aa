//! JSON rendering helpers for CLI output.

use image_content::{ContentByType, NormalizedContent};
use image_content_core::ContentError;
use serde_json::{json, Value};

/// Response body for a single content type.
pub fn content_body(image_digest: &str, content_type: &str, content: &NormalizedContent) -> Value {
    json!({
        "imageDigest": image_digest,
        "content_type": content_type,
        "content": content,
    })
}

/// Response body for a multi-type request.
pub fn content_types_body(image_digest: &str, content: &ContentByType) -> Value {
    json!({
        "imageDigest": image_digest,
        "content": content,
    })
}

/// Error body carrying the status class and request detail.
pub fn error_body(err: &ContentError) -> Value {
    json!({
        "message": err.to_string(),
        "httpcode": err.http_status(),
        "detail": err.detail(),
    })
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
