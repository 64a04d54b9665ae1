//! Transport-level request and response types.
//!
//! These are the values that cross the [`Transport`](crate::traits::Transport)
//! seam. They carry no behavior beyond (de)serialization helpers so that test
//! transports can build and inspect them directly.

use std::fmt;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::error::{MentorError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// REQUEST CLASSIFICATION
// ═══════════════════════════════════════════════════════════════════════════════

/// HTTP method used by the backend API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Idempotent read.
    Get,
    /// Create or action.
    Post,
    /// Replace.
    Put,
    /// Remove.
    Delete,
}

impl Method {
    /// Returns the method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Returns true for reads, the only requests eligible for caching.
    pub fn is_read(&self) -> bool {
        matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timeout tier of an endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EndpointClass {
    /// Ordinary reads and writes.
    #[default]
    Standard,
    /// Status polling that may wait on a busy backend.
    Polling,
    /// AI generation calls.
    Generation,
}

/// Whether an endpoint needs a bearer token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthRequirement {
    /// Fail with `AuthenticationMissing` before sending when no token exists.
    #[default]
    Required,
    /// Send the token when one exists, otherwise go out unauthenticated.
    Optional,
}

// ═══════════════════════════════════════════════════════════════════════════════
// REQUEST BODY
// ═══════════════════════════════════════════════════════════════════════════════

/// File part plus JSON metadata part of a document upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultipartBody {
    /// Original file name, sent as the part's filename
    pub file_name: String,
    /// MIME type of the file
    pub content_type: String,
    /// File contents
    pub bytes: Bytes,
    /// JSON text sent in the `metadata` part
    pub metadata: String,
}

/// Body of an outbound request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// Serialized JSON text.
    Json(String),
    /// Multipart form with a `file` and a `metadata` part.
    Multipart(MultipartBody),
}

impl RequestBody {
    /// Serializes a value into a JSON body.
    ///
    /// Struct fields serialize in declaration order, so equal values always
    /// produce equal text.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(RequestBody::Json(serde_json::to_string(value)?))
    }

    /// Stable textual form of the body used for request fingerprints.
    ///
    /// File contents are represented by their SHA3-256 digest.
    pub fn canonical(&self) -> String {
        match self {
            RequestBody::Empty => String::new(),
            RequestBody::Json(text) => text.clone(),
            RequestBody::Multipart(part) => format!(
                "multipart:{}:{}:{}:{}",
                part.file_name,
                part.bytes.len(),
                hex::encode(Sha3_256::digest(&part.bytes)),
                part.metadata
            ),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REQUEST / RESPONSE
// ═══════════════════════════════════════════════════════════════════════════════

/// A fully resolved outbound request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL including query string
    pub url: String,
    /// Bearer token for the `Authorization` header
    pub bearer: Option<String>,
    /// Request body
    pub body: RequestBody,
}

/// A raw backend response.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Canonical reason phrase for the status, when known
    pub status_text: Option<String>,
    /// Response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates a response with a JSON body.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            status_text: None,
            body: Bytes::from(value.to_string()),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the body as JSON.
    ///
    /// An empty body decodes as `null`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.is_empty() {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Turns a non-2xx response into an `Http` error.
    ///
    /// The message is the backend's `detail`, `message` or `error` field when
    /// present, falling back to the status text.
    pub fn into_error(self) -> MentorError {
        let server_message = serde_json::from_slice::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|body| extract_message(&body));

        let message = server_message
            .or(self.status_text)
            .unwrap_or_else(|| format!("HTTP {}", self.status));

        MentorError::Http {
            status: self.status,
            message,
        }
    }
}

fn extract_message(body: &serde_json::Value) -> Option<String> {
    for key in ["detail", "message", "error"] {
        match body.get(key) {
            Some(serde_json::Value::String(text)) if !text.is_empty() => return Some(text.clone()),
            // FastAPI validation errors carry a list of objects under `detail`
            Some(serde_json::Value::Array(items)) if !items.is_empty() => {
                let joined = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect::<Vec<_>>()
                    .join("; ");
                if !joined.is_empty() {
                    return Some(joined);
                }
            }
            Some(serde_json::Value::Object(inner)) => {
                if let Some(text) = inner.get("message").and_then(|m| m.as_str()) {
                    return Some(text.to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_uses_detail() {
        let response = HttpResponse::json(404, &json!({ "detail": "Classroom not found" }));
        match response.into_error() {
            MentorError::Http { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Classroom not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_uses_validation_messages() {
        let body = json!({ "detail": [{ "msg": "field required" }, { "msg": "value is not a valid integer" }] });
        let err = HttpResponse::json(422, &body).into_error();
        assert!(err.to_string().contains("field required; value is not a valid integer"));
    }

    #[test]
    fn test_error_falls_back_to_status_text() {
        let response = HttpResponse {
            status: 502,
            status_text: Some("Bad Gateway".into()),
            body: Bytes::from_static(b"<html>upstream down</html>"),
        };
        assert_eq!(response.into_error().to_string(), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_error_without_any_text() {
        let response = HttpResponse {
            status: 599,
            status_text: None,
            body: Bytes::new(),
        };
        assert_eq!(response.into_error().to_string(), "HTTP 599: HTTP 599");
    }

    #[test]
    fn test_parse_empty_body_is_null() {
        let response = HttpResponse {
            status: 204,
            status_text: None,
            body: Bytes::new(),
        };
        let value: serde_json::Value = response.parse().unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_canonical_body() {
        assert_eq!(RequestBody::Empty.canonical(), "");

        let body = RequestBody::json(&json!({ "a": 1 })).unwrap();
        assert_eq!(body.canonical(), r#"{"a":1}"#);

        let multipart = upload(b"12345");
        let canonical = multipart.canonical();
        assert!(canonical.starts_with("multipart:notes.pdf:5:"));
        assert!(canonical.ends_with(":{}"));
        assert_eq!(canonical, upload(b"12345").canonical());
    }

    fn upload(bytes: &'static [u8]) -> RequestBody {
        RequestBody::Multipart(MultipartBody {
            file_name: "notes.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: Bytes::from_static(bytes),
            metadata: "{}".into(),
        })
    }

    #[test]
    fn test_canonical_upload_depends_on_contents() {
        assert_ne!(upload(b"AAAAA").canonical(), upload(b"BBBBB").canonical());
    }

    #[test]
    fn test_method_reads() {
        assert!(Method::Get.is_read());
        assert!(!Method::Post.is_read());
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }
}
