//! Request fingerprints.

use std::fmt;

use mentor_core::{Method, RequestBody};

/// Deterministic identity of a request: method, endpoint and body.
///
/// The endpoint includes its encoded query string, so `/api/concepts?topic=a`
/// and `/api/concepts?topic=b` are different keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    method: Method,
    endpoint: String,
    body: String,
}

impl Fingerprint {
    /// Builds the fingerprint of a request.
    pub fn new(method: Method, endpoint: impl Into<String>, body: &RequestBody) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: body.canonical(),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Endpoint path including query string.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Endpoint path without query string.
    pub fn path(&self) -> &str {
        self.endpoint
            .split_once('?')
            .map(|(path, _)| path)
            .unwrap_or(&self.endpoint)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns true if the path equals `prefix` or lies below it.
    ///
    /// `/api/progress` matches `/api/progress` and `/api/progress/x` but not
    /// `/api/progress-report`.
    pub fn has_path_prefix(&self, prefix: &str) -> bool {
        let prefix = prefix.trim_end_matches('/');
        match self.path().strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.body.is_empty() {
            write!(f, "{} {}", self.method, self.endpoint)
        } else {
            write!(f, "{} {} {}", self.method, self.endpoint, self.body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentor_core::MultipartBody;
    use serde_json::json;

    #[test]
    fn test_same_request_same_fingerprint() {
        let body = RequestBody::json(&json!({ "concept_id": "c1", "mastery_score": 0.5 })).unwrap();
        let a = Fingerprint::new(Method::Post, "/api/update-mastery", &body);
        let b = Fingerprint::new(Method::Post, "/api/update-mastery", &body.clone());
        assert_eq!(a, b);
    }

    #[test]
    fn test_method_is_part_of_key() {
        let get = Fingerprint::new(Method::Get, "/api/teacher/classrooms", &RequestBody::Empty);
        let post = Fingerprint::new(Method::Post, "/api/teacher/classrooms", &RequestBody::Empty);
        assert_ne!(get, post);
    }

    #[test]
    fn test_query_is_part_of_key() {
        let a = Fingerprint::new(Method::Get, "/api/concepts?topic=algebra", &RequestBody::Empty);
        let b = Fingerprint::new(Method::Get, "/api/concepts?topic=geometry", &RequestBody::Empty);
        assert_ne!(a, b);
        assert_eq!(a.path(), "/api/concepts");
    }

    #[test]
    fn test_path_prefix_respects_segments() {
        let fp = Fingerprint::new(Method::Get, "/api/progress", &RequestBody::Empty);
        assert!(fp.has_path_prefix("/api/progress"));
        assert!(fp.has_path_prefix("/api/progress/"));
        assert!(fp.has_path_prefix("/api"));
        assert!(!fp.has_path_prefix("/api/prog"));

        let detail = Fingerprint::new(Method::Get, "/api/teacher/activities/a1/questions", &RequestBody::Empty);
        assert!(detail.has_path_prefix("/api/teacher/activities"));
    }

    #[test]
    fn test_upload_contents_are_part_of_key() {
        let upload = |contents: &[u8]| {
            RequestBody::Multipart(MultipartBody {
                file_name: "notes.pdf".into(),
                content_type: "application/pdf".into(),
                bytes: contents.to_vec().into(),
                metadata: r#"{"classroom_id":"c1"}"#.into(),
            })
        };
        let a = Fingerprint::new(Method::Post, "/api/teacher/documents/upload", &upload(b"AAAAA"));
        let b = Fingerprint::new(Method::Post, "/api/teacher/documents/upload", &upload(b"BBBBB"));
        assert_ne!(a, b);
        assert_eq!(a, Fingerprint::new(Method::Post, "/api/teacher/documents/upload", &upload(b"AAAAA")));
    }

    #[test]
    fn test_display() {
        let fp = Fingerprint::new(Method::Get, "/api/concept/c1", &RequestBody::Empty);
        assert_eq!(fp.to_string(), "GET /api/concept/c1");
    }
}
