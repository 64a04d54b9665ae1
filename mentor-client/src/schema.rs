//! Response decoding against endpoint schemas.

use serde::de::DeserializeOwned;
use serde_json::Value;

use mentor_core::{MentorError, Result};

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decodes a JSON object into `T`.
pub fn decode_object<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<T> {
    if !value.is_object() {
        return Err(MentorError::malformed(
            endpoint,
            format!("expected object, got {}", kind(&value)),
        ));
    }
    serde_json::from_value(value).map_err(|e| MentorError::malformed(endpoint, e.to_string()))
}

/// Decodes a JSON array into `Vec<T>`.
pub fn decode_list<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<Vec<T>> {
    let Value::Array(items) = value else {
        return Err(MentorError::malformed(
            endpoint,
            format!("expected array, got {}", kind(&value)),
        ));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item)
                .map_err(|e| MentorError::malformed(endpoint, format!("item {i}: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentor_core::teacher::Classroom;
    use mentor_core::tutor::Progress;
    use serde_json::json;

    #[test]
    fn test_array_where_object_expected() {
        let err = decode_object::<Progress>("/api/progress", json!([])).unwrap_err();
        match err {
            MentorError::MalformedResponse { endpoint, reason } => {
                assert_eq!(endpoint, "/api/progress");
                assert!(reason.contains("array"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_object_where_array_expected() {
        let err = decode_list::<Classroom>("/api/teacher/classrooms", json!({ "classrooms": [] })).unwrap_err();
        assert!(matches!(err, MentorError::MalformedResponse { .. }));
    }

    #[test]
    fn test_missing_field_in_item() {
        let body = json!([{ "classroom_id": "c1", "teacher_id": "t1", "name": "A", "created_at": "x" }]);
        let err = decode_list::<Classroom>("/api/teacher/classrooms", body).unwrap_err();
        assert!(err.to_string().contains("item 0"));
    }

    #[test]
    fn test_decode_ok() {
        let body = json!({
            "total_concepts_studied": 1, "mastered": 1, "in_progress": 0, "not_started": 0, "concepts": []
        });
        let progress: Progress = decode_object("/api/progress", body).unwrap();
        assert_eq!(progress.mastered, 1);
    }
}
