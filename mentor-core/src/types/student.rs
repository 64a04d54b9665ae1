//! Student portal payloads (`/api/student/...`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::teacher::{Activity, Classroom};

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSROOMS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Serialize)]
pub struct JoinClassroomRequest {
    pub join_code: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct JoinResult {
    pub message: String,
    pub classroom_id: String,
    pub classroom_name: String,
    #[serde(default)]
    pub activities_assigned: u32,
}

/// Enrollment row with the joined classroom.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Enrollment {
    pub classroom_id: String,
    pub student_id: String,
    #[serde(default)]
    pub enrolled_at: Option<String>,
    #[serde(default)]
    pub classrooms: Option<Classroom>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ACTIVITIES
// ═══════════════════════════════════════════════════════════════════════════════

/// Filters for the student activity list.
#[derive(Clone, Debug, Default)]
pub struct ActivityFilter {
    pub classroom_id: Option<String>,
    pub status: Option<String>,
    /// Ask the backend to assign missing classroom activities first
    pub sync: bool,
}

/// Joined learning-activity columns on a student activity.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ActivitySummary {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub activity_type: Option<String>,
}

/// A student's assignment of a learning activity.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StudentActivity {
    pub student_activity_id: String,
    pub activity_id: String,
    pub status: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub total_questions: Option<u32>,
    #[serde(default)]
    pub learning_activities: Option<ActivitySummary>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StudentActivityList {
    pub activities: Vec<StudentActivity>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ActivityDetails {
    pub activity: Activity,
    pub student_activity: Value,
    /// Questions; correct answers are stripped until completion
    pub questions: Vec<Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StartedActivity {
    pub student_activity_id: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct SubmitActivityRequest {
    /// Answers keyed by question id
    pub responses: BTreeMap<String, Value>,
}

/// Grading outcome of a submission.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Assessment {
    /// Percentage score
    pub score: f64,
    pub correct_count: u32,
    pub total_questions: u32,
    /// `pass`, `fail` or `needs_review`
    pub assessment: String,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub recommendations: Option<Vec<String>>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StudentProgress {
    pub recent_activities: Vec<Value>,
    pub progress_snapshots: Vec<Value>,
    pub overall_understanding_score: f64,
    #[serde(default)]
    pub mastery_summary: Value,
    #[serde(default)]
    pub learning_path: Vec<Value>,
    #[serde(default)]
    pub teacher_feedback: Vec<Value>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONVERSATIONAL ACTIVITIES
// ═══════════════════════════════════════════════════════════════════════════════

/// One turn of a tutoring conversation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// `user` or `assistant`
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ConversationalTutorRequest {
    pub activity_id: String,
    pub conversation_history: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question_index: Option<u32>,
    /// `teaching`, `ready_check`, `questioning` or `review`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teaching_phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Value>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TutorTurn {
    pub response: String,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub next_question_index: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SaveConversationRequest {
    pub conversation_history: Vec<ChatMessage>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CompleteConversationRequest {
    pub conversation_history: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Introduction {
    pub introduction: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct PhaseResponseRequest {
    pub activity_id: String,
    pub student_input: String,
    /// `introduction`, `teach`, `practice` or `evaluate`
    pub current_phase: String,
    pub conversation_history: Vec<ChatMessage>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PhaseResponse {
    pub response: String,
    pub next_phase: String,
    pub current_phase: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct AssessUnderstandingRequest {
    pub activity_id: String,
    pub conversation_history: Vec<ChatMessage>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UnderstandingAssessment {
    /// 0 to 100
    pub score: f64,
    pub feedback: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enrollment_with_nested_classroom() {
        let row = json!({
            "classroom_id": "c1",
            "student_id": "s1",
            "enrolled_at": "2024-02-01",
            "classrooms": {
                "classroom_id": "c1",
                "teacher_id": "t1",
                "name": "Geometry",
                "join_code": "ABC123",
                "created_at": "2024-01-01"
            }
        });
        let enrollment: Enrollment = serde_json::from_value(row).unwrap();
        assert_eq!(enrollment.classrooms.unwrap().name, "Geometry");
    }

    #[test]
    fn test_chat_message_roles() {
        assert_eq!(ChatMessage::user("hi").role, "user");
        assert_eq!(ChatMessage::assistant("hello").role, "assistant");
    }

    #[test]
    fn test_submit_request_orders_responses() {
        let mut responses = BTreeMap::new();
        responses.insert("q2".to_string(), json!("b"));
        responses.insert("q1".to_string(), json!("a"));
        let body = serde_json::to_string(&SubmitActivityRequest { responses }).unwrap();
        assert_eq!(body, r#"{"responses":{"q1":"a","q2":"b"}}"#);
    }
}
