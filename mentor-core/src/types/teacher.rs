//! Teacher portal payloads (`/api/teacher/...`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSROOMS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Serialize)]
pub struct CreateClassroomRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Classroom owned by a teacher.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Classroom {
    pub classroom_id: String,
    pub teacher_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Code students use to enroll
    pub join_code: String,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Enrolled student as listed for a classroom.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ClassroomStudent {
    pub student_id: String,
    #[serde(default)]
    pub enrolled_at: Option<String>,
    #[serde(default)]
    pub users: Option<StudentIdentity>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StudentIdentity {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClassroomStudents {
    pub students: Vec<ClassroomStudent>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AnalyticsMetrics {
    pub total_students: u32,
    pub active_students: u32,
    pub total_activities_assigned: u32,
    pub completed_activities: u32,
    pub average_score: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ClassroomAnalytics {
    pub metrics: AnalyticsMetrics,
    #[serde(default)]
    pub student_performance: Vec<Value>,
    #[serde(default)]
    pub insights: Option<String>,
    #[serde(default)]
    pub struggling_concepts: Vec<Value>,
    #[serde(default)]
    pub recommendations: Vec<Value>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// DOCUMENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// JSON metadata sent alongside an uploaded file.
#[derive(Clone, Debug, Serialize)]
pub struct DocumentMetadata {
    pub classroom_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub generate_activities: bool,
    pub chunking_strategy: String,
}

impl DocumentMetadata {
    /// Metadata with the backend's defaults (semantic chunking, activities on).
    pub fn new(classroom_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            classroom_id: classroom_id.into(),
            title: title.into(),
            description: None,
            generate_activities: true,
            chunking_strategy: "semantic".into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct UploadedDocument {
    pub document_id: String,
    pub status: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Stored teacher document.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Document {
    pub document_id: String,
    pub title: String,
    #[serde(default)]
    pub classroom_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DocumentList {
    pub documents: Vec<Document>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DocumentAnalysis {
    pub document_id: String,
    /// Topics, segment counts and suggested learning path
    pub analysis: Value,
    #[serde(default)]
    pub message: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ACTIVITIES
// ═══════════════════════════════════════════════════════════════════════════════

/// Payload of the synchronous activity creation routes.
#[derive(Clone, Debug, Serialize)]
pub struct CreateActivityRequest {
    pub document_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `quiz`, `practice` and so on
    pub activity_type: String,
    pub difficulty: String,
    pub num_questions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
}

impl CreateActivityRequest {
    /// Request with the backend's defaults (intermediate, 10 questions).
    pub fn new(document_id: impl Into<String>, title: impl Into<String>, activity_type: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            title: title.into(),
            description: None,
            activity_type: activity_type.into(),
            difficulty: "intermediate".into(),
            num_questions: 10,
            settings: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreatedActivity {
    pub activity_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CreateAsyncActivityRequest {
    pub document_id: String,
    pub title: String,
    pub difficulty: String,
    pub num_questions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classroom_id: Option<String>,
    pub use_ai_generation: bool,
}

/// Handle for a background generation job.
#[derive(Clone, Debug, Deserialize)]
pub struct GenerationTask {
    pub task_id: String,
    pub activity_id: String,
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Progress of a background generation job.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GenerationStatus {
    pub status: String,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub activity_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl GenerationStatus {
    /// Returns true once the job will not change state again.
    pub fn is_finished(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "failed" | "cancelled")
    }
}

/// Learning activity row.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Activity {
    pub activity_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ActivityList {
    pub activities: Vec<Activity>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ActivityQuestions {
    pub activity: Activity,
    pub questions: Vec<Value>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AssignActivityRequest {
    pub activity_id: String,
    pub student_ids: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AssignmentResult {
    pub assigned_count: u32,
    pub total_students: u32,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct UnassignActivityRequest {
    pub activity_id: String,
    pub student_ids: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UnassignmentResult {
    pub unassigned_count: u32,
    #[serde(default)]
    pub message: Option<String>,
}

/// Parameters of `POST /activities/generate` (sent as query string).
#[derive(Clone, Debug)]
pub struct GenerateActivitiesParams {
    pub document_id: String,
    pub num_questions: u32,
    pub question_types: Vec<String>,
    /// Use the backend's structure-aware document processing
    pub use_smart_processing: bool,
}

impl GenerateActivitiesParams {
    /// Parameters with the backend's defaults (10 questions, plain processing).
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            num_questions: 10,
            question_types: Vec::new(),
            use_smart_processing: false,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct GenerateFromPromptRequest {
    pub classroom_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub prompt: String,
    pub difficulty: String,
    pub num_questions: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GeneratedActivity {
    pub activity_id: String,
    pub questions_generated: u32,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CreateConversationalActivityRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub topic: String,
    pub difficulty: String,
    pub teaching_style: String,
    pub estimated_time_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classroom_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ConversationalActivity {
    pub activity_id: String,
    pub teaching_style: String,
    #[serde(default)]
    pub estimated_time: Option<String>,
    #[serde(default)]
    pub phases: Vec<String>,
    #[serde(default)]
    pub assigned_count: u32,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub assignment_error: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// FINE-TUNING EXAMPLES
// ═══════════════════════════════════════════════════════════════════════════════

/// Create/update payload for a teaching example.
#[derive(Clone, Debug, Serialize)]
pub struct TeachingExampleInput {
    pub topic: String,
    pub teacher_input: String,
    pub desired_ai_response: String,
    pub difficulty: String,
    pub teaching_style: String,
    pub learning_objectives: Vec<String>,
    pub assessment_criteria: Vec<String>,
}

/// Stored teaching example used to steer the tutor's behavior.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TeachingExample {
    pub id: String,
    pub topic: String,
    pub teacher_input: String,
    pub desired_ai_response: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub teaching_style: Option<String>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub assessment_criteria: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TestBehaviorRequest {
    pub student_input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_examples: Option<Vec<Value>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TeachingFlowRequest {
    pub topic: String,
    pub difficulty: String,
    pub teaching_style: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_objectives: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment_criteria: Option<Vec<String>>,
}

/// Tutor reply produced by a behavior test.
#[derive(Clone, Debug, Deserialize)]
pub struct TutorReply {
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_metadata_defaults() {
        let meta = DocumentMetadata::new("class-1", "Fractions");
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["chunking_strategy"], "semantic");
        assert_eq!(value["generate_activities"], true);
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_create_activity_defaults() {
        let value = serde_json::to_value(CreateActivityRequest::new("doc-1", "Fractions quiz", "quiz")).unwrap();
        assert_eq!(value["difficulty"], "intermediate");
        assert_eq!(value["num_questions"], 10);
        assert!(value.get("settings").is_none());
    }

    #[test]
    fn test_generation_status_finished() {
        let status: GenerationStatus = serde_json::from_value(json!({ "status": "processing", "progress": 40.0 })).unwrap();
        assert!(!status.is_finished());

        let status: GenerationStatus = serde_json::from_value(json!({ "status": "completed" })).unwrap();
        assert!(status.is_finished());
    }

    #[test]
    fn test_classroom_requires_join_code() {
        let row = json!({
            "classroom_id": "c1",
            "teacher_id": "t1",
            "name": "Algebra",
            "created_at": "2024-01-01T00:00:00Z"
        });
        assert!(serde_json::from_value::<Classroom>(row).is_err());
    }
}
