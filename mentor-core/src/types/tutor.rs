//! Tutoring endpoint payloads (`/api/...`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form question for the tutor.
#[derive(Clone, Debug, Serialize)]
pub struct AskQuestionRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_id: Option<String>,
}

/// Tutor answer.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionResponse {
    pub answer: String,
    /// Whether retrieved course material informed the answer
    pub context_used: bool,
    pub skill_level: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExplainConceptRequest {
    pub concept_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ConceptExplanation {
    pub explanation: String,
    pub concept_name: String,
    pub skill_level: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct SolveProblemRequest {
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProblemSolution {
    pub solution: String,
    pub problem: String,
    pub skill_level: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct HintRequest {
    pub problem: String,
    /// The student's attempt so far
    pub attempt: String,
    /// 1 = gentle nudge, higher = more explicit
    pub hint_level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct HintResponse {
    pub hint: String,
    pub hint_level: u8,
    pub problem: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct PracticeRequest {
    pub concept_name: String,
    pub difficulty: String,
    pub num_problems: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PracticeSet {
    /// Generated problems as markdown text
    pub problems: String,
    pub concept_name: String,
    pub difficulty: String,
    pub num_problems: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct TestRequest {
    pub concept_name: String,
    pub difficulty: String,
    pub num_questions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_id: Option<String>,
}

/// Multiple-choice question produced by the test generator.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TestQuestion {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GeneratedTest {
    pub questions: Vec<TestQuestion>,
    pub concept_name: String,
    pub difficulty: String,
    pub num_questions: u32,
}

/// Mastery record for one concept.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ConceptMastery {
    pub concept_id: String,
    pub mastery_score: f64,
    #[serde(default)]
    pub times_practiced: Option<u32>,
    #[serde(default)]
    pub last_practiced: Option<String>,
    /// Joined concept row
    #[serde(default)]
    pub math_concepts: Option<Concept>,
}

/// Overall study progress.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Progress {
    pub total_concepts_studied: u32,
    pub mastered: u32,
    pub in_progress: u32,
    pub not_started: u32,
    pub concepts: Vec<ConceptMastery>,
}

/// Row of the concept catalog.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Concept {
    pub concept_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub topic_category: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ConceptList {
    pub concepts: Vec<Concept>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Recommendations {
    pub recommendations: Vec<Concept>,
}

#[derive(Clone, Debug, Serialize)]
pub struct UpdateMasteryRequest {
    pub concept_id: String,
    /// Clamped to `[0, 1]` by the backend
    pub mastery_score: f64,
}

/// Generic `{success, message}` acknowledgement.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Ack {
    #[serde(default)]
    pub success: Option<bool>,
    pub message: String,
    /// Any additional fields the endpoint returns
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_optional_concept_id_is_omitted() {
        let req = AskQuestionRequest {
            question: "What is a derivative?".into(),
            concept_id: None,
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"question":"What is a derivative?"}"#
        );
    }

    #[test]
    fn test_progress_requires_counts() {
        let missing = json!({ "mastered": 1, "in_progress": 0, "not_started": 0, "concepts": [] });
        assert!(serde_json::from_value::<Progress>(missing).is_err());
    }

    #[test]
    fn test_ack_keeps_extra_fields() {
        let ack: Ack = serde_json::from_value(json!({
            "message": "Example created successfully",
            "id": "ex-1"
        }))
        .unwrap();
        assert_eq!(ack.extra.get("id").and_then(|v| v.as_str()), Some("ex-1"));
        assert!(ack.success.is_none());
    }
}
