//! Tutoring endpoints.

use tracing::{info, instrument};

use mentor_core::constants::{CONCEPT_TTL, PROGRESS_TTL, TUTOR_PREFIX};
use mentor_core::tutor::*;
use mentor_core::{EndpointClass, RequestBody, Result};

use super::{segment, with_query};
use crate::client::{ApiClient, RequestOptions};

/// `/api` endpoints: question answering, practice and progress.
pub struct TutorApi<'a> {
    client: &'a ApiClient,
}

fn path(rest: &str) -> String {
    format!("{}{}", TUTOR_PREFIX, rest)
}

/// AI calls work for guests too; the token only personalizes the answer.
fn generation(body: RequestBody) -> RequestOptions {
    RequestOptions::post(body)
        .class(EndpointClass::Generation)
        .optional_auth()
}

impl<'a> TutorApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // GENERATION
    // ═══════════════════════════════════════════════════════════════════════════

    #[instrument(skip(self, request))]
    pub async fn ask_question(&self, request: &AskQuestionRequest) -> Result<QuestionResponse> {
        self.client
            .fetch(&path("/ask-question"), generation(RequestBody::json(request)?))
            .await
    }

    #[instrument(skip(self, request))]
    pub async fn explain_concept(&self, request: &ExplainConceptRequest) -> Result<ConceptExplanation> {
        self.client
            .fetch(&path("/explain-concept"), generation(RequestBody::json(request)?))
            .await
    }

    #[instrument(skip(self, request))]
    pub async fn solve_problem(&self, request: &SolveProblemRequest) -> Result<ProblemSolution> {
        self.client
            .fetch(&path("/solve-problem"), generation(RequestBody::json(request)?))
            .await
    }

    #[instrument(skip(self, request))]
    pub async fn get_hint(&self, request: &HintRequest) -> Result<HintResponse> {
        self.client
            .fetch(&path("/get-hint"), generation(RequestBody::json(request)?))
            .await
    }

    #[instrument(skip(self, request))]
    pub async fn generate_practice(&self, request: &PracticeRequest) -> Result<PracticeSet> {
        self.client
            .fetch(&path("/generate-practice"), generation(RequestBody::json(request)?))
            .await
    }

    #[instrument(skip(self, request))]
    pub async fn generate_test(&self, request: &TestRequest) -> Result<GeneratedTest> {
        self.client
            .fetch(&path("/generate-test"), generation(RequestBody::json(request)?))
            .await
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PROGRESS & CATALOG
    // ═══════════════════════════════════════════════════════════════════════════

    #[instrument(skip(self))]
    pub async fn get_progress(&self) -> Result<Progress> {
        self.client
            .fetch(&path("/progress"), RequestOptions::get().cached(PROGRESS_TTL))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_recommendations(&self, limit: Option<u32>) -> Result<Recommendations> {
        let endpoint = with_query(&path("/recommendations"), [("limit", limit.map(|l| l.to_string()))]);
        self.client
            .fetch(&endpoint, RequestOptions::get().cached(PROGRESS_TTL))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_concept(&self, concept_id: &str) -> Result<Concept> {
        let endpoint = path(&format!("/concept/{}", segment(concept_id)));
        self.client
            .fetch(&endpoint, RequestOptions::get().cached(CONCEPT_TTL).optional_auth())
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_concepts(&self, topic: Option<&str>) -> Result<ConceptList> {
        let endpoint = with_query(&path("/concepts"), [("topic", topic.map(str::to_string))]);
        self.client
            .fetch(&endpoint, RequestOptions::get().cached(CONCEPT_TTL).optional_auth())
            .await
    }

    /// Records a mastery score and drops cached progress and recommendations.
    #[instrument(skip(self, request), fields(concept_id = %request.concept_id))]
    pub async fn update_mastery(&self, request: &UpdateMasteryRequest) -> Result<Ack> {
        let ack = self
            .client
            .fetch(&path("/update-mastery"), RequestOptions::post(RequestBody::json(request)?))
            .await?;
        self.client.invalidate_prefix(&path("/progress"));
        self.client.invalidate_prefix(&path("/recommendations"));
        info!("Mastery updated");
        Ok(ack)
    }
}
