//! Student portal endpoints.

use tracing::{info, instrument};

use mentor_core::constants::{LIST_TTL, PROGRESS_TTL, STUDENT_PREFIX};
use mentor_core::student::*;
use mentor_core::tutor::Ack;
use mentor_core::{EndpointClass, RequestBody, Result};

use super::{segment, with_query};
use crate::client::{ApiClient, RequestOptions};

/// `/api/student` endpoints. Every call requires a token.
pub struct StudentApi<'a> {
    client: &'a ApiClient,
}

fn path(rest: &str) -> String {
    format!("{}{}", STUDENT_PREFIX, rest)
}

fn generation(body: RequestBody) -> RequestOptions {
    RequestOptions::post(body).class(EndpointClass::Generation)
}

impl<'a> StudentApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn invalidate_activities(&self) {
        self.client.invalidate_prefix(&path("/activities"));
    }

    fn invalidate_progress(&self) {
        self.client.invalidate_prefix(&path("/progress"));
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CLASSROOMS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Enrolls with a join code. The backend assigns the classroom's existing
    /// activities as part of the join.
    #[instrument(skip(self, request))]
    pub async fn join_classroom(&self, request: &JoinClassroomRequest) -> Result<JoinResult> {
        let joined: JoinResult = self
            .client
            .fetch(&path("/classrooms/join"), RequestOptions::post(RequestBody::json(request)?))
            .await?;
        self.client.invalidate_prefix(&path("/classrooms"));
        self.invalidate_activities();
        info!(classroom_id = %joined.classroom_id, "Joined classroom");
        Ok(joined)
    }

    #[instrument(skip(self))]
    pub async fn get_student_classrooms(&self) -> Result<Vec<Enrollment>> {
        self.client
            .fetch_list(&path("/classrooms"), RequestOptions::get().cached(LIST_TTL))
            .await
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACTIVITIES
    // ═══════════════════════════════════════════════════════════════════════════

    #[instrument(skip(self))]
    pub async fn get_student_activities(&self, filter: &ActivityFilter) -> Result<StudentActivityList> {
        let endpoint = with_query(
            &path("/activities"),
            [
                ("classroom_id", filter.classroom_id.clone()),
                ("status", filter.status.clone()),
                ("sync", filter.sync.then(|| "true".to_string())),
            ],
        );
        self.client
            .fetch(&endpoint, RequestOptions::get().cached(LIST_TTL))
            .await
    }

    /// Activity with its questions; answers are hidden until completion.
    #[instrument(skip(self))]
    pub async fn get_activity_details(&self, activity_id: &str) -> Result<ActivityDetails> {
        let endpoint = path(&format!("/activities/{}", segment(activity_id)));
        self.client.fetch(&endpoint, RequestOptions::get()).await
    }

    #[instrument(skip(self))]
    pub async fn start_activity(&self, activity_id: &str) -> Result<StartedActivity> {
        let endpoint = path(&format!("/activities/{}/start", segment(activity_id)));
        let started: StartedActivity = self
            .client
            .fetch(&endpoint, RequestOptions::post(RequestBody::Empty))
            .await?;
        self.invalidate_activities();
        info!(student_activity_id = %started.student_activity_id, "Activity started");
        Ok(started)
    }

    #[instrument(skip(self, request))]
    pub async fn submit_activity(
        &self,
        student_activity_id: &str,
        request: &SubmitActivityRequest,
    ) -> Result<Assessment> {
        let endpoint = path(&format!("/activities/{}/submit", segment(student_activity_id)));
        let assessment: Assessment = self
            .client
            .fetch(&endpoint, RequestOptions::post(RequestBody::json(request)?))
            .await?;
        self.invalidate_activities();
        self.invalidate_progress();
        info!(score = assessment.score, outcome = %assessment.assessment, "Activity submitted");
        Ok(assessment)
    }

    #[instrument(skip(self))]
    pub async fn get_student_progress(&self) -> Result<StudentProgress> {
        self.client
            .fetch(&path("/progress"), RequestOptions::get().cached(PROGRESS_TTL))
            .await
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CONVERSATIONAL ACTIVITIES
    // ═══════════════════════════════════════════════════════════════════════════

    #[instrument(skip(self, request), fields(activity_id = %request.activity_id))]
    pub async fn conversational_tutor(&self, request: &ConversationalTutorRequest) -> Result<TutorTurn> {
        self.client
            .fetch(&path("/activities/conversational-tutor"), generation(RequestBody::json(request)?))
            .await
    }

    #[instrument(skip(self, request))]
    pub async fn save_conversation(
        &self,
        student_activity_id: &str,
        request: &SaveConversationRequest,
    ) -> Result<Ack> {
        let endpoint = path(&format!("/activities/{}/save-conversation", segment(student_activity_id)));
        self.client
            .fetch(&endpoint, RequestOptions::post(RequestBody::json(request)?))
            .await
    }

    #[instrument(skip(self, request))]
    pub async fn complete_conversational(
        &self,
        student_activity_id: &str,
        request: &CompleteConversationRequest,
    ) -> Result<Ack> {
        let endpoint = path(&format!(
            "/activities/{}/complete-conversational",
            segment(student_activity_id)
        ));
        let ack = self
            .client
            .fetch(&endpoint, RequestOptions::post(RequestBody::json(request)?))
            .await?;
        self.invalidate_activities();
        self.invalidate_progress();
        info!("Conversational activity completed");
        Ok(ack)
    }

    #[instrument(skip(self))]
    pub async fn get_activity_introduction(&self, activity_id: &str) -> Result<Introduction> {
        let endpoint = path(&format!("/activities/{}/introduction", segment(activity_id)));
        self.client
            .fetch(&endpoint, RequestOptions::get().class(EndpointClass::Generation))
            .await
    }

    #[instrument(skip(self, request), fields(phase = %request.current_phase))]
    pub async fn phase_response(&self, request: &PhaseResponseRequest) -> Result<PhaseResponse> {
        self.client
            .fetch(&path("/activities/phase-response"), generation(RequestBody::json(request)?))
            .await
    }

    #[instrument(skip(self, request), fields(activity_id = %request.activity_id))]
    pub async fn assess_understanding(
        &self,
        request: &AssessUnderstandingRequest,
    ) -> Result<UnderstandingAssessment> {
        self.client
            .fetch(&path("/activities/assess-understanding"), generation(RequestBody::json(request)?))
            .await
    }
}
