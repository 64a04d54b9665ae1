//! Teacher portal endpoints.

use bytes::Bytes;
use tracing::{debug, info, instrument};

use mentor_core::constants::{LIST_TTL, PROGRESS_TTL, TEACHER_PREFIX, TEACHING_EXAMPLES_KEY, TEACHING_EXAMPLES_TTL};
use mentor_core::teacher::*;
use mentor_core::tutor::Ack;
use mentor_core::{EndpointClass, MultipartBody, RequestBody, Result};

use super::{segment, with_query};
use crate::client::{ApiClient, RequestOptions};

/// `/api/teacher` endpoints. Every call requires a token.
pub struct TeacherApi<'a> {
    client: &'a ApiClient,
}

fn path(rest: &str) -> String {
    format!("{}{}", TEACHER_PREFIX, rest)
}

fn generation(body: RequestBody) -> RequestOptions {
    RequestOptions::post(body).class(EndpointClass::Generation)
}

fn file_body(
    metadata: &DocumentMetadata,
    file_name: &str,
    content_type: &str,
    bytes: Bytes,
) -> Result<RequestBody> {
    Ok(RequestBody::Multipart(MultipartBody {
        file_name: file_name.to_string(),
        content_type: content_type.to_string(),
        bytes,
        metadata: serde_json::to_string(metadata)?,
    }))
}

impl<'a> TeacherApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn invalidate_activities(&self) {
        self.client.invalidate_prefix(&path("/activities"));
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CLASSROOMS
    // ═══════════════════════════════════════════════════════════════════════════

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_classroom(&self, request: &CreateClassroomRequest) -> Result<Classroom> {
        let classroom: Classroom = self
            .client
            .fetch(&path("/classrooms"), RequestOptions::post(RequestBody::json(request)?))
            .await?;
        self.client.invalidate_prefix(&path("/classrooms"));
        info!(classroom_id = %classroom.classroom_id, "Classroom created");
        Ok(classroom)
    }

    /// Classrooms owned by the signed-in teacher.
    #[instrument(skip(self))]
    pub async fn get_teacher_classrooms(&self) -> Result<Vec<Classroom>> {
        self.client
            .fetch_list(&path("/classrooms"), RequestOptions::get().cached(LIST_TTL))
            .await
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // DOCUMENTS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Uploads a course document as a `file` part plus a `metadata` JSON part.
    #[instrument(skip(self, metadata, bytes), fields(classroom_id = %metadata.classroom_id))]
    pub async fn upload_document(
        &self,
        metadata: &DocumentMetadata,
        file_name: &str,
        content_type: &str,
        bytes: impl Into<Bytes>,
    ) -> Result<UploadedDocument> {
        let body = file_body(metadata, file_name, content_type, bytes.into())?;
        let uploaded: UploadedDocument = self
            .client
            .fetch(&path("/documents/upload"), generation(body))
            .await?;
        self.client.invalidate_prefix(&path("/documents"));
        info!(document_id = %uploaded.document_id, "Document uploaded");
        Ok(uploaded)
    }

    #[instrument(skip(self))]
    pub async fn get_classroom_documents(&self, classroom_id: &str) -> Result<DocumentList> {
        let endpoint = path(&format!("/documents/{}", segment(classroom_id)));
        self.client
            .fetch(&endpoint, RequestOptions::get().cached(LIST_TTL))
            .await
    }

    /// Runs the backend's LLM analysis over an uploaded document.
    #[instrument(skip(self))]
    pub async fn process_document(&self, document_id: &str) -> Result<DocumentAnalysis> {
        let endpoint = path(&format!("/documents/{}/process-intelligent", segment(document_id)));
        self.client
            .fetch(&endpoint, generation(RequestBody::Empty))
            .await
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACTIVITIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Creates an activity record without questions; they are added or
    /// generated later.
    #[instrument(skip(self, request), fields(document_id = %request.document_id))]
    pub async fn create_activity(&self, request: &CreateActivityRequest) -> Result<CreatedActivity> {
        self.create_activity_at("/activities/create", request).await
    }

    /// Creates an activity without any AI processing of the document.
    #[instrument(skip(self, request), fields(document_id = %request.document_id))]
    pub async fn create_activity_simple(&self, request: &CreateActivityRequest) -> Result<CreatedActivity> {
        self.create_activity_at("/activities/create-simple", request).await
    }

    async fn create_activity_at(&self, route: &str, request: &CreateActivityRequest) -> Result<CreatedActivity> {
        let created: CreatedActivity = self
            .client
            .fetch(&path(route), RequestOptions::post(RequestBody::json(request)?))
            .await?;
        self.invalidate_activities();
        info!(activity_id = %created.activity_id, "Activity created");
        Ok(created)
    }

    /// Starts background generation; poll with [`get_generation_status`](Self::get_generation_status).
    #[instrument(skip(self, request), fields(document_id = %request.document_id))]
    pub async fn create_activity_async(&self, request: &CreateAsyncActivityRequest) -> Result<GenerationTask> {
        let task: GenerationTask = self
            .client
            .fetch(&path("/activities/create-async"), generation(RequestBody::json(request)?))
            .await?;
        self.invalidate_activities();
        info!(task_id = %task.task_id, "Activity generation started");
        Ok(task)
    }

    #[instrument(skip(self))]
    pub async fn get_generation_status(&self, task_id: &str) -> Result<GenerationStatus> {
        let endpoint = path(&format!("/activities/generation-status/{}", segment(task_id)));
        let status: GenerationStatus = self
            .client
            .fetch(&endpoint, RequestOptions::get().class(EndpointClass::Polling))
            .await?;
        if status.is_finished() {
            // A finished job changes the classroom's activity list
            self.invalidate_activities();
        }
        Ok(status)
    }

    #[instrument(skip(self))]
    pub async fn cancel_generation(&self, activity_id: &str) -> Result<Ack> {
        let endpoint = path(&format!("/activities/{}/cancel", segment(activity_id)));
        let ack = self
            .client
            .fetch(&endpoint, RequestOptions::post(RequestBody::Empty))
            .await?;
        self.invalidate_activities();
        Ok(ack)
    }

    #[instrument(skip(self))]
    pub async fn get_activity_questions(&self, activity_id: &str) -> Result<ActivityQuestions> {
        let endpoint = path(&format!("/activities/{}/questions", segment(activity_id)));
        self.client.fetch(&endpoint, RequestOptions::get()).await
    }

    /// Deletes an activity. Without `force` the backend refuses when students
    /// have already started it.
    #[instrument(skip(self))]
    pub async fn delete_activity(&self, activity_id: &str, force: bool) -> Result<Ack> {
        let endpoint = with_query(
            &path(&format!("/activities/{}", segment(activity_id))),
            [("force", force.then(|| "true".to_string()))],
        );
        let ack = self.client.fetch(&endpoint, RequestOptions::delete()).await?;
        self.invalidate_activities();
        info!("Activity deleted");
        Ok(ack)
    }

    #[instrument(skip(self, request), fields(activity_id = %request.activity_id))]
    pub async fn assign_activity(&self, request: &AssignActivityRequest) -> Result<AssignmentResult> {
        let result: AssignmentResult = self
            .client
            .fetch(&path("/activities/assign"), RequestOptions::post(RequestBody::json(request)?))
            .await?;
        self.invalidate_activities();
        info!(assigned = result.assigned_count, "Activity assigned");
        Ok(result)
    }

    #[instrument(skip(self, request), fields(activity_id = %request.activity_id))]
    pub async fn unassign_activity(&self, request: &UnassignActivityRequest) -> Result<UnassignmentResult> {
        let result: UnassignmentResult = self
            .client
            .fetch(&path("/activities/unassign"), RequestOptions::post(RequestBody::json(request)?))
            .await?;
        self.invalidate_activities();
        info!(unassigned = result.unassigned_count, "Activity unassigned");
        Ok(result)
    }

    #[instrument(skip(self))]
    pub async fn get_classroom_activities(&self, classroom_id: &str) -> Result<ActivityList> {
        let endpoint = path(&format!("/activities/{}", segment(classroom_id)));
        self.client
            .fetch(&endpoint, RequestOptions::get().cached(LIST_TTL))
            .await
    }

    /// Generates an activity from a processed document.
    #[instrument(skip(self, params), fields(document_id = %params.document_id))]
    pub async fn generate_activities(&self, params: &GenerateActivitiesParams) -> Result<GeneratedActivity> {
        let mut query = vec![
            ("document_id", Some(params.document_id.clone())),
            ("num_questions", Some(params.num_questions.to_string())),
        ];
        query.extend(params.question_types.iter().map(|t| ("question_types", Some(t.clone()))));
        query.push(("use_smart_processing", Some(params.use_smart_processing.to_string())));

        let endpoint = with_query(&path("/activities/generate"), query);
        let generated: GeneratedActivity = self
            .client
            .fetch(&endpoint, generation(RequestBody::Empty))
            .await?;
        self.invalidate_activities();
        info!(activity_id = %generated.activity_id, questions = generated.questions_generated, "Activity generated");
        Ok(generated)
    }

    #[instrument(skip(self, request), fields(classroom_id = %request.classroom_id))]
    pub async fn generate_from_prompt(&self, request: &GenerateFromPromptRequest) -> Result<GeneratedActivity> {
        let generated: GeneratedActivity = self
            .client
            .fetch(&path("/activities/generate-from-prompt"), generation(RequestBody::json(request)?))
            .await?;
        self.invalidate_activities();
        info!(activity_id = %generated.activity_id, "Activity generated from prompt");
        Ok(generated)
    }

    #[instrument(skip(self, request), fields(topic = %request.topic))]
    pub async fn create_conversational_activity(
        &self,
        request: &CreateConversationalActivityRequest,
    ) -> Result<ConversationalActivity> {
        let created: ConversationalActivity = self
            .client
            .fetch(&path("/activities/conversational"), generation(RequestBody::json(request)?))
            .await?;
        self.invalidate_activities();
        info!(activity_id = %created.activity_id, "Conversational activity created");
        Ok(created)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INSIGHT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Classroom metrics over `time_range` (`week` when unset).
    #[instrument(skip(self))]
    pub async fn get_classroom_analytics(
        &self,
        classroom_id: &str,
        time_range: Option<&str>,
    ) -> Result<ClassroomAnalytics> {
        let endpoint = with_query(
            &path(&format!("/analytics/{}", segment(classroom_id))),
            [("time_range", time_range.map(str::to_string))],
        );
        self.client
            .fetch(&endpoint, RequestOptions::get().cached(PROGRESS_TTL))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_classroom_students(&self, classroom_id: &str) -> Result<ClassroomStudents> {
        let endpoint = path(&format!("/students/{}", segment(classroom_id)));
        self.client
            .fetch(&endpoint, RequestOptions::get().cached(PROGRESS_TTL))
            .await
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FINE-TUNING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Teaching examples, served from the persistent cache while fresh.
    #[instrument(skip(self))]
    pub async fn get_teaching_examples(&self) -> Result<Vec<TeachingExample>> {
        let persistent = self.client.persistent();
        if let Some(examples) = persistent.get::<Vec<TeachingExample>>(TEACHING_EXAMPLES_KEY).await {
            debug!(count = examples.len(), "Teaching examples from persistent cache");
            return Ok(examples);
        }

        let epoch = persistent.epoch();
        let examples: Vec<TeachingExample> = self
            .client
            .fetch_list(&path("/examples"), RequestOptions::get())
            .await?;
        persistent
            .put_if_current(TEACHING_EXAMPLES_KEY, &examples, TEACHING_EXAMPLES_TTL, epoch)
            .await;
        Ok(examples)
    }

    /// Drops the stored examples and detaches any listing still in flight.
    async fn forget_examples(&self) {
        self.client.invalidate(&path("/examples"));
        self.client.persistent().clear(TEACHING_EXAMPLES_KEY).await;
    }

    #[instrument(skip(self, example), fields(topic = %example.topic))]
    pub async fn create_teaching_example(&self, example: &TeachingExampleInput) -> Result<Ack> {
        let ack = self
            .client
            .fetch(&path("/examples"), RequestOptions::post(RequestBody::json(example)?))
            .await?;
        self.forget_examples().await;
        info!("Teaching example created");
        Ok(ack)
    }

    #[instrument(skip(self, example))]
    pub async fn update_teaching_example(&self, example_id: &str, example: &TeachingExampleInput) -> Result<Ack> {
        let endpoint = path(&format!("/examples/{}", segment(example_id)));
        let ack = self
            .client
            .fetch(&endpoint, RequestOptions::put(RequestBody::json(example)?))
            .await?;
        self.forget_examples().await;
        info!("Teaching example updated");
        Ok(ack)
    }

    #[instrument(skip(self))]
    pub async fn delete_teaching_example(&self, example_id: &str) -> Result<Ack> {
        let endpoint = path(&format!("/examples/{}", segment(example_id)));
        let ack = self.client.fetch(&endpoint, RequestOptions::delete()).await?;
        self.forget_examples().await;
        info!("Teaching example deleted");
        Ok(ack)
    }

    /// Asks the tutor to answer `student_input` as steered by the examples.
    #[instrument(skip(self, request))]
    pub async fn test_behavior(&self, request: &TestBehaviorRequest) -> Result<TutorReply> {
        self.client
            .fetch(&path("/test-behavior"), generation(RequestBody::json(request)?))
            .await
    }

    #[instrument(skip(self, request), fields(topic = %request.topic))]
    pub async fn test_teaching_flow(&self, request: &TeachingFlowRequest) -> Result<TutorReply> {
        self.client
            .fetch(&path("/test-teaching-flow"), generation(RequestBody::json(request)?))
            .await
    }
}
