//! MathMentor CLI
//!
//! Command-line front end for the MathMentor tutoring backend: ask the tutor,
//! manage classrooms and activities as a teacher, or work through assigned
//! activities as a student.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mentor_cache::{FileStore, MemoryStore};
use mentor_client::{ApiClient, ClientConfig, ReqwestTransport, StaticSession, STUDENT_ROLES, TEACHER_ROLES};
use mentor_core::constants::{ENV_API_URL, STORE_FILE_NAME};
use mentor_core::student::{ActivityFilter, JoinClassroomRequest, SubmitActivityRequest};
use mentor_core::teacher::{
    AssignActivityRequest, CreateAsyncActivityRequest, CreateClassroomRequest, DocumentMetadata,
    GenerateActivitiesParams, GenerateFromPromptRequest, TestBehaviorRequest, UnassignActivityRequest,
};
use mentor_core::tutor::{
    AskQuestionRequest, ExplainConceptRequest, HintRequest, PracticeRequest, SolveProblemRequest, TestRequest,
    UpdateMasteryRequest,
};
use mentor_core::{KeyValueStore, Role};

/// Interval between generation status polls.
const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// MathMentor - AI math tutoring from the terminal
#[derive(Parser)]
#[command(name = "mentor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SessionArgs {
    /// Backend base URL
    #[arg(long, global = true, env = ENV_API_URL)]
    api_url: Option<String>,

    /// Bearer token from the auth provider
    #[arg(long, global = true, env = "MENTOR_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Role of the signed-in user (student, teacher, admin)
    #[arg(long, global = true, env = "MENTOR_ROLE")]
    role: Option<Role>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the AI tutor and track study progress
    Tutor {
        #[command(subcommand)]
        command: TutorCommand,
    },

    /// Teacher portal: classrooms, documents and activities
    Teacher {
        #[command(subcommand)]
        command: TeacherCommand,
    },

    /// Student portal: classrooms, activities and progress
    Student {
        #[command(subcommand)]
        command: StudentCommand,
    },
}

#[derive(Subcommand)]
enum TutorCommand {
    /// Ask a free-form question
    Ask {
        question: String,
        #[arg(long)]
        concept: Option<String>,
    },
    /// Explain a concept
    Explain { concept: String },
    /// Solve a problem step by step
    Solve { problem: String },
    /// Get a hint for a problem
    Hint {
        problem: String,
        /// Your attempt so far
        #[arg(short, long, default_value = "")]
        attempt: String,
        /// 1 = gentle nudge, higher = more explicit
        #[arg(short, long, default_value = "1")]
        level: u8,
    },
    /// Generate practice problems
    Practice {
        concept: String,
        #[arg(short, long, default_value = "medium")]
        difficulty: String,
        #[arg(short = 'n', long, default_value = "5")]
        count: u32,
    },
    /// Generate a test
    Test {
        concept: String,
        #[arg(short, long, default_value = "medium")]
        difficulty: String,
        #[arg(short = 'n', long, default_value = "5")]
        count: u32,
    },
    /// Show study progress
    Progress,
    /// Suggest concepts to study next
    Recommend {
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show one concept
    Concept { id: String },
    /// List concepts
    Concepts {
        #[arg(short, long)]
        topic: Option<String>,
    },
    /// Record a mastery score (0 to 1)
    Mastery { concept_id: String, score: f64 },
}

#[derive(Subcommand)]
enum TeacherCommand {
    /// List your classrooms
    Classrooms,
    /// Create a classroom
    CreateClassroom {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Upload a course document
    Upload {
        classroom_id: String,
        file: PathBuf,
        #[arg(short, long)]
        title: Option<String>,
    },
    /// List a classroom's documents
    Documents { classroom_id: String },
    /// Analyze an uploaded document
    Process { document_id: String },
    /// Generate an activity from a document
    Generate {
        document_id: String,
        #[arg(short = 'n', long, default_value = "10")]
        questions: u32,
        /// Question types (repeatable)
        #[arg(long = "type")]
        question_types: Vec<String>,
        /// Use structure-aware document processing
        #[arg(long)]
        smart: bool,
    },
    /// Generate an activity from a prompt
    GeneratePrompt {
        classroom_id: String,
        title: String,
        prompt: String,
        #[arg(short, long, default_value = "medium")]
        difficulty: String,
        #[arg(short = 'n', long, default_value = "10")]
        questions: u32,
    },
    /// Start background generation of an activity
    CreateAsync {
        document_id: String,
        title: String,
        #[arg(short, long, default_value = "medium")]
        difficulty: String,
        #[arg(short = 'n', long, default_value = "10")]
        questions: u32,
        #[arg(long)]
        classroom_id: Option<String>,
        /// Poll until the job finishes
        #[arg(short, long)]
        wait: bool,
    },
    /// Show a generation job's status
    Status { task_id: String },
    /// List a classroom's activities
    Activities { classroom_id: String },
    /// Show an activity's questions
    Questions { activity_id: String },
    /// Assign an activity to students
    Assign {
        activity_id: String,
        #[arg(required = true)]
        student_ids: Vec<String>,
    },
    /// Remove an activity from students
    Unassign {
        activity_id: String,
        #[arg(required = true)]
        student_ids: Vec<String>,
    },
    /// Delete an activity
    DeleteActivity {
        activity_id: String,
        /// Delete even if students have started it
        #[arg(long)]
        force: bool,
    },
    /// Show classroom analytics
    Analytics {
        classroom_id: String,
        #[arg(long)]
        range: Option<String>,
    },
    /// List a classroom's students
    Students { classroom_id: String },
    /// List teaching examples
    Examples,
    /// Try the tutor's behavior on a student input
    TestBehavior { input: String },
}

#[derive(Subcommand)]
enum StudentCommand {
    /// Join a classroom with a code
    Join { code: String },
    /// List your classrooms
    Classrooms,
    /// List your activities
    Activities {
        #[arg(long)]
        classroom_id: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Pick up activities assigned since you joined
        #[arg(long)]
        sync: bool,
    },
    /// Show an activity
    Details { activity_id: String },
    /// Start an activity
    Start { activity_id: String },
    /// Submit answers (`--answer q1=42`, repeatable)
    Submit {
        student_activity_id: String,
        #[arg(short, long = "answer", value_parser = parse_answer)]
        answers: Vec<(String, Value)>,
    },
    /// Show your progress
    Progress,
    /// Show the tutor's introduction for an activity
    Intro { activity_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "mentor=debug,mentor_client=debug,mentor_cache=debug,info"
    } else {
        "mentor=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = connect(&cli.session).await?;
    let outcome = match cli.command {
        Commands::Tutor { command } => cmd_tutor(&client, command).await,
        Commands::Teacher { command } => {
            client.require_role(TEACHER_ROLES).await?;
            cmd_teacher(&client, command).await
        }
        Commands::Student { command } => {
            client.require_role(STUDENT_ROLES).await?;
            cmd_student(&client, command).await
        }
    };
    client.dispose();
    outcome
}

/// Builds the client from the environment plus command-line overrides.
async fn connect(args: &SessionArgs) -> Result<ApiClient> {
    let mut config = ClientConfig::from_env().context("Invalid configuration")?;
    if let Some(url) = &args.api_url {
        config.base_url = url.clone();
        config.validate().context("Invalid --api-url")?;
    }

    let store: Arc<dyn KeyValueStore> = match &config.cache_dir {
        Some(dir) => {
            let path = dir.join(STORE_FILE_NAME);
            Arc::new(
                FileStore::open(&path)
                    .await
                    .with_context(|| format!("Failed to open cache store {}", path.display()))?,
            )
        }
        None => Arc::new(MemoryStore::new()),
    };

    debug!(base_url = %config.base_url, role = ?args.role, "Connecting");
    let session = StaticSession::new(args.token.clone(), args.role);
    let client = ApiClient::new(config, Arc::new(ReqwestTransport::new()?), Arc::new(session), store)?;
    Ok(client)
}

/// Awaits a long-running call behind a spinner.
async fn with_spinner<T>(message: &str, call: impl Future<Output = mentor_core::Result<T>>) -> Result<T> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} ({elapsed})")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = call.await;
    pb.finish_and_clear();
    Ok(result?)
}

fn parse_answer(raw: &str) -> std::result::Result<(String, Value), String> {
    let (question, answer) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected QUESTION_ID=ANSWER, got '{raw}'"))?;
    let value = serde_json::from_str(answer).unwrap_or_else(|_| Value::String(answer.to_string()));
    Ok((question.trim().to_string(), value))
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

fn heading(text: &str) {
    println!("\n{}", text.green().bold());
}

// ═══════════════════════════════════════════════════════════════════════════════
// TUTOR
// ═══════════════════════════════════════════════════════════════════════════════

async fn cmd_tutor(client: &ApiClient, command: TutorCommand) -> Result<()> {
    let tutor = client.tutor();
    match command {
        TutorCommand::Ask { question, concept } => {
            let request = AskQuestionRequest { question, concept_id: concept };
            let answer = with_spinner("Thinking...", tutor.ask_question(&request)).await?;
            heading("Answer:");
            println!("{}", answer.answer);
            println!("\n   {} {}", "Skill level:".cyan(), answer.skill_level);
            if answer.context_used {
                println!("   {}", "Course material was used".dimmed());
            }
        }
        TutorCommand::Explain { concept } => {
            let request = ExplainConceptRequest { concept_name: concept, concept_id: None };
            let explanation = with_spinner("Explaining...", tutor.explain_concept(&request)).await?;
            heading(&explanation.concept_name);
            println!("{}", explanation.explanation);
        }
        TutorCommand::Solve { problem } => {
            let request = SolveProblemRequest { problem, concept_id: None };
            let solution = with_spinner("Solving...", tutor.solve_problem(&request)).await?;
            heading("Solution:");
            println!("{}", solution.solution);
        }
        TutorCommand::Hint { problem, attempt, level } => {
            let request = HintRequest { problem, attempt, hint_level: level, concept_id: None };
            let hint = with_spinner("Finding a hint...", tutor.get_hint(&request)).await?;
            heading(&format!("Hint (level {}):", hint.hint_level));
            println!("{}", hint.hint);
        }
        TutorCommand::Practice { concept, difficulty, count } => {
            let request = PracticeRequest {
                concept_name: concept,
                difficulty,
                num_problems: count,
                concept_id: None,
            };
            let set = with_spinner("Generating problems...", tutor.generate_practice(&request)).await?;
            heading(&format!("{} practice problems ({}):", set.concept_name, set.difficulty));
            println!("{}", set.problems);
        }
        TutorCommand::Test { concept, difficulty, count } => {
            let request = TestRequest {
                concept_name: concept,
                difficulty,
                num_questions: count,
                concept_id: None,
            };
            let test = with_spinner("Generating test...", tutor.generate_test(&request)).await?;
            heading(&format!("{} test ({}):", test.concept_name, test.difficulty));
            for (i, question) in test.questions.iter().enumerate() {
                println!("{}. {}", i + 1, question.question);
                for option in &question.options {
                    println!("     - {}", option);
                }
            }
        }
        TutorCommand::Progress => {
            let progress = tutor.get_progress().await?;
            heading("Progress:");
            println!("   {} {}", "Studied:".cyan(), progress.total_concepts_studied);
            println!("   {} {}", "Mastered:".green(), progress.mastered);
            println!("   {} {}", "In progress:".yellow(), progress.in_progress);
            println!("   {} {}", "Not started:".dimmed(), progress.not_started);
            for concept in &progress.concepts {
                let name = concept
                    .math_concepts
                    .as_ref()
                    .map(|c| c.name.as_str())
                    .unwrap_or(&concept.concept_id);
                println!("   {:<32} {:>5.1}%", name, concept.mastery_score * 100.0);
            }
        }
        TutorCommand::Recommend { limit } => {
            let recommendations = tutor.get_recommendations(limit).await?;
            heading("Study next:");
            for concept in &recommendations.recommendations {
                println!("   {} {}", concept.concept_id.cyan(), concept.name);
            }
        }
        TutorCommand::Concept { id } => {
            let concept = tutor.get_concept(&id).await?;
            heading(&concept.name);
            if let Some(description) = &concept.description {
                println!("{}", description);
            }
            if !concept.prerequisites.is_empty() {
                println!("\n   {} {}", "Prerequisites:".cyan(), concept.prerequisites.join(", "));
            }
        }
        TutorCommand::Concepts { topic } => {
            let list = tutor.list_concepts(topic.as_deref()).await?;
            heading(&format!("{} concept(s):", list.concepts.len()));
            for concept in &list.concepts {
                let topic = concept.topic_category.as_deref().unwrap_or("-");
                println!("   {:<24} {:<32} {}", concept.concept_id.cyan(), concept.name, topic.dimmed());
            }
        }
        TutorCommand::Mastery { concept_id, score } => {
            if !(0.0..=1.0).contains(&score) {
                bail!("Mastery score must be between 0 and 1, got {score}");
            }
            let ack = tutor
                .update_mastery(&UpdateMasteryRequest { concept_id, mastery_score: score })
                .await?;
            println!("{} {}", "✅".green(), ack.message);
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEACHER
// ═══════════════════════════════════════════════════════════════════════════════

async fn cmd_teacher(client: &ApiClient, command: TeacherCommand) -> Result<()> {
    let teacher = client.teacher();
    match command {
        TeacherCommand::Classrooms => {
            let classrooms = teacher.get_teacher_classrooms().await?;
            heading(&format!("{} classroom(s):", classrooms.len()));
            for classroom in &classrooms {
                println!(
                    "   {} {} (join code {})",
                    classroom.classroom_id.cyan(),
                    classroom.name,
                    classroom.join_code.yellow()
                );
            }
        }
        TeacherCommand::CreateClassroom { name, description } => {
            let classroom = teacher
                .create_classroom(&CreateClassroomRequest { name, description })
                .await?;
            println!("{} Created {}", "✅".green(), classroom.name.bold());
            println!("   {} {}", "Join code:".cyan(), classroom.join_code.yellow().bold());
        }
        TeacherCommand::Upload { classroom_id, file, title } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .context("File path has no file name")?
                .to_string();
            let title = title.unwrap_or_else(|| file_name.clone());
            let metadata = DocumentMetadata::new(classroom_id, title);

            let uploaded = with_spinner(
                "Uploading...",
                teacher.upload_document(&metadata, &file_name, content_type_for(&file), bytes),
            )
            .await?;
            println!("{} Uploaded {} ({})", "✅".green(), uploaded.document_id.cyan(), uploaded.status);
        }
        TeacherCommand::Documents { classroom_id } => {
            let list = teacher.get_classroom_documents(&classroom_id).await?;
            heading(&format!("{} document(s):", list.documents.len()));
            for doc in &list.documents {
                let status = doc.status.as_deref().unwrap_or("-");
                println!("   {} {} {}", doc.document_id.cyan(), doc.title, status.dimmed());
            }
        }
        TeacherCommand::Process { document_id } => {
            let analysis = with_spinner("Analyzing document...", teacher.process_document(&document_id)).await?;
            heading("Analysis:");
            println!("{}", serde_json::to_string_pretty(&analysis.analysis)?);
        }
        TeacherCommand::Generate { document_id, questions, question_types, smart } => {
            let params = GenerateActivitiesParams {
                num_questions: questions,
                question_types,
                use_smart_processing: smart,
                ..GenerateActivitiesParams::new(document_id)
            };
            let generated = with_spinner("Generating activity...", teacher.generate_activities(&params)).await?;
            println!(
                "{} Activity {} with {} question(s)",
                "✅".green(),
                generated.activity_id.cyan(),
                generated.questions_generated
            );
        }
        TeacherCommand::GeneratePrompt { classroom_id, title, prompt, difficulty, questions } => {
            let request = GenerateFromPromptRequest {
                classroom_id,
                title,
                description: None,
                prompt,
                difficulty,
                num_questions: questions,
            };
            let generated = with_spinner("Generating activity...", teacher.generate_from_prompt(&request)).await?;
            println!(
                "{} Activity {} with {} question(s)",
                "✅".green(),
                generated.activity_id.cyan(),
                generated.questions_generated
            );
        }
        TeacherCommand::CreateAsync { document_id, title, difficulty, questions, classroom_id, wait } => {
            let request = CreateAsyncActivityRequest {
                document_id,
                title,
                difficulty,
                num_questions: questions,
                classroom_id,
                use_ai_generation: true,
            };
            let task = teacher.create_activity_async(&request).await?;
            println!("{} Task {} for activity {}", "🚀".cyan(), task.task_id.cyan(), task.activity_id);

            if wait {
                let pb = ProgressBar::new(100);
                pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}% {msg}")?);
                loop {
                    let status = teacher.get_generation_status(&task.task_id).await?;
                    pb.set_position(status.progress.unwrap_or(0.0).clamp(0.0, 100.0) as u64);
                    pb.set_message(status.message.clone().unwrap_or_default());
                    if status.is_finished() {
                        pb.finish_and_clear();
                        match status.status.as_str() {
                            "completed" => println!("{} Generation completed", "✅".green()),
                            other => println!(
                                "{} Generation {}: {}",
                                "❌".red(),
                                other,
                                status.error.unwrap_or_default()
                            ),
                        }
                        break;
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
        TeacherCommand::Status { task_id } => {
            let status = teacher.get_generation_status(&task_id).await?;
            println!("   {} {}", "Status:".cyan(), status.status);
            if let Some(progress) = status.progress {
                println!("   {} {:.0}%", "Progress:".cyan(), progress);
            }
            if let Some(message) = status.message {
                println!("   {} {}", "Message:".cyan(), message);
            }
        }
        TeacherCommand::Activities { classroom_id } => {
            let list = teacher.get_classroom_activities(&classroom_id).await?;
            heading(&format!("{} activity(ies):", list.activities.len()));
            for activity in &list.activities {
                let difficulty = activity.difficulty.as_deref().unwrap_or("-");
                println!("   {} {} {}", activity.activity_id.cyan(), activity.title, difficulty.dimmed());
            }
        }
        TeacherCommand::Questions { activity_id } => {
            let questions = teacher.get_activity_questions(&activity_id).await?;
            heading(&questions.activity.title);
            for (i, question) in questions.questions.iter().enumerate() {
                let text = question.get("question_text").and_then(Value::as_str).unwrap_or("?");
                println!("{}. {}", i + 1, text);
            }
        }
        TeacherCommand::Assign { activity_id, student_ids } => {
            let result = teacher
                .assign_activity(&AssignActivityRequest { activity_id, student_ids })
                .await?;
            println!(
                "{} Assigned to {}/{} student(s)",
                "✅".green(),
                result.assigned_count,
                result.total_students
            );
        }
        TeacherCommand::Unassign { activity_id, student_ids } => {
            let result = teacher
                .unassign_activity(&UnassignActivityRequest { activity_id, student_ids })
                .await?;
            println!("{} Unassigned from {} student(s)", "✅".green(), result.unassigned_count);
        }
        TeacherCommand::DeleteActivity { activity_id, force } => {
            let ack = teacher.delete_activity(&activity_id, force).await?;
            println!("{} {}", "✅".green(), ack.message);
        }
        TeacherCommand::Analytics { classroom_id, range } => {
            let analytics = teacher.get_classroom_analytics(&classroom_id, range.as_deref()).await?;
            let m = &analytics.metrics;
            heading("Classroom analytics:");
            println!("   {} {}", "Students:".cyan(), m.total_students);
            println!("   {} {}", "Active:".cyan(), m.active_students);
            println!("   {} {}", "Assigned:".cyan(), m.total_activities_assigned);
            println!("   {} {}", "Completed:".cyan(), m.completed_activities);
            println!("   {} {:.1}", "Average score:".cyan(), m.average_score);
            if let Some(insights) = &analytics.insights {
                println!("\n{}", insights.dimmed());
            }
        }
        TeacherCommand::Students { classroom_id } => {
            let list = teacher.get_classroom_students(&classroom_id).await?;
            heading(&format!("{} student(s):", list.students.len()));
            for student in &list.students {
                let identity = student.users.as_ref();
                let name = identity.and_then(|u| u.name.as_deref()).unwrap_or("-");
                let email = identity.and_then(|u| u.email.as_deref()).unwrap_or("-");
                println!("   {} {} {}", student.student_id.cyan(), name, email.dimmed());
            }
        }
        TeacherCommand::Examples => {
            let examples = teacher.get_teaching_examples().await?;
            heading(&format!("{} teaching example(s):", examples.len()));
            for example in &examples {
                println!("   {} {}", example.id.cyan(), example.topic.bold());
                println!("      {} {}", "Teacher:".dimmed(), example.teacher_input);
                println!("      {} {}", "Tutor:".dimmed(), example.desired_ai_response);
            }
        }
        TeacherCommand::TestBehavior { input } => {
            let request = TestBehaviorRequest { student_input: input, context_examples: None };
            let reply = with_spinner("Asking the tutor...", teacher.test_behavior(&request)).await?;
            heading("Tutor reply:");
            println!("{}", reply.response);
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// STUDENT
// ═══════════════════════════════════════════════════════════════════════════════

async fn cmd_student(client: &ApiClient, command: StudentCommand) -> Result<()> {
    let student = client.student();
    match command {
        StudentCommand::Join { code } => {
            let joined = student
                .join_classroom(&JoinClassroomRequest { join_code: code.trim().to_uppercase() })
                .await?;
            println!("{} Joined {}", "✅".green(), joined.classroom_name.bold());
            println!("   {} {}", "Activities assigned:".cyan(), joined.activities_assigned);
        }
        StudentCommand::Classrooms => {
            let enrollments = student.get_student_classrooms().await?;
            heading(&format!("{} classroom(s):", enrollments.len()));
            for enrollment in &enrollments {
                let name = enrollment
                    .classrooms
                    .as_ref()
                    .map(|c| c.name.as_str())
                    .unwrap_or("-");
                println!("   {} {}", enrollment.classroom_id.cyan(), name);
            }
        }
        StudentCommand::Activities { classroom_id, status, sync } => {
            let filter = ActivityFilter { classroom_id, status, sync };
            let list = student.get_student_activities(&filter).await?;
            heading(&format!("{} activity(ies):", list.activities.len()));
            for activity in &list.activities {
                let title = activity
                    .learning_activities
                    .as_ref()
                    .map(|a| a.title.as_str())
                    .unwrap_or(&activity.activity_id);
                let score = activity.score.map(|s| format!("{s:.0}%")).unwrap_or_default();
                println!("   {} {:<40} {} {}", activity.activity_id.cyan(), title, activity.status.yellow(), score);
            }
        }
        StudentCommand::Details { activity_id } => {
            let details = student.get_activity_details(&activity_id).await?;
            heading(&details.activity.title);
            if let Some(description) = &details.activity.description {
                println!("{}", description);
            }
            for (i, question) in details.questions.iter().enumerate() {
                let id = question.get("question_id").and_then(Value::as_str).unwrap_or("?");
                let text = question.get("question_text").and_then(Value::as_str).unwrap_or("?");
                println!("{}. [{}] {}", i + 1, id.dimmed(), text);
            }
        }
        StudentCommand::Start { activity_id } => {
            let started = student.start_activity(&activity_id).await?;
            println!("{} Started: {}", "✅".green(), started.student_activity_id.cyan());
        }
        StudentCommand::Submit { student_activity_id, answers } => {
            if answers.is_empty() {
                bail!("Provide at least one --answer QUESTION_ID=ANSWER");
            }
            let responses: BTreeMap<String, Value> = answers.into_iter().collect();
            let assessment = student
                .submit_activity(&student_activity_id, &SubmitActivityRequest { responses })
                .await?;
            heading("Result:");
            println!(
                "   {} {:.0}% ({}/{})",
                "Score:".cyan(),
                assessment.score,
                assessment.correct_count,
                assessment.total_questions
            );
            let outcome = match assessment.assessment.as_str() {
                "pass" => assessment.assessment.green(),
                "fail" => assessment.assessment.red(),
                _ => assessment.assessment.yellow(),
            };
            println!("   {} {}", "Assessment:".cyan(), outcome);
            if let Some(feedback) = &assessment.feedback {
                println!("\n{}", feedback);
            }
        }
        StudentCommand::Progress => {
            let progress = student.get_student_progress().await?;
            heading("Progress:");
            println!("   {} {:.1}", "Understanding score:".cyan(), progress.overall_understanding_score);
            println!("   {} {}", "Recent activities:".cyan(), progress.recent_activities.len());
        }
        StudentCommand::Intro { activity_id } => {
            let intro = with_spinner("Preparing introduction...", student.get_activity_introduction(&activity_id)).await?;
            println!("{}", intro.introduction);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("q1=42").unwrap(), ("q1".to_string(), serde_json::json!(42)));
        assert_eq!(parse_answer("q2=x + 1").unwrap(), ("q2".to_string(), serde_json::json!("x + 1")));
        assert!(parse_answer("no-separator").is_err());
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type_for(Path::new("notes.PDF")), "application/pdf");
        assert_eq!(content_type_for(Path::new("unit")), "application/octet-stream");
    }

    #[test]
    fn test_role_flag() {
        let cli = Cli::try_parse_from(["mentor", "--role", "teacher", "teacher", "classrooms"]).unwrap();
        assert_eq!(cli.session.role, Some(Role::Teacher));
        assert!(Cli::try_parse_from(["mentor", "--role", "janitor", "tutor", "progress"]).is_err());
    }
}
