//! # MathMentor Client
//!
//! Typed API gateway client for the MathMentor tutoring backend.
//!
//! - **Dispatch**: bearer attachment, per-class timeouts, error mapping
//! - **Caching**: TTL cache for idempotent reads, swept in the background
//! - **De-duplication**: identical in-flight requests share one network call
//! - **Endpoints**: [`TutorApi`], [`TeacherApi`], [`StudentApi`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mentor_client::{ApiClient, ClientConfig, ReqwestTransport, StaticSession};
//! use mentor_cache::MemoryStore;
//! use mentor_core::Role;
//!
//! # async fn run() -> mentor_core::Result<()> {
//! let client = ApiClient::new(
//!     ClientConfig::from_env()?,
//!     Arc::new(ReqwestTransport::new()?),
//!     Arc::new(StaticSession::signed_in("token", Role::Student)),
//!     Arc::new(MemoryStore::new()),
//! )?;
//!
//! let progress = client.tutor().get_progress().await?;
//! println!("mastered {} concepts", progress.mastered);
//! client.dispose();
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, clippy::all)]

mod client;
mod config;
mod endpoints;
mod guard;
mod schema;
mod session;
mod transport;

pub use client::{ApiClient, RequestOptions};
pub use config::{ClientConfig, TimeoutConfig};
pub use endpoints::{StudentApi, TeacherApi, TutorApi};
pub use guard::{require_role, STUDENT_ROLES, TEACHER_ROLES};
pub use schema::{decode_list, decode_object};
pub use session::{AnonymousSession, StaticSession};
pub use transport::ReqwestTransport;
