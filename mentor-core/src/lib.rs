//! # MathMentor Core
//!
//! Core types, errors, and traits shared by the MathMentor client crates.
//!
//! - **Types**: transport values, roles and endpoint payload schemas
//! - **Errors**: the [`MentorError`] taxonomy (timeout, HTTP, auth, malformed)
//! - **Constants**: timeout tiers, cache lifetimes, environment keys
//! - **Traits**: [`Transport`], [`SessionProvider`] and [`KeyValueStore`] seams
//!
//! ## Example
//!
//! ```rust
//! use mentor_core::{HttpResponse, MentorError};
//!
//! let response = HttpResponse::json(404, &serde_json::json!({ "detail": "Concept not found" }));
//! assert!(matches!(response.into_error(), MentorError::Http { status: 404, .. }));
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{MentorError, Result};
pub use traits::*;
pub use types::*;
