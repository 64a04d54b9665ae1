//! Domain and wire types for the MathMentor client.
//!
//! - HTTP: transport-level request/response values
//! - [`Role`]: portal role supplied by the session provider
//! - [`tutor`], [`teacher`], [`student`]: endpoint payload schemas

mod http;
mod session;
pub mod student;
pub mod teacher;
pub mod tutor;

pub use http::*;
pub use session::*;
