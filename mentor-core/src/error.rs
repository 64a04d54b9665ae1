//! Error types for the MathMentor client.
//!
//! Every failure a caller can observe from the gateway is a [`MentorError`].
//! The type is `Clone` because a single in-flight request fans its outcome
//! out to every caller that attached to it.

use thiserror::Error;

use crate::types::Role;

/// Result type alias using `MentorError`.
pub type Result<T> = std::result::Result<T, MentorError>;

/// Main error type for all client operations.
#[derive(Debug, Clone, Error)]
pub enum MentorError {
    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSPORT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The request exceeded its timeout budget.
    #[error("Request to '{endpoint}' timed out after {budget_ms}ms")]
    Timeout { endpoint: String, budget_ms: u64 },

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Connection-level failure (DNS, TLS, reset).
    #[error("Network error: {0}")]
    Network(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SESSION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// No bearer token was available for an endpoint that requires one.
    #[error("Authentication required for '{0}'")]
    AuthenticationMissing(String),

    /// The session role does not satisfy a role guard.
    #[error("Access denied: requires {required}, session role is {}", role_label(.actual))]
    Forbidden { required: String, actual: Option<Role> },

    // ═══════════════════════════════════════════════════════════════════════════
    // RESPONSE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The response body did not match the endpoint's schema.
    #[error("Malformed response from '{endpoint}': {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CLIENT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The request could not be built (bad multipart part, bad URL).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Persistent storage failure.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// The client was disposed and no longer accepts calls.
    #[error("Client has been disposed")]
    ClientDisposed,

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

fn role_label(role: &Option<Role>) -> &'static str {
    role.map(|r| r.as_str()).unwrap_or("unknown")
}

impl MentorError {
    /// Returns true if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, MentorError::Timeout { .. })
    }

    /// Returns true if the same call may succeed when re-issued.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MentorError::Timeout { .. } | MentorError::Network(_) => true,
            MentorError::Http { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            _ => false,
        }
    }

    /// Returns true if the failure is about identity or permissions.
    pub fn is_auth_error(&self) -> bool {
        match self {
            MentorError::AuthenticationMissing(_) | MentorError::Forbidden { .. } => true,
            MentorError::Http { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }

    /// Returns the HTTP status for backend errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            MentorError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Builds a `MalformedResponse` for the given endpoint.
    pub fn malformed(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        MentorError::MalformedResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for MentorError {
    fn from(err: serde_json::Error) -> Self {
        MentorError::Json(err.to_string())
    }
}
