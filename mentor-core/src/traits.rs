//! Seams between the client and its collaborators.
//!
//! These traits let the gateway run against real infrastructure in production
//! and against in-process doubles in tests:
//! - [`Transport`]: sends one HTTP request
//! - [`SessionProvider`]: the external auth provider (token + role)
//! - [`KeyValueStore`]: durable string storage for the persistent cache

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{HttpRequest, HttpResponse, Role};

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSPORT TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Sends a single HTTP request.
///
/// Implementations return `Ok` for every response that arrived, whatever the
/// status; only connection-level failures are `Err`. Timeouts are enforced by
/// the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the raw response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Read-only view of the external authentication session.
///
/// The client asks for the token on every call and never stores it.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Returns the current bearer token, if signed in.
    async fn access_token(&self) -> Result<Option<String>>;

    /// Returns the role of the signed-in user, if known.
    async fn role(&self) -> Result<Option<Role>>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// STORAGE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Durable string key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removes a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
