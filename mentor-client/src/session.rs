//! Session providers and token resolution.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use mentor_core::{Result, Role, SessionProvider};

/// Session with a token and role supplied up front.
#[derive(Clone, Debug, Default)]
pub struct StaticSession {
    token: Option<String>,
    role: Option<Role>,
}

impl StaticSession {
    pub fn new(token: Option<String>, role: Option<Role>) -> Self {
        Self { token, role }
    }

    /// Signed-in session with the given token and role.
    pub fn signed_in(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: Some(token.into()),
            role: Some(role),
        }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.token.clone().filter(|t| !t.is_empty()))
    }

    async fn role(&self) -> Result<Option<Role>> {
        Ok(self.role)
    }
}

/// Session that is never signed in.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnonymousSession;

#[async_trait]
impl SessionProvider for AnonymousSession {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(None)
    }

    async fn role(&self) -> Result<Option<Role>> {
        Ok(None)
    }
}

/// Asks the provider for a token, treating errors and slowness as "no token".
pub(crate) async fn resolve_token(session: &dyn SessionProvider, budget: Duration) -> Option<String> {
    match tokio::time::timeout(budget, session.access_token()).await {
        Ok(Ok(token)) => token,
        Ok(Err(e)) => {
            warn!(error = %e, "Session provider failed, continuing without token");
            None
        }
        Err(_) => {
            debug!(budget_ms = budget.as_millis() as u64, "Session provider timed out");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentor_core::MentorError;

    struct FailingSession;

    #[async_trait]
    impl SessionProvider for FailingSession {
        async fn access_token(&self) -> Result<Option<String>> {
            Err(MentorError::Network("auth provider unreachable".into()))
        }
        async fn role(&self) -> Result<Option<Role>> {
            Ok(None)
        }
    }

    struct SlowSession;

    #[async_trait]
    impl SessionProvider for SlowSession {
        async fn access_token(&self) -> Result<Option<String>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Some("late".into()))
        }
        async fn role(&self) -> Result<Option<Role>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_static_session() {
        let session = StaticSession::signed_in("tok", Role::Teacher);
        assert_eq!(resolve_token(&session, Duration::from_secs(1)).await.as_deref(), Some("tok"));
        assert_eq!(session.role().await.unwrap(), Some(Role::Teacher));
    }

    #[tokio::test]
    async fn test_empty_token_is_absent() {
        let session = StaticSession::new(Some(String::new()), None);
        assert!(resolve_token(&session, Duration::from_secs(1)).await.is_none());
    }

    #[tokio::test]
    async fn test_provider_error_is_no_token() {
        assert!(resolve_token(&FailingSession, Duration::from_secs(1)).await.is_none());
        assert!(resolve_token(&AnonymousSession, Duration::from_secs(1)).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_is_no_token() {
        assert!(resolve_token(&SlowSession, Duration::from_secs(5)).await.is_none());
    }
}
