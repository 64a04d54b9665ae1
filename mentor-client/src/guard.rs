//! Role guard for the teacher and student portals.

use mentor_core::{MentorError, Result, Role, SessionProvider};

/// Roles admitted to the teacher portal.
pub const TEACHER_ROLES: &[Role] = &[Role::Teacher, Role::Admin];

/// Roles admitted to the student portal.
pub const STUDENT_ROLES: &[Role] = &[Role::Student];

/// Returns the session role if it is one of `allowed`.
///
/// A missing role, or a provider error, is denied.
pub async fn require_role(session: &dyn SessionProvider, allowed: &[Role]) -> Result<Role> {
    let actual = session.role().await.ok().flatten();
    match actual {
        Some(role) if allowed.contains(&role) => Ok(role),
        _ => Err(MentorError::Forbidden {
            required: allowed
                .iter()
                .map(Role::as_str)
                .collect::<Vec<_>>()
                .join(" or "),
            actual,
        }),
    }
}
