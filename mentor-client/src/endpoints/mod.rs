//! Typed endpoint groups.
//!
//! Each group borrows the [`ApiClient`] and declares, per operation, the
//! method, timeout class, cache lifetime, auth requirement and the cached
//! reads a successful mutation invalidates.

mod student;
mod teacher;
mod tutor;

pub use student::StudentApi;
pub use teacher::TeacherApi;
pub use tutor::TutorApi;

use url::form_urlencoded;

use crate::client::ApiClient;

impl ApiClient {
    /// Tutoring endpoints (`/api`).
    pub fn tutor(&self) -> TutorApi<'_> {
        TutorApi::new(self)
    }

    /// Teacher portal endpoints (`/api/teacher`).
    pub fn teacher(&self) -> TeacherApi<'_> {
        TeacherApi::new(self)
    }

    /// Student portal endpoints (`/api/student`).
    pub fn student(&self) -> StudentApi<'_> {
        StudentApi::new(self)
    }
}

/// Appends the present parameters to `path` as an encoded query string.
///
/// Parameters keep their given order so equal calls yield equal endpoints.
pub(crate) fn with_query<'a, I>(path: &str, params: I) -> String
where
    I: IntoIterator<Item = (&'a str, Option<String>)>,
{
    let mut query = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (name, value) in params {
        if let Some(value) = value {
            query.append_pair(name, &value);
            any = true;
        }
    }
    if any {
        format!("{}?{}", path, query.finish())
    } else {
        path.to_string()
    }
}

/// Encodes one path segment.
pub(crate) fn segment(id: &str) -> String {
    form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
