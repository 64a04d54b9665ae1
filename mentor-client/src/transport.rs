//! `reqwest`-backed transport.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use tracing::{debug, instrument};

use mentor_core::{HttpRequest, HttpResponse, Method, MentorError, RequestBody, Result, Transport};

/// Sends requests with a shared `reqwest::Client`.
///
/// No timeout is configured on the client; budgets are enforced per call by
/// the [`ApiClient`](crate::ApiClient).
#[derive(Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("mentor-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MentorError::ConfigError(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http_client })
    }

    /// Wraps an existing client.
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .http_client
            .request(to_reqwest(request.method), &request.url);

        if let Some(token) = &request.bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(text) => builder.header(CONTENT_TYPE, "application/json").body(text),
            RequestBody::Multipart(upload) => {
                let file_part = Part::bytes(upload.bytes.to_vec())
                    .file_name(upload.file_name)
                    .mime_str(&upload.content_type)
                    .map_err(|e| MentorError::InvalidRequest(format!("bad content type: {e}")))?;
                let form = Form::new()
                    .part("file", file_part)
                    .text("metadata", upload.metadata);
                builder.multipart(form)
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| MentorError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| MentorError::Network(e.to_string()))?;

        debug!(status = status.as_u16(), bytes = body.len(), "Response received");
        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().map(str::to_string),
            body,
        })
    }
}
