//! HTTP client for the task API.
//!
//! [`TaskApi`] is the seam between the sync worker and the network so that
//! the worker can be driven by an in-memory implementation in tests.
//! [`HttpTaskApi`] is the real `reqwest` client.

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};
use taskdeck_proto::api::{ErrorBody, MessageBody, TASKS_PATH, task_path};
use taskdeck_proto::patch::{CreateTaskRequest, TaskPatch, UpdateTaskRequest};
use taskdeck_proto::task::{NewTask, Task, TaskId};
use url::Url;

/// Errors returned by [`TaskApi`] calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The configured server URL cannot be used as a base URL.
    #[error("invalid server URL {url}: {reason}")]
    InvalidUrl {
        /// URL as configured.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{message} ({status})")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The server's `error` message, or the status reason.
        message: String,
    },
}

impl ApiError {
    /// Whether the server reported that the task does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Http(e) if e.is_timeout() => "Server did not respond in time".to_string(),
            Self::Http(e) if e.is_connect() => "Could not reach the server".to_string(),
            other => other.to_string(),
        }
    }
}

/// Remote task operations used by the sync worker.
pub trait TaskApi: Send + Sync {
    /// Fetches every task.
    fn list(&self) -> impl Future<Output = Result<Vec<Task>, ApiError>> + Send;

    /// Creates a task and returns the server's entity.
    fn create(&self, task: NewTask) -> impl Future<Output = Result<Task, ApiError>> + Send;

    /// Applies a partial update and returns the server's entity.
    fn update(
        &self,
        id: TaskId,
        patch: TaskPatch,
    ) -> impl Future<Output = Result<Task, ApiError>> + Send;

    /// Deletes a task.
    fn delete(&self, id: TaskId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// [`TaskApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: reqwest::Client,
    base: Url,
}

impl HttpTaskApi {
    /// Creates a client for the server at `base_url`.
    ///
    /// Every request is bounded by `timeout`. A path on `base_url` is kept
    /// as a prefix for the API routes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` is not an absolute
    /// http(s) URL, or [`ApiError::Http`] if the client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let invalid = |reason: String| ApiError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };

        let mut base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", base.scheme())));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// The normalized base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl {
                url: self.base.to_string(),
                reason: e.to_string(),
            })
    }
}

impl TaskApi for HttpTaskApi {
    async fn list(&self) -> Result<Vec<Task>, ApiError> {
        let resp = self.client.get(self.endpoint(TASKS_PATH)?).send().await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn create(&self, task: NewTask) -> Result<Task, ApiError> {
        let body = CreateTaskRequest::from(&task);
        let resp = self
            .client
            .post(self.endpoint(TASKS_PATH)?)
            .json(&body)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task, ApiError> {
        let body = UpdateTaskRequest::from(&patch);
        let resp = self
            .client
            .patch(self.endpoint(&task_path(&id))?)
            .json(&body)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn delete(&self, id: TaskId) -> Result<(), ApiError> {
        let resp = self
            .client
            .delete(self.endpoint(&task_path(&id))?)
            .send()
            .await?;
        let ack: MessageBody = check(resp).await?.json().await?;
        tracing::debug!(task_id = %id, message = %ack.message, "delete acknowledged");
        Ok(())
    }
}

/// Turns a non-success response into [`ApiError::Status`].
async fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        message: error_message(status, &text),
    })
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body).map_or_else(
        |_| {
            status
                .canonical_reason()
                .unwrap_or("Unexpected server response")
                .to_string()
        },
        |b| b.error,
    )
}
