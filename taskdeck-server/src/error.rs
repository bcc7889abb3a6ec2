//! HTTP error responses.
//!
//! [`ApiError`] pairs a [`ServiceError`] with the [`Operation`] that failed
//! so that unexpected failures can be reported with a generic,
//! operation-specific message while the full cause goes to the log.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use taskdeck_proto::api::{ErrorBody, TASK_NOT_FOUND};

use crate::service::ServiceError;

/// The API operation a request was performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `GET /api/tasks`
    List,
    /// `GET /api/tasks/{id}`
    Get,
    /// `POST /api/tasks`
    Create,
    /// `PATCH /api/tasks/{id}`
    Update,
    /// `DELETE /api/tasks/{id}`
    Delete,
}

impl Operation {
    /// Message returned to the caller when the store fails.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::List => "Failed to fetch tasks",
            Self::Get => "Failed to fetch task",
            Self::Create => "Failed to create task",
            Self::Update => "Failed to update task",
            Self::Delete => "Failed to delete task",
        }
    }
}

/// A failed request, ready to be turned into a JSON error response.
#[derive(Debug)]
pub enum ApiError {
    /// The service rejected or failed the operation.
    Service {
        /// What the request was doing.
        operation: Operation,
        /// Why it failed.
        source: ServiceError,
    },
    /// The request body was not valid JSON for the endpoint.
    BadBody(String),
}

impl ApiError {
    /// Wraps a service error with the operation that produced it.
    #[must_use]
    pub const fn service(operation: Operation, source: ServiceError) -> Self {
        Self::Service { operation, source }
    }

    /// Status code and client-facing message for this error.
    #[must_use]
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::BadBody(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Service { operation, source } => match source {
                ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, TASK_NOT_FOUND.to_string()),
                ServiceError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
                ServiceError::Store(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    operation.failure_message().to_string(),
                ),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Service {
                operation,
                source: ServiceError::Store(e),
            } => {
                tracing::error!(?operation, error = %e, "store failure");
            }
            Self::Service { operation, source } => {
                tracing::debug!(?operation, error = %source, "request rejected");
            }
            Self::BadBody(message) => {
                tracing::debug!(error = %message, "malformed request body");
            }
        }

        let (status, message) = self.status_and_message();
        (status, Json(ErrorBody::new(message))).into_response()
    }
}
