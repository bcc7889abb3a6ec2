//! HTTP surface shared by the server router and the client.

use serde::{Deserialize, Serialize};

use crate::task::TaskId;

/// Collection route.
pub const TASKS_PATH: &str = "/api/tasks";

/// Item route pattern, as registered with the router.
pub const TASK_PATH: &str = "/api/tasks/{id}";

/// Error message returned for an unknown task id.
pub const TASK_NOT_FOUND: &str = "Task not found";

/// Acknowledgment message returned after a delete.
pub const TASK_DELETED: &str = "Task deleted successfully";

/// Path of a single task.
#[must_use]
pub fn task_path(id: &TaskId) -> String {
    format!("{TASKS_PATH}/{id}")
}

/// JSON body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub error: String,
}

impl ErrorBody {
    /// Creates an error body.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// JSON body of a successful request that returns no entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    /// Human-readable acknowledgment.
    pub message: String,
}

impl MessageBody {
    /// Creates a message body.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_path_embeds_id() {
        let id = TaskId::new();
        assert_eq!(task_path(&id), format!("/api/tasks/{id}"));
    }

    #[test]
    fn error_body_shape() {
        let json = serde_json::to_string(&ErrorBody::new(TASK_NOT_FOUND)).unwrap();
        assert_eq!(json, r#"{"error":"Task not found"}"#);
    }
}
