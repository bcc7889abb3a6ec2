//! Task service: request validation and store orchestration.
//!
//! [`TaskService`] turns validated requests into store calls and owns the
//! timestamp policy. Update and delete check that the task exists before
//! mutating; the two steps are not transactional, so a concurrent delete in
//! between surfaces as [`ServiceError::NotFound`].

use chrono::{DateTime, Duration, SubsecRound, Utc};
use taskdeck_proto::patch::{CreateTaskRequest, UpdateTaskRequest, ValidationError};
use taskdeck_proto::task::{Task, TaskId};

use crate::store::{StoreError, TaskStore};

/// Errors returned by [`TaskService`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No task has the requested id.
    #[error("task not found: {0}")]
    NotFound(String),

    /// The request body was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store failed unexpectedly.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Application-layer interface over a [`TaskStore`].
pub struct TaskService<S> {
    store: S,
}

impl<S: TaskStore> TaskService<S> {
    /// Creates a service backed by `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Current time at the store's microsecond precision.
    fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }

    /// Lists every task.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the store fails.
    pub async fn list(&self) -> Result<Vec<Task>, ServiceError> {
        Ok(self.store.list().await?)
    }

    /// Fetches one task by its textual id.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown or malformed ids, or
    /// [`ServiceError::Store`] if the store fails.
    pub async fn get(&self, id: &str) -> Result<Task, ServiceError> {
        let task_id = parse_id(id)?;
        self.store
            .get(task_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    /// Validates and inserts a new task.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for a bad body, or
    /// [`ServiceError::Store`] if the store fails. Nothing is persisted on
    /// error.
    pub async fn create(&self, request: CreateTaskRequest) -> Result<Task, ServiceError> {
        let new_task = request.validate()?;
        let task = self.store.insert(new_task, Self::now()).await?;
        tracing::info!(task_id = %task.id, priority = %task.priority, "task created");
        Ok(task)
    }

    /// Applies a partial update to an existing task.
    ///
    /// `updated_at` always moves forward, even when the clock has not
    /// advanced since the previous write.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if the task does not exist (checked
    /// before the body), [`ServiceError::Validation`] for a bad body, or
    /// [`ServiceError::Store`] if the store fails.
    pub async fn update(&self, id: &str, request: UpdateTaskRequest) -> Result<Task, ServiceError> {
        let existing = self.get(id).await?;
        let patch = request.validate()?;
        patch.validate_against(&existing)?;

        let now = Self::now().max(existing.updated_at + Duration::microseconds(1));
        let task = self
            .store
            .update(existing.id, patch, now)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
        tracing::info!(task_id = %task.id, completed = task.is_completed, "task updated");
        Ok(task)
    }

    /// Deletes a task permanently.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if the task does not exist, or
    /// [`ServiceError::Store`] if the store fails.
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        if !self.store.delete(existing.id).await? {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        tracing::info!(task_id = %existing.id, "task deleted");
        Ok(())
    }
}

/// A malformed id cannot name a stored task.
fn parse_id(id: &str) -> Result<TaskId, ServiceError> {
    id.parse()
        .map_err(|_| ServiceError::NotFound(id.to_string()))
}
