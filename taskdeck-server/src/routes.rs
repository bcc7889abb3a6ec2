//! HTTP routing for the task API.
//!
//! Every handler is generic over the [`TaskStore`] so that tests can mount
//! the router on an alternative store.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use taskdeck_proto::api::{MessageBody, TASK_DELETED, TASK_PATH, TASKS_PATH};
use taskdeck_proto::patch::{CreateTaskRequest, UpdateTaskRequest};
use taskdeck_proto::task::Task;

use crate::error::{ApiError, Operation};
use crate::service::TaskService;
use crate::store::{SqliteStore, TaskStore};

/// Default maximum accepted request body in bytes (64 KB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024;

/// Shared handler state.
pub type AppState<S> = Arc<TaskService<S>>;

/// Builds the API router around `service`.
pub fn router<S>(service: AppState<S>, max_body_size: usize) -> Router
where
    S: TaskStore + 'static,
{
    Router::new()
        .route(TASKS_PATH, get(list_tasks::<S>).post(create_task::<S>))
        .route(
            TASK_PATH,
            get(get_task::<S>)
                .patch(update_task::<S>)
                .delete(delete_task::<S>),
        )
        .layer(DefaultBodyLimit::max(max_body_size))
        .with_state(service)
}

/// Starts the API server on an in-memory store.
///
/// Returns the bound address and a join handle for the server task.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the address cannot be
/// bound.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let service = Arc::new(TaskService::new(SqliteStore::open_in_memory()?));
    start_server_with_state(addr, service, DEFAULT_MAX_BODY_SIZE).await
}

/// Starts the API server with a pre-built service.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn start_server_with_state<S>(
    addr: &str,
    service: AppState<S>,
    max_body_size: usize,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
>
where
    S: TaskStore + 'static,
{
    let app = router(service, max_body_size);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "task server error");
        }
    });

    Ok((bound_addr, handle))
}

async fn list_tasks<S: TaskStore>(
    State(service): State<AppState<S>>,
) -> Result<Json<Vec<Task>>, ApiError> {
    service
        .list()
        .await
        .map(Json)
        .map_err(|e| ApiError::service(Operation::List, e))
}

async fn get_task<S: TaskStore>(
    State(service): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    service
        .get(&id)
        .await
        .map(Json)
        .map_err(|e| ApiError::service(Operation::Get, e))
}

async fn create_task<S: TaskStore>(
    State(service): State<AppState<S>>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadBody(e.body_text()))?;
    service
        .create(request)
        .await
        .map(|task| (StatusCode::CREATED, Json(task)))
        .map_err(|e| ApiError::service(Operation::Create, e))
}

async fn update_task<S: TaskStore>(
    State(service): State<AppState<S>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    // Unknown ids are reported as 404 even when the body is also malformed.
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            service
                .get(&id)
                .await
                .map_err(|e| ApiError::service(Operation::Update, e))?;
            return Err(ApiError::BadBody(rejection.body_text()));
        }
    };
    service
        .update(&id, request)
        .await
        .map(Json)
        .map_err(|e| ApiError::service(Operation::Update, e))
}

async fn delete_task<S: TaskStore>(
    State(service): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    service
        .delete(&id)
        .await
        .map(|()| Json(MessageBody::new(TASK_DELETED)))
        .map_err(|e| ApiError::service(Operation::Delete, e))
}
