//! Sync worker wiring the TUI to the task API.
//!
//! The main thread sends [`SyncCommand`]s and drains [`SyncEvent`]s on each
//! tick of the poll-based event loop; a single background tokio task runs
//! the commands one at a time against a [`TaskApi`].
//!
//! ```text
//! TUI (main thread)  ←── SyncEvent ───  sync worker ── HTTP ──▶ server
//!                     ─── SyncCommand →
//! ```
//!
//! Events only report what the server confirmed; the UI applies them to
//! its [`crate::tasks::TaskState`].

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use taskdeck_proto::patch::TaskPatch;
use taskdeck_proto::task::{NewTask, Task, TaskId};

use crate::api::TaskApi;

/// Identifies one form submission.
///
/// Echoed back in the resulting event so the result only closes or marks
/// the form that sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(pub u64);

/// Commands sent from the TUI main loop to the sync worker.
#[derive(Debug, Clone)]
pub enum SyncCommand {
    /// Fetch the full task list.
    Load,
    /// Create a task.
    Create {
        /// Fields of the new task.
        task: NewTask,
        /// Submission that asked for it, if any.
        ticket: Option<Ticket>,
    },
    /// Apply a partial update to a task.
    Update {
        /// Task to change.
        id: TaskId,
        /// Fields to change.
        patch: TaskPatch,
        /// Submission that asked for it, if any.
        ticket: Option<Ticket>,
    },
    /// Delete a task.
    Delete(TaskId),
    /// Stop the worker.
    Shutdown,
}

impl SyncCommand {
    /// A create not tied to any form.
    #[must_use]
    pub const fn create(task: NewTask) -> Self {
        Self::Create { task, ticket: None }
    }

    /// An update not tied to any form.
    #[must_use]
    pub const fn update(id: TaskId, patch: TaskPatch) -> Self {
        Self::Update {
            id,
            patch,
            ticket: None,
        }
    }

    /// The submission this command belongs to.
    #[must_use]
    pub const fn ticket(&self) -> Option<Ticket> {
        match self {
            Self::Create { ticket, .. } | Self::Update { ticket, .. } => *ticket,
            Self::Load | Self::Delete(_) | Self::Shutdown => None,
        }
    }
}

/// Which kind of command failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// [`SyncCommand::Load`]
    Load,
    /// [`SyncCommand::Create`]
    Create,
    /// [`SyncCommand::Update`]
    Update,
    /// [`SyncCommand::Delete`]
    Delete,
}

impl SyncAction {
    /// Verb phrase for error messages ("Could not {verb}: ...").
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Load => "load tasks",
            Self::Create => "create task",
            Self::Update => "update task",
            Self::Delete => "delete task",
        }
    }
}

/// Events sent from the sync worker to the TUI main loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The full list as returned by the server.
    Loaded(Vec<Task>),
    /// The server created this task.
    Created {
        /// The server's entity.
        task: Task,
        /// Ticket of the command.
        ticket: Option<Ticket>,
    },
    /// The server's copy of an updated task.
    Updated {
        /// The server's entity.
        task: Task,
        /// Ticket of the command.
        ticket: Option<Ticket>,
    },
    /// The server deleted this task.
    Deleted(TaskId),
    /// A command failed; local state must not change.
    Failed {
        /// What was attempted.
        action: SyncAction,
        /// Task the command targeted, if any.
        task_id: Option<TaskId>,
        /// Ticket of the command.
        ticket: Option<Ticket>,
        /// User-facing reason.
        message: String,
    },
}

/// Spawns the sync worker and returns its channel handles.
///
/// Commands are executed in the order they are sent. The worker stops on
/// [`SyncCommand::Shutdown`], when the command sender is dropped, or when
/// the event receiver is dropped.
pub fn spawn_sync<A>(
    api: A,
    channel_capacity: usize,
) -> (
    mpsc::Sender<SyncCommand>,
    mpsc::Receiver<SyncEvent>,
    JoinHandle<()>,
)
where
    A: TaskApi + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel::<SyncCommand>(channel_capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<SyncEvent>(channel_capacity);

    let handle = tokio::spawn(async move {
        command_loop(api, cmd_rx, evt_tx).await;
    });

    (cmd_tx, evt_rx, handle)
}

async fn command_loop<A: TaskApi>(
    api: A,
    mut cmd_rx: mpsc::Receiver<SyncCommand>,
    evt_tx: mpsc::Sender<SyncEvent>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        let Some(event) = execute(&api, cmd).await else {
            tracing::info!("sync worker shutting down");
            break;
        };
        if evt_tx.send(event).await.is_err() {
            // TUI dropped; exit.
            break;
        }
    }
}

/// Runs one command against `api` and reports the outcome.
///
/// Returns `None` for [`SyncCommand::Shutdown`].
pub async fn execute<A: TaskApi>(api: &A, cmd: SyncCommand) -> Option<SyncEvent> {
    let event = match cmd {
        SyncCommand::Load => match api.list().await {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "tasks loaded");
                SyncEvent::Loaded(tasks)
            }
            Err(e) => failed(SyncAction::Load, None, None, &e),
        },
        SyncCommand::Create { task, ticket } => match api.create(task).await {
            Ok(task) => SyncEvent::Created { task, ticket },
            Err(e) => failed(SyncAction::Create, None, ticket, &e),
        },
        SyncCommand::Update { id, patch, ticket } => match api.update(id, patch).await {
            Ok(task) => SyncEvent::Updated { task, ticket },
            Err(e) => failed(SyncAction::Update, Some(id), ticket, &e),
        },
        SyncCommand::Delete(id) => match api.delete(id).await {
            Ok(()) => SyncEvent::Deleted(id),
            Err(e) => failed(SyncAction::Delete, Some(id), None, &e),
        },
        SyncCommand::Shutdown => return None,
    };
    Some(event)
}

fn failed(
    action: SyncAction,
    task_id: Option<TaskId>,
    ticket: Option<Ticket>,
    err: &crate::api::ApiError,
) -> SyncEvent {
    tracing::warn!(action = action.verb(), task_id = ?task_id, error = %err, "sync command failed");
    SyncEvent::Failed {
        action,
        task_id,
        ticket,
        message: err.user_message(),
    }
}
