//! Client-side task list.
//!
//! `TaskState` only ever holds entities returned by the server. Mutations
//! are applied after the server confirms them, so the local list never
//! shows a change the server rejected.

use taskdeck_proto::task::{Task, TaskId};

use super::filter::TaskFilter;

/// Task totals shown in the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    /// Number of tasks.
    pub total: usize,
    /// Number of completed tasks.
    pub completed: usize,
    /// Number of tasks still open.
    pub remaining: usize,
}

/// The client's copy of the task list.
#[derive(Debug, Default)]
pub struct TaskState {
    tasks: Vec<Task>,
    loading: bool,
    loaded: bool,
}

impl TaskState {
    /// Creates an empty, not yet loaded state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a full load as in flight.
    pub const fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Marks the in-flight load as failed, keeping the current list.
    pub const fn load_failed(&mut self) {
        self.loading = false;
    }

    /// Whether a full load is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether at least one full load has completed.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Replaces the whole list with the server's.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.loading = false;
        self.loaded = true;
    }

    /// Prepends a newly created task.
    pub fn insert_created(&mut self, task: Task) {
        self.tasks.insert(0, task);
    }

    /// Replaces the task with the same id. Returns `false` if it is not in
    /// the list, in which case nothing changes.
    pub fn replace(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }

    /// Removes the task with `id`, returning it if present.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(idx))
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// All tasks, newest first.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Totals over every task, ignoring any filter.
    #[must_use]
    pub fn counts(&self) -> TaskCounts {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|t| t.is_completed).count();
        TaskCounts {
            total,
            completed,
            remaining: total - completed,
        }
    }

    /// Tasks passing `filter`, in list order.
    #[must_use]
    pub fn filtered(&self, filter: &TaskFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }
}
