//! Local list filters.

use taskdeck_proto::task::{Priority, Task};

/// Filter on completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every task.
    #[default]
    All,
    /// Tasks not yet completed.
    Active,
    /// Completed tasks.
    Completed,
}

impl StatusFilter {
    /// Next filter in display order, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::All => Self::Active,
            Self::Active => Self::Completed,
            Self::Completed => Self::All,
        }
    }

    /// Lower-case name, as used in the empty-state message.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Whether `task` passes this filter.
    #[must_use]
    pub const fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.is_completed,
            Self::Completed => task.is_completed,
        }
    }
}

/// Filter on priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    /// Every priority.
    #[default]
    All,
    /// Exactly one priority.
    Only(Priority),
}

impl PriorityFilter {
    /// Cycles `All -> Low -> Medium -> High -> Urgent -> All`.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::All => Self::Only(Priority::Low),
            Self::Only(Priority::Urgent) => Self::All,
            Self::Only(p) => Self::Only(p.next()),
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(p) => p.label(),
        }
    }

    /// Whether `task` passes this filter.
    #[must_use]
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Only(p) => task.priority == p,
        }
    }
}

/// Both filters combined; a task must pass each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Completion filter.
    pub status: StatusFilter,
    /// Priority filter.
    pub priority: PriorityFilter,
}

impl TaskFilter {
    /// Creates a combined filter.
    #[must_use]
    pub const fn new(status: StatusFilter, priority: PriorityFilter) -> Self {
        Self { status, priority }
    }

    /// Whether `task` passes both filters.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(task) && self.priority.matches(task)
    }
}
