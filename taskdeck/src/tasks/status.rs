//! Derived due status of a task.

use chrono::{Days, NaiveDate};
use taskdeck_proto::task::Task;

/// How many days ahead a due date counts as "due soon".
pub const DUE_SOON_DAYS: u64 = 3;

/// Presentation-only status computed from a task and the current date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    /// The task is done.
    Completed,
    /// The due date is in the past.
    Overdue,
    /// The due date is today or within [`DUE_SOON_DAYS`].
    DueSoon,
    /// No due date, or the due date is further out.
    Normal,
}

impl DueStatus {
    /// Computes the status of `task` as seen on `today`.
    ///
    /// The due time is not taken into account.
    #[must_use]
    pub fn of(task: &Task, today: NaiveDate) -> Self {
        if task.is_completed {
            return Self::Completed;
        }
        let Some(due) = task.due_date else {
            return Self::Normal;
        };
        if due < today {
            return Self::Overdue;
        }
        let horizon = today.checked_add_days(Days::new(DUE_SOON_DAYS));
        if horizon.is_some_and(|h| due <= h) {
            Self::DueSoon
        } else {
            Self::Normal
        }
    }

    /// Short label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Completed => "done",
            Self::Overdue => "overdue",
            Self::DueSoon => "due soon",
            Self::Normal => "",
        }
    }
}
