//! Core task model shared by the server and the client.
//!
//! A [`Task`] is the single persisted entity. Its JSON form uses camelCase
//! field names, upper-case priority names, `YYYY-MM-DD` due dates, `HH:MM`
//! due times and RFC 3339 UTC timestamps.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::wire;

/// Unique identifier for a task, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Ordered urgency of a task.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    /// Can wait.
    Low,
    /// The default for new tasks.
    #[default]
    Medium,
    /// Should be done soon.
    High,
    /// Drop everything.
    Urgent,
}

/// Error returned when parsing an unknown priority name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority: {0}")]
pub struct UnknownPriority(pub String);

impl Priority {
    /// All priorities in ascending order.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    /// Wire name (`LOW`, `MEDIUM`, `HIGH`, `URGENT`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }

    /// The next priority, wrapping from `Urgent` back to `Low`.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High => Self::Urgent,
            Self::Urgent => Self::Low,
        }
    }

    /// The previous priority, wrapping from `Low` to `Urgent`.
    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Low => Self::Urgent,
            Self::Medium => Self::Low,
            Self::High => Self::Medium,
            Self::Urgent => Self::High,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = UnknownPriority;

    /// Parses the exact wire name. Lower-case or padded names are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPriority(s.to_string()))
    }
}

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Store-assigned identifier, immutable.
    pub id: TaskId,
    /// Non-empty title.
    pub title: String,
    /// Optional calendar due date.
    #[serde(default, with = "wire::date_opt")]
    pub due_date: Option<NaiveDate>,
    /// Optional time of day, only meaningful together with `due_date`.
    #[serde(default, with = "wire::time_opt")]
    pub due_time: Option<NaiveTime>,
    /// Urgency.
    pub priority: Priority,
    /// Optional related URL, unvalidated.
    #[serde(default)]
    pub link: Option<String>,
    /// Completion flag, `false` on creation.
    pub is_completed: bool,
    /// Creation instant, immutable.
    pub created_at: DateTime<Utc>,
    /// Last mutation instant.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether the task has been modified since it was created.
    #[must_use]
    pub fn was_updated(&self) -> bool {
        self.updated_at != self.created_at
    }
}

/// Validated input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Optional due time; never set without `due_date`.
    pub due_time: Option<NaiveTime>,
    /// Urgency.
    pub priority: Priority,
    /// Optional link, never blank.
    pub link: Option<String>,
}

impl NewTask {
    /// Creates a task input with only the required fields set.
    #[must_use]
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            due_date: None,
            due_time: None,
            priority,
            link: None,
        }
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    /// Sets the due time.
    #[must_use]
    pub const fn with_due_time(mut self, time: NaiveTime) -> Self {
        self.due_time = Some(time);
        self
    }

    /// Sets the link.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}
