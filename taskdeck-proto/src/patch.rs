//! Request bodies for creating and partially updating tasks.
//!
//! Request bodies carry raw wire values so that the server can report
//! precise validation errors instead of generic decoding failures. Calling
//! `validate` turns a body into the typed [`NewTask`] or [`TaskPatch`].
//!
//! Partial updates distinguish three states per field through [`Field`]:
//! absent (leave untouched), explicit `null` (clear), and a value (set).

use chrono::{NaiveDate, NaiveTime};
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::task::{NewTask, Priority, Task};
use crate::wire;

/// Reasons a create or update request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The title is missing or blank.
    #[error("Title is required")]
    TitleRequired,
    /// A create request without a priority.
    #[error("Priority is required")]
    PriorityRequired,
    /// The priority is not one of the known names.
    #[error("Invalid priority value")]
    InvalidPriority,
    /// The due date is not a recognizable date.
    #[error("Invalid dueDate value")]
    InvalidDate,
    /// The due time is not a recognizable time.
    #[error("Invalid dueTime value")]
    InvalidTime,
    /// The resulting task would have a due time but no due date.
    #[error("dueTime requires dueDate")]
    TimeWithoutDate,
    /// A non-nullable field was sent as `null`.
    #[error("{0} cannot be null")]
    NullField(&'static str),
}

/// A request field that may be absent, explicitly `null`, or set.
///
/// Use with `#[serde(default, skip_serializing_if = "Field::is_missing")]`
/// so that an absent key deserializes to [`Field::Missing`] and is omitted
/// again on serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    /// The key was not sent.
    Missing,
    /// The key was sent as `null`.
    Null,
    /// The key was sent with a value.
    Value(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Missing
    }
}

impl<T> Field<T> {
    /// Whether the key was absent.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Collapses to the patch representation: `None` when absent,
    /// `Some(None)` for `null`, `Some(Some(v))` for a value.
    pub fn into_patch(self) -> Option<Option<T>> {
        match self {
            Self::Missing => None,
            Self::Null => Some(None),
            Self::Value(v) => Some(Some(v)),
        }
    }

    /// Builds a field from the patch representation.
    pub fn from_patch(value: Option<Option<T>>) -> Self {
        match value {
            None => Self::Missing,
            Some(None) => Self::Null,
            Some(Some(v)) => Self::Value(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        // Only reached when the key is present; absence is handled by `default`.
        Ok(Option::<T>::deserialize(d)?.map_or(Self::Null, Self::Value))
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Missing | Self::Null => s.serialize_none(),
            Self::Value(v) => s.serialize_some(v),
        }
    }
}

/// A priority exactly as it arrived on the wire.
///
/// Any JSON value is accepted so that numbers, booleans or objects are
/// rejected as an invalid priority rather than as an undecodable body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorityName {
    /// A string, not yet checked against the known names.
    Name(String),
    /// Any non-string value.
    NotAString,
}

impl PriorityName {
    fn validate(&self) -> Result<Priority, ValidationError> {
        match self {
            Self::Name(raw) => validate_priority(raw),
            Self::NotAString => Err(ValidationError::InvalidPriority),
        }
    }
}

impl From<&str> for PriorityName {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<Priority> for PriorityName {
    fn from(priority: Priority) -> Self {
        Self::Name(priority.as_str().to_string())
    }
}

impl<'de> Deserialize<'de> for PriorityName {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_any(PriorityNameVisitor)
    }
}

struct PriorityNameVisitor;

impl<'de> Visitor<'de> for PriorityNameVisitor {
    type Value = PriorityName;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(PriorityName::Name(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(PriorityName::Name(v))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(PriorityName::NotAString)
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Ok(PriorityName::NotAString)
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Ok(PriorityName::NotAString)
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(PriorityName::NotAString)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(PriorityName::NotAString)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(PriorityName::NotAString)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(PriorityName::NotAString)
    }
}

impl Serialize for PriorityName {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Name(name) => s.serialize_str(name),
            Self::NotAString => s.serialize_unit(),
        }
    }
}

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Task title; required.
    #[serde(default)]
    pub title: String,
    /// `YYYY-MM-DD` or RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// `HH:MM` or RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
    /// Priority wire name; required.
    #[serde(default)]
    pub priority: Option<PriorityName>,
    /// Optional link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl CreateTaskRequest {
    /// Validates the body into a [`NewTask`].
    ///
    /// The title and link are trimmed; a blank link becomes absent.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(self) -> Result<NewTask, ValidationError> {
        let title = validate_title(&self.title)?;
        let priority = self
            .priority
            .as_ref()
            .ok_or(ValidationError::PriorityRequired)
            .and_then(PriorityName::validate)?;
        let due_date = self.due_date.as_deref().map(validate_date).transpose()?;
        let due_time = self.due_time.as_deref().map(validate_time).transpose()?;
        if due_time.is_some() && due_date.is_none() {
            return Err(ValidationError::TimeWithoutDate);
        }

        Ok(NewTask {
            title,
            due_date,
            due_time,
            priority,
            link: self.link.as_deref().and_then(normalize_link),
        })
    }
}

impl From<&NewTask> for CreateTaskRequest {
    fn from(task: &NewTask) -> Self {
        Self {
            title: task.title.clone(),
            due_date: task.due_date.map(wire::format_date),
            due_time: task.due_time.map(wire::format_time),
            priority: Some(task.priority.into()),
            link: task.link.clone(),
        }
    }
}

/// Body of `PATCH /api/tasks/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    /// New title.
    #[serde(default, skip_serializing_if = "Field::is_missing")]
    pub title: Field<String>,
    /// New due date, or `null` to clear.
    #[serde(default, skip_serializing_if = "Field::is_missing")]
    pub due_date: Field<String>,
    /// New due time, or `null` to clear.
    #[serde(default, skip_serializing_if = "Field::is_missing")]
    pub due_time: Field<String>,
    /// New priority wire name.
    #[serde(default, skip_serializing_if = "Field::is_missing")]
    pub priority: Field<PriorityName>,
    /// New link, or `null` to clear.
    #[serde(default, skip_serializing_if = "Field::is_missing")]
    pub link: Field<String>,
    /// New completion flag.
    #[serde(default, skip_serializing_if = "Field::is_missing")]
    pub is_completed: Field<bool>,
}

impl UpdateTaskRequest {
    /// Validates the body into a [`TaskPatch`].
    ///
    /// Field-level checks only; the due-time-requires-due-date rule depends
    /// on the stored task and is checked by [`TaskPatch::validate_against`].
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(self) -> Result<TaskPatch, ValidationError> {
        let title = match self.title {
            Field::Missing => None,
            Field::Null => return Err(ValidationError::NullField("title")),
            Field::Value(raw) => Some(validate_title(&raw)?),
        };
        let priority = match self.priority {
            Field::Missing => None,
            Field::Null => return Err(ValidationError::NullField("priority")),
            Field::Value(raw) => Some(raw.validate()?),
        };
        let is_completed = match self.is_completed {
            Field::Missing => None,
            Field::Null => return Err(ValidationError::NullField("isCompleted")),
            Field::Value(done) => Some(done),
        };
        let due_date = self
            .due_date
            .into_patch()
            .map(|d| d.as_deref().map(validate_date).transpose())
            .transpose()?;
        let due_time = self
            .due_time
            .into_patch()
            .map(|t| t.as_deref().map(validate_time).transpose())
            .transpose()?;
        let link = self
            .link
            .into_patch()
            .map(|l| l.as_deref().and_then(normalize_link));

        Ok(TaskPatch {
            title,
            due_date,
            due_time,
            priority,
            link,
            is_completed,
        })
    }
}

impl From<&TaskPatch> for UpdateTaskRequest {
    fn from(patch: &TaskPatch) -> Self {
        Self {
            title: Field::from_patch(patch.title.clone().map(Some)),
            due_date: Field::from_patch(patch.due_date.map(|d| d.map(wire::format_date))),
            due_time: Field::from_patch(patch.due_time.map(|t| t.map(wire::format_time))),
            priority: Field::from_patch(patch.priority.map(|p| Some(p.into()))),
            link: Field::from_patch(patch.link.clone()),
            is_completed: Field::from_patch(patch.is_completed.map(Some)),
        }
    }
}

/// A validated partial update.
///
/// `None` leaves a field untouched. For nullable fields `Some(None)` clears
/// the value and `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<String>,
    /// New due date or clear.
    pub due_date: Option<Option<NaiveDate>>,
    /// New due time or clear.
    pub due_time: Option<Option<NaiveTime>>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New link or clear.
    pub link: Option<Option<String>>,
    /// New completion flag.
    pub is_completed: Option<bool>,
}

impl TaskPatch {
    /// A patch that only changes the completion flag.
    #[must_use]
    pub fn completion(done: bool) -> Self {
        Self {
            is_completed: Some(done),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Writes every present field into `task`. Timestamps are not touched.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(due_time) = self.due_time {
            task.due_time = due_time;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(link) = &self.link {
            task.link.clone_from(link);
        }
        if let Some(done) = self.is_completed {
            task.is_completed = done;
        }
    }

    /// Checks the rules that depend on the task being patched.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TimeWithoutDate`] if applying the patch
    /// would leave a due time without a due date.
    pub fn validate_against(&self, task: &Task) -> Result<(), ValidationError> {
        let due_date = self.due_date.unwrap_or(task.due_date);
        let due_time = self.due_time.unwrap_or(task.due_time);
        if due_time.is_some() && due_date.is_none() {
            return Err(ValidationError::TimeWithoutDate);
        }
        Ok(())
    }
}

fn validate_title(raw: &str) -> Result<String, ValidationError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    Ok(title.to_string())
}

fn validate_priority(raw: &str) -> Result<Priority, ValidationError> {
    raw.parse().map_err(|_| ValidationError::InvalidPriority)
}

fn validate_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    wire::parse_date(raw).ok_or(ValidationError::InvalidDate)
}

fn validate_time(raw: &str) -> Result<NaiveTime, ValidationError> {
    wire::parse_time(raw).ok_or(ValidationError::InvalidTime)
}

fn normalize_link(raw: &str) -> Option<String> {
    let link = raw.trim();
    (!link.is_empty()).then(|| link.to_string())
}
