//! Create/edit form state.
//!
//! Fields are edited as plain text and only parsed on submit. In edit mode
//! the submission is diffed against the original task so that only changed
//! fields are sent; a cleared date or link is sent as an explicit `null`.

use chrono::{NaiveDate, NaiveTime};
use taskdeck_proto::patch::{TaskPatch, ValidationError};
use taskdeck_proto::task::{NewTask, Priority, Task, TaskId};
use taskdeck_proto::wire;

use crate::sync::{SyncCommand, Ticket};

/// Focusable form fields, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// Task title.
    Title,
    /// Due date, `YYYY-MM-DD`.
    DueDate,
    /// Due time, `HH:MM`.
    DueTime,
    /// Priority, cycled with the arrow keys.
    Priority,
    /// Related URL.
    Link,
}

impl FormField {
    /// All fields in tab order.
    pub const ALL: [Self; 5] = [
        Self::Title,
        Self::DueDate,
        Self::DueTime,
        Self::Priority,
        Self::Link,
    ];

    /// The field after this one, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Title => Self::DueDate,
            Self::DueDate => Self::DueTime,
            Self::DueTime => Self::Priority,
            Self::Priority => Self::Link,
            Self::Link => Self::Title,
        }
    }

    /// The field before this one, wrapping around.
    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Title => Self::Link,
            Self::DueDate => Self::Title,
            Self::DueTime => Self::DueDate,
            Self::Priority => Self::DueTime,
            Self::Link => Self::Priority,
        }
    }

    /// Label shown next to the field.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::DueDate => "Due date",
            Self::DueTime => "Due time",
            Self::Priority => "Priority",
            Self::Link => "Link",
        }
    }

    /// Input hint shown for an empty field.
    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::Title => "What needs to be done?",
            Self::DueDate => "YYYY-MM-DD",
            Self::DueTime => "HH:MM",
            Self::Priority => "",
            Self::Link => "https://...",
        }
    }
}

/// Whether the form creates a new task or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    /// Adding a task.
    Create,
    /// Editing this task, as it was when the form opened.
    Edit(Box<Task>),
}

/// State of the create/edit form.
#[derive(Debug, Clone)]
pub struct TaskForm {
    mode: FormMode,
    /// Title text.
    pub title: String,
    /// Due date text.
    pub due_date: String,
    /// Due time text; ignored while the due date is blank.
    pub due_time: String,
    /// Selected priority.
    pub priority: Priority,
    /// Link text.
    pub link: String,
    /// Focused field.
    pub focus: FormField,
    /// Last submit error, shown inside the form.
    pub error: Option<String>,
    /// Ticket of the submission in flight, if any.
    pub pending: Option<Ticket>,
}

impl TaskForm {
    /// An empty form for a new task.
    #[must_use]
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            due_date: String::new(),
            due_time: String::new(),
            priority: Priority::default(),
            link: String::new(),
            focus: FormField::Title,
            error: None,
            pending: None,
        }
    }

    /// A form prefilled from `task`.
    #[must_use]
    pub fn edit(task: &Task) -> Self {
        Self {
            mode: FormMode::Edit(Box::new(task.clone())),
            title: task.title.clone(),
            due_date: task.due_date.map(wire::format_date).unwrap_or_default(),
            due_time: task.due_time.map(wire::format_time).unwrap_or_default(),
            priority: task.priority,
            link: task.link.clone().unwrap_or_default(),
            focus: FormField::Title,
            error: None,
            pending: None,
        }
    }

    /// Create or edit, with the original task when editing.
    #[must_use]
    pub const fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Id of the task being edited.
    #[must_use]
    pub fn editing(&self) -> Option<TaskId> {
        match &self.mode {
            FormMode::Create => None,
            FormMode::Edit(task) => Some(task.id),
        }
    }

    /// Text of a field.
    #[must_use]
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::DueDate => &self.due_date,
            FormField::DueTime => &self.due_time,
            FormField::Priority => self.priority.label(),
            FormField::Link => &self.link,
        }
    }

    /// Whether a submission is waiting for the server.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the due time input is currently ignored.
    #[must_use]
    pub fn due_time_disabled(&self) -> bool {
        self.due_date.trim().is_empty()
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::DueDate => Some(&mut self.due_date),
            FormField::DueTime => Some(&mut self.due_time),
            FormField::Link => Some(&mut self.link),
            FormField::Priority => None,
        }
    }

    /// Appends a character to the focused text field.
    pub fn input(&mut self, c: char) {
        if let Some(text) = self.focused_text() {
            text.push(c);
        }
    }

    /// Removes the last character of the focused text field.
    pub fn backspace(&mut self) {
        if let Some(text) = self.focused_text() {
            text.pop();
        }
    }

    /// Moves focus to the next field.
    pub const fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    /// Moves focus to the previous field.
    pub const fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Cycles the priority forward or backward.
    pub const fn cycle_priority(&mut self, forward: bool) {
        self.priority = if forward {
            self.priority.next()
        } else {
            self.priority.prev()
        };
    }

    /// Parses the form into the command to send, tagged with `ticket`.
    ///
    /// Returns `Ok(None)` when editing and nothing changed.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] in the form's fields.
    pub fn submit(&self, ticket: Ticket) -> Result<Option<SyncCommand>, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::TitleRequired);
        }
        let due_date = parse_optional(&self.due_date, wire::parse_date, ValidationError::InvalidDate)?;
        let due_time = if due_date.is_some() {
            parse_optional(&self.due_time, wire::parse_time, ValidationError::InvalidTime)?
        } else {
            None
        };
        let link = Some(self.link.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        match &self.mode {
            FormMode::Create => Ok(Some(SyncCommand::Create {
                task: NewTask {
                    title: title.to_string(),
                    due_date,
                    due_time,
                    priority: self.priority,
                    link,
                },
                ticket: Some(ticket),
            })),
            FormMode::Edit(original) => {
                let patch = TaskPatch {
                    title: changed(&original.title, title.to_string()),
                    due_date: changed(&original.due_date, due_date),
                    due_time: changed(&original.due_time, due_time),
                    priority: changed(&original.priority, self.priority),
                    link: changed(&original.link, link),
                    is_completed: None,
                };
                Ok((!patch.is_empty()).then(|| SyncCommand::Update {
                    id: original.id,
                    patch,
                    ticket: Some(ticket),
                }))
            }
        }
    }
}

fn changed<T: PartialEq>(original: &T, new: T) -> Option<T> {
    (*original != new).then_some(new)
}

fn parse_optional<T>(
    raw: &str,
    parse: fn(&str) -> Option<T>,
    err: ValidationError,
) -> Result<Option<T>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse(raw).map(Some).ok_or(err)
}

/// Due date as shown in the list (`Jan 01, 2024`).
#[must_use]
pub fn display_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

/// Due time as shown in the list (`09:30`).
#[must_use]
pub fn display_time(time: NaiveTime) -> String {
    wire::format_time(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stored() -> Task {
        let now = Utc::now();
        Task {
            id: TaskId::new(),
            title: "Dentist".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            due_time: NaiveTime::from_hms_opt(9, 30, 0),
            priority: Priority::High,
            link: Some("https://dentist.example".to_string()),
            is_completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn type_into(form: &mut TaskForm, field: FormField, text: &str) {
        form.focus = field;
        for c in text.chars() {
            form.input(c);
        }
    }

    #[test]
    fn new_form_defaults_to_medium() {
        let form = TaskForm::create();
        assert_eq!(form.priority, Priority::Medium);
        assert_eq!(form.focus, FormField::Title);
        assert!(form.editing().is_none());
    }

    #[test]
    fn create_builds_new_task() {
        let mut form = TaskForm::create();
        type_into(&mut form, FormField::Title, "  Pay rent ");
        type_into(&mut form, FormField::DueDate, "2024-01-01");
        type_into(&mut form, FormField::DueTime, "18:00");
        form.cycle_priority(true);

        let Ok(Some(SyncCommand::Create { task, .. })) = form.submit(Ticket(1)) else {
            panic!("expected create command");
        };
        assert_eq!(task.title, "Pay rent");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(task.due_time, NaiveTime::from_hms_opt(18, 0, 0));
        assert_eq!(task.link, None);
    }

    #[test]
    fn time_is_ignored_without_date() {
        let mut form = TaskForm::create();
        type_into(&mut form, FormField::Title, "Call");
        type_into(&mut form, FormField::DueTime, "10:00");
        assert!(form.due_time_disabled());

        let Ok(Some(SyncCommand::Create { task, .. })) = form.submit(Ticket(1)) else {
            panic!("expected create command");
        };
        assert_eq!(task.due_time, None);
    }

    #[test]
    fn blank_title_and_bad_date_are_rejected() {
        let form = TaskForm::create();
        assert!(matches!(form.submit(Ticket(1)), Err(ValidationError::TitleRequired)));

        let mut form = TaskForm::create();
        type_into(&mut form, FormField::Title, "x");
        type_into(&mut form, FormField::DueDate, "tomorrow");
        assert!(matches!(form.submit(Ticket(1)), Err(ValidationError::InvalidDate)));
    }

    #[test]
    fn edit_without_changes_sends_nothing() {
        let form = TaskForm::edit(&stored());
        assert!(matches!(form.submit(Ticket(1)), Ok(None)));
    }

    #[test]
    fn edit_sends_only_changed_fields() {
        let task = stored();
        let mut form = TaskForm::edit(&task);
        form.focus = FormField::Title;
        form.input('!');
        form.cycle_priority(false);

        let Ok(Some(SyncCommand::Update { id, patch, ticket })) = form.submit(Ticket(4)) else {
            panic!("expected update command");
        };
        assert_eq!(id, task.id);
        assert_eq!(ticket, Some(Ticket(4)));
        assert_eq!(patch.title.as_deref(), Some("Dentist!"));
        assert_eq!(patch.priority, Some(Priority::Medium));
        assert_eq!(patch.due_date, None);
        assert_eq!(patch.link, None);
        assert_eq!(patch.is_completed, None);
    }

    #[test]
    fn clearing_date_sends_null_for_date_and_time() {
        let task = stored();
        let mut form = TaskForm::edit(&task);
        form.due_date.clear();

        let Ok(Some(SyncCommand::Update { patch, .. })) = form.submit(Ticket(1)) else {
            panic!("expected update command");
        };
        assert_eq!(patch.due_date, Some(None));
        assert_eq!(patch.due_time, Some(None));
        assert!(patch.validate_against(&task).is_ok());
    }

    #[test]
    fn clearing_link_sends_null() {
        let mut form = TaskForm::edit(&stored());
        form.link = "   ".to_string();
        let Ok(Some(SyncCommand::Update { patch, .. })) = form.submit(Ticket(1)) else {
            panic!("expected update command");
        };
        assert_eq!(patch.link, Some(None));
    }

    #[test]
    fn typing_on_priority_field_is_ignored() {
        let mut form = TaskForm::create();
        form.focus = FormField::Priority;
        form.input('z');
        form.backspace();
        assert_eq!(form.priority, Priority::Medium);
        assert!(form.title.is_empty());
    }

    #[test]
    fn focus_wraps_both_ways() {
        for field in FormField::ALL {
            assert_eq!(field.next().prev(), field);
        }
        assert_eq!(FormField::Link.next(), FormField::Title);
    }

    #[test]
    fn display_formats() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(display_date(date), "Jan 01, 2024");
        assert_eq!(display_time(NaiveTime::from_hms_opt(9, 5, 0).unwrap()), "09:05");
    }
}
