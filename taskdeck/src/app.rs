//! Application state and event handling.
//!
//! Key handling never touches the network: it returns a [`SyncCommand`]
//! for the main loop to forward to the sync worker, and the resulting
//! [`SyncEvent`] is applied later through [`App::apply_sync_event`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskdeck_proto::patch::TaskPatch;
use taskdeck_proto::task::Task;

use crate::form::TaskForm;
use crate::sync::{SyncAction, SyncCommand, SyncEvent, Ticket};
use crate::tasks::{TaskFilter, TaskState};

/// What the user is currently doing.
#[derive(Debug, Clone)]
pub enum Mode {
    /// Browsing the task list.
    Browse,
    /// Filling in the create/edit form.
    Form(TaskForm),
}

/// Severity of a status-bar notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// A confirmed change or other neutral news.
    Info,
    /// A failed command or unreachable server.
    Error,
}

/// A message shown in the status bar until the next one replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity, which picks the color.
    pub kind: NoticeKind,
    /// Text shown after the key help.
    pub text: String,
}

/// Main application state.
pub struct App {
    /// The confirmed task list.
    pub state: TaskState,
    /// Active list filters.
    pub filter: TaskFilter,
    /// Index into the filtered list.
    pub selected: usize,
    /// Browse or form mode.
    pub mode: Mode,
    /// Most recent notice or error.
    pub notice: Option<Notice>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Last ticket handed to a form submission.
    last_ticket: u64,
}

impl App {
    /// Creates an application with an empty, not yet loaded list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: TaskState::new(),
            filter: TaskFilter::default(),
            selected: 0,
            mode: Mode::Browse,
            notice: None,
            should_quit: false,
            last_ticket: 0,
        }
    }

    /// Starts the initial load and returns the command to send.
    pub const fn start(&mut self) -> SyncCommand {
        self.state.begin_load();
        SyncCommand::Load
    }

    /// Whether the loading screen should be shown.
    #[must_use]
    pub const fn show_loading(&self) -> bool {
        self.state.is_loading() && !self.state.is_loaded()
    }

    /// Tasks passing the current filters.
    #[must_use]
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.state.filtered(&self.filter)
    }

    /// The highlighted task, if any.
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_tasks().get(self.selected).copied()
    }

    /// The open form, if any.
    #[must_use]
    pub const fn form(&self) -> Option<&TaskForm> {
        match &self.mode {
            Mode::Form(form) => Some(form),
            Mode::Browse => None,
        }
    }

    /// Shows an informational notice.
    pub fn set_info(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            kind: NoticeKind::Info,
            text: text.into(),
        });
    }

    /// Shows an error notice.
    pub fn set_error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            kind: NoticeKind::Error,
            text: text.into(),
        });
    }

    /// Handle a key event, returning a command when the action needs the
    /// server.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }

        if self.show_loading() {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                self.should_quit = true;
            }
            return None;
        }

        match self.mode {
            Mode::Browse => self.handle_browse_key(key),
            Mode::Form(_) => self.handle_form_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('a') => {
                self.mode = Mode::Form(TaskForm::create());
                None
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(task) = self.selected_task() {
                    self.mode = Mode::Form(TaskForm::edit(task));
                }
                None
            }
            KeyCode::Char(' ') => self
                .selected_task()
                .map(|task| SyncCommand::update(task.id, TaskPatch::completion(!task.is_completed))),
            KeyCode::Char('d') => self.selected_task().map(|task| SyncCommand::Delete(task.id)),
            KeyCode::Char('r') => {
                self.state.begin_load();
                self.set_info("Reloading...");
                Some(SyncCommand::Load)
            }
            KeyCode::Char('f') => {
                self.filter.status = self.filter.status.next();
                self.clamp_selection();
                None
            }
            KeyCode::Char('p') => {
                self.filter.priority = self.filter.priority.next();
                self.clamp_selection();
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.visible_tasks().len() {
                    self.selected += 1;
                }
                None
            }
            _ => None,
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        let ticket = Ticket(self.last_ticket + 1);
        let Mode::Form(form) = &mut self.mode else {
            return None;
        };

        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                None
            }
            KeyCode::BackTab => {
                form.focus_prev();
                None
            }
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                form.focus_prev();
                None
            }
            KeyCode::Tab => {
                form.focus_next();
                None
            }
            KeyCode::Left => {
                form.cycle_priority(false);
                None
            }
            KeyCode::Right => {
                form.cycle_priority(true);
                None
            }
            KeyCode::Backspace => {
                form.backspace();
                None
            }
            KeyCode::Char(c) => {
                form.input(c);
                None
            }
            KeyCode::Enter => {
                if form.is_submitting() {
                    return None;
                }
                match form.submit(ticket) {
                    Ok(Some(cmd)) => {
                        form.error = None;
                        form.pending = Some(ticket);
                        self.last_ticket = ticket.0;
                        Some(cmd)
                    }
                    Ok(None) => {
                        self.mode = Mode::Browse;
                        self.set_info("No changes");
                        None
                    }
                    Err(e) => {
                        form.error = Some(e.to_string());
                        None
                    }
                }
            }
            _ => None,
        }
    }

    /// Called when `cmd` could not be queued for the sync worker.
    pub fn command_not_sent(&mut self, cmd: &SyncCommand, reason: &str) {
        if matches!(cmd, SyncCommand::Load) {
            self.state.load_failed();
        }
        if let Some(form) = self.pending_form(cmd.ticket()) {
            form.pending = None;
            form.error = Some(reason.to_string());
        }
        self.set_error(reason);
    }

    /// Applies a server-confirmed result to local state.
    pub fn apply_sync_event(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Loaded(tasks) => {
                let reload = self.state.is_loaded();
                let count = tasks.len();
                self.state.replace_all(tasks);
                self.clamp_selection();
                if reload {
                    self.set_info(format!("Loaded {count} tasks"));
                }
            }
            SyncEvent::Created { task, ticket } => {
                let title = task.title.clone();
                self.state.insert_created(task);
                if self.pending_form(ticket).is_some() {
                    self.mode = Mode::Browse;
                }
                self.selected = 0;
                self.set_info(format!("Created \"{title}\""));
            }
            SyncEvent::Updated { task, ticket } => {
                let id = task.id;
                let title = task.title.clone();
                if !self.state.replace(task) {
                    tracing::debug!(task_id = %id, "updated task is no longer listed");
                }
                if self.pending_form(ticket).is_some() {
                    self.mode = Mode::Browse;
                }
                self.clamp_selection();
                self.set_info(format!("Updated \"{title}\""));
            }
            SyncEvent::Deleted(id) => {
                if let Some(task) = self.state.remove(id) {
                    self.set_info(format!("Deleted \"{}\"", task.title));
                }
                self.clamp_selection();
            }
            SyncEvent::Failed {
                action,
                ticket,
                message,
                ..
            } => {
                if action == SyncAction::Load {
                    self.state.load_failed();
                }
                if let Some(form) = self.pending_form(ticket) {
                    form.pending = None;
                    form.error = Some(message.clone());
                }
                self.set_error(format!("Could not {}: {message}", action.verb()));
            }
        }
    }

    /// The open form, if it is waiting on `ticket`.
    fn pending_form(&mut self, ticket: Option<Ticket>) -> Option<&mut TaskForm> {
        match &mut self.mode {
            Mode::Form(form) if ticket.is_some() && form.pending == ticket => Some(form),
            _ => None,
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_tasks().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
