//! Task list rendering.

use chrono::{DateTime, Local, NaiveDate, Utc};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use taskdeck_proto::task::Task;

use super::theme;
use crate::app::App;
use crate::form::{display_date, display_time};
use crate::tasks::{DueStatus, StatusFilter};

/// Render the filtered task list, or the empty-state message.
pub fn render(frame: &mut Frame, area: Rect, app: &App, today: NaiveDate) {
    let block = Block::default()
        .title(Span::styled("Tasks", theme::panel_title(theme::TASKS_TITLE)))
        .borders(Borders::ALL)
        .border_style(theme::normal());

    let tasks = app.visible_tasks();
    if tasks.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("No tasks found", theme::bold())),
            Line::from(Span::styled(empty_message(app.filter.status), theme::dimmed())),
        ];
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| ListItem::new(task_lines(task, today)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme::selected());
    let mut state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Message shown when no task passes the filters.
#[must_use]
pub fn empty_message(status: StatusFilter) -> String {
    match status {
        StatusFilter::All => "Add your first task to get started!".to_string(),
        other => format!("No {} tasks to show.", other.label()),
    }
}

fn task_lines(task: &Task, today: NaiveDate) -> Vec<Line<'static>> {
    let status = DueStatus::of(task, today);
    let checkbox = if task.is_completed { "[\u{2713}]" } else { "[ ]" };
    let title_style = if task.is_completed {
        theme::completed_title()
    } else {
        theme::normal()
    };

    let mut first = vec![
        Span::styled(checkbox, title_style),
        Span::raw(" "),
        Span::styled(task.title.clone(), title_style),
        Span::raw(" "),
        Span::styled(format!(" {} ", task.priority.label()), theme::priority_badge(task.priority)),
    ];

    if let Some((symbol, style)) = theme::due_indicator(status) {
        first.push(Span::raw(" "));
        first.push(Span::styled(symbol, style));
    }
    if let Some(date) = task.due_date {
        let mut due = display_date(date);
        if let Some(time) = task.due_time {
            due.push(' ');
            due.push_str(&display_time(time));
        }
        let style = match status {
            DueStatus::Overdue => theme::normal().fg(theme::ERROR),
            DueStatus::DueSoon => theme::normal().fg(theme::WARNING),
            DueStatus::Completed | DueStatus::Normal => theme::dimmed(),
        };
        first.push(Span::raw(" "));
        first.push(Span::styled(due, style));
    }
    if let Some(link) = &task.link {
        first.push(Span::raw(" "));
        first.push(Span::styled(format!("\u{2197} {link}"), theme::dimmed()));
    }

    let created = local_timestamp(task.created_at);
    let footer = if task.was_updated() {
        format!(
            "    Created {created} \u{b7} Updated {}",
            local_timestamp(task.updated_at)
        )
    } else {
        format!("    Created {created}")
    };

    vec![Line::from(first), Line::from(Span::styled(footer, theme::timestamp()))]
}

fn local_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%b %d, %Y %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_depends_on_status_filter() {
        assert_eq!(
            empty_message(StatusFilter::All),
            "Add your first task to get started!"
        );
        assert_eq!(
            empty_message(StatusFilter::Completed),
            "No completed tasks to show."
        );
        assert_eq!(empty_message(StatusFilter::Active), "No active tasks to show.");
    }
}
