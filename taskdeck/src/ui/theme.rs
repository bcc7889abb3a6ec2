//! Theme and styling constants for the TUI.

use ratatui::style::{Color, Modifier, Style};
use taskdeck_proto::task::Priority;

use crate::tasks::DueStatus;

/// Primary foreground color.
pub const FG_PRIMARY: Color = Color::White;

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Highlight color for focused elements.
pub const HIGHLIGHT: Color = Color::Cyan;

/// Success/completed indicator color.
pub const SUCCESS: Color = Color::Green;

/// Due-soon indicator color.
pub const WARNING: Color = Color::Yellow;

/// Overdue and error color.
pub const ERROR: Color = Color::Red;

/// Panel title color for the task list.
pub const TASKS_TITLE: Color = Color::Green;

/// Panel title color for the form.
pub const FORM_TITLE: Color = Color::Cyan;

/// Normal text style.
#[must_use]
pub fn normal() -> Style {
    Style::default().fg(FG_PRIMARY)
}

/// Dimmed text style (timestamps, metadata).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Highlighted text style (focused borders and fields).
#[must_use]
pub fn highlighted() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Selected item style (in lists).
#[must_use]
pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Title of a completed task: dimmed and struck through.
#[must_use]
pub fn completed_title() -> Style {
    dimmed().add_modifier(Modifier::CROSSED_OUT)
}

/// Style for timestamps (dark gray).
#[must_use]
pub fn timestamp() -> Style {
    Style::default().fg(Color::Rgb(120, 120, 120))
}

/// Style for the status bar background (dark background with white foreground).
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 50))
}

/// Style for panel titles with a given color (bold).
#[must_use]
pub fn panel_title(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Badge color for a priority.
#[must_use]
pub const fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Blue,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Rgb(255, 165, 0),
        Priority::Urgent => Color::Red,
    }
}

/// Priority badge style (bold on dark background).
#[must_use]
pub fn priority_badge(priority: Priority) -> Style {
    Style::default()
        .fg(priority_color(priority))
        .bg(Color::Rgb(30, 30, 50))
        .add_modifier(Modifier::BOLD)
}

/// Indicator symbol and style for a derived status, if it has one.
#[must_use]
pub fn due_indicator(status: DueStatus) -> Option<(&'static str, Style)> {
    match status {
        DueStatus::Completed => Some(("\u{2714}", Style::default().fg(SUCCESS))),
        DueStatus::Overdue => Some(("\u{26a0}", Style::default().fg(ERROR))),
        DueStatus::DueSoon => Some(("\u{25f7}", Style::default().fg(WARNING))),
        DueStatus::Normal => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_priority_has_a_distinct_color() {
        let mut colors: Vec<_> = Priority::ALL
            .iter()
            .map(|p| format!("{:?}", priority_color(*p)))
            .collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), Priority::ALL.len());
    }

    #[test]
    fn normal_status_has_no_indicator() {
        assert!(due_indicator(DueStatus::Normal).is_none());
        assert!(due_indicator(DueStatus::Overdue).is_some());
    }
}
