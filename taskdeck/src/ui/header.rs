//! Header with counts and the active filters.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::app::App;

/// Render the header: title, counts and filters.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let counts = app.state.counts();

    let counts_line = Line::from(vec![
        Span::styled("Taskdeck", theme::bold()),
        Span::raw("  "),
        Span::styled(format!("{} total", counts.total), theme::normal()),
        Span::raw(" \u{b7} "),
        Span::styled(
            format!("{} completed", counts.completed),
            theme::normal().fg(theme::SUCCESS),
        ),
        Span::raw(" \u{b7} "),
        Span::styled(format!("{} remaining", counts.remaining), theme::normal()),
    ]);

    let filters_line = Line::from(vec![
        Span::styled("Status: ", theme::dimmed()),
        Span::styled(app.filter.status.label(), theme::highlighted()),
        Span::styled("   Priority: ", theme::dimmed()),
        Span::styled(app.filter.priority.label(), theme::highlighted()),
    ]);

    let paragraph = Paragraph::new(vec![counts_line, filters_line])
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(paragraph, area);
}
