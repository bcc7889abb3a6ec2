//! Terminal UI rendering.

pub mod header;
pub mod status_bar;
pub mod task_form;
pub mod task_list;
pub mod theme;

use chrono::NaiveDate;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App, today: NaiveDate) {
    // Header, content, status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    header::render(frame, chunks[0], app);

    if app.show_loading() {
        render_loading(frame, chunks[1]);
    } else {
        task_list::render(frame, chunks[1], app, today);
        if let Some(form) = app.form() {
            task_form::render(frame, centered(chunks[1], 60, 10), form);
        }
    }

    status_bar::render(frame, chunks[2], app);
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("Loading tasks...", theme::dimmed())),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

/// A `width` x `height` rectangle centered in `area`, clipped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
