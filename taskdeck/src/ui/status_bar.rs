//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, Mode, NoticeKind};

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = match app.mode {
        Mode::Browse => {
            "a: add | e: edit | space: toggle | d: delete | r: reload | f/p: filter | q: quit"
        }
        Mode::Form(_) => "Tab: next field | \u{2190}\u{2192}: priority | Enter: save | Esc: cancel",
    };

    let mut spans = vec![Span::styled(help_text, theme::dimmed())];
    if let Some(notice) = &app.notice {
        let color = match notice.kind {
            NoticeKind::Info => theme::SUCCESS,
            NoticeKind::Error => theme::ERROR,
        };
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(notice.text.as_str(), theme::normal().fg(color)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
