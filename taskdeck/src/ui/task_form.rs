//! Create/edit form rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::theme;
use crate::form::{FormField, FormMode, TaskForm};

/// Render the form as a box over `area`.
pub fn render(frame: &mut Frame, area: Rect, form: &TaskForm) {
    let title = match form.mode() {
        FormMode::Create => "New task",
        FormMode::Edit(_) => "Edit task",
    };
    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::FORM_TITLE)))
        .borders(Borders::ALL)
        .border_style(theme::highlighted());

    let mut lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|&field| field_line(form, field))
        .collect();

    lines.push(Line::from(""));
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            theme::normal().fg(theme::ERROR),
        )));
    } else if form.is_submitting() {
        lines.push(Line::from(Span::styled("Saving...", theme::dimmed())));
    }

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn field_line(form: &TaskForm, field: FormField) -> Line<'_> {
    let focused = form.focus == field;
    let label_style = if focused {
        theme::highlighted()
    } else {
        theme::dimmed()
    };
    let marker = if focused { "\u{25b8} " } else { "  " };

    let value = form.value(field);
    let value_span = match field {
        FormField::Priority => Span::styled(
            format!("\u{25c2} {value} \u{25b8}"),
            theme::priority_badge(form.priority),
        ),
        FormField::DueTime if form.due_time_disabled() => {
            Span::styled("(set a due date first)", theme::timestamp())
        }
        _ if value.is_empty() => Span::styled(field.placeholder(), theme::timestamp()),
        _ => Span::styled(value, theme::normal()),
    };

    let mut spans = vec![
        Span::styled(marker, label_style),
        Span::styled(format!("{:<10}", field.label()), label_style),
        value_span,
    ];
    if focused && field != FormField::Priority {
        spans.push(Span::styled("_", theme::highlighted()));
    }
    Line::from(spans)
}
