pub mod detail;
pub mod form;
pub mod places;

use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::ui::theme::Theme;

/// `label: value` row with a focus marker and a caret on the focused field.
pub(crate) fn field_line(
    label: &str,
    value: &str,
    focused: bool,
    theme: &Theme,
) -> Line<'static> {
    let marker = if focused { "› " } else { "  " };
    let label_style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };
    let mut spans = vec![
        Span::styled(format!("{marker}{label}: "), label_style),
        Span::styled(value.to_string(), Style::default().fg(theme.text)),
    ];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(theme.accent)));
    }
    Line::from(spans)
}

pub(crate) fn message_line(text: impl Into<String>, color: ratatui::style::Color) -> Line<'static> {
    Line::from(Span::styled(text.into(), Style::default().fg(color)))
}
