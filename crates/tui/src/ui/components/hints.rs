use ratatui::{style::Style, text::Span};

use crate::ui::theme::Theme;

/// A keyboard hint consisting of a key and its action.
#[derive(Debug, Clone)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

pub fn hints_to_spans(hints: &[KeyHint], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(theme.accent)));
        spans.push(Span::raw(format!(" {}", hint.action)));
    }

    spans
}

pub fn hint_separator(theme: &Theme) -> Span<'static> {
    Span::styled("  │  ", Style::default().fg(theme.border))
}

pub mod common {
    use super::KeyHint;

    pub fn results() -> Vec<KeyHint> {
        vec![
            KeyHint::new("↑↓", "select"),
            KeyHint::new("Enter", "open"),
            KeyHint::new("/", "filters"),
            KeyHint::new("n", "new place"),
            KeyHint::new("r", "reload"),
        ]
    }

    pub fn sidebar() -> Vec<KeyHint> {
        vec![
            KeyHint::new("Tab", "next"),
            KeyHint::new("←→", "cost"),
            KeyHint::new("Space", "toggle"),
            KeyHint::new("Esc", "results"),
        ]
    }

    pub fn detail() -> Vec<KeyHint> {
        vec![
            KeyHint::new("e", "edit"),
            KeyHint::new("a", "add visit"),
            KeyHint::new("v", "edit visit"),
            KeyHint::new("x", "delete visit"),
            KeyHint::new("D", "delete place"),
            KeyHint::new("b", "back"),
        ]
    }

    pub fn confirm() -> Vec<KeyHint> {
        vec![KeyHint::new("y", "confirm"), KeyHint::new("n", "cancel")]
    }

    pub fn form_editing() -> Vec<KeyHint> {
        vec![
            KeyHint::new("Tab", "next"),
            KeyHint::new("Enter", "save"),
            KeyHint::new("Esc", "cancel"),
        ]
    }

    pub fn place_form() -> Vec<KeyHint> {
        vec![
            KeyHint::new("Tab", "next"),
            KeyHint::new("↑↓", "suggestions"),
            KeyHint::new("←→", "cost"),
            KeyHint::new("Enter", "pick/save"),
            KeyHint::new("Esc", "close/cancel"),
        ]
    }
}
