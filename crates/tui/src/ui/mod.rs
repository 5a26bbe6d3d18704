pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::app::{AppState, ListFocus, Screen};

use self::components::hints::{self, KeyHint};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let theme = Theme::default();
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background)),
        area,
    );

    // Info bar, content, bottom bar
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    match state.screen {
        Screen::List => screens::places::render(frame, layout[1], state),
        Screen::Detail(_) => screens::detail::render(frame, layout[1], state),
        Screen::NewPlace | Screen::EditPlace(_) => screens::form::render(frame, layout[1], state),
    }
    render_bottom_bar(frame, layout[2], state, &theme);
    components::toast::render(frame, area, state.toast.as_ref());
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let page = match state.screen {
        Screen::List => "Places".to_string(),
        Screen::Detail(id) => format!("Place #{id}"),
        Screen::NewPlace => "New place".to_string(),
        Screen::EditPlace(id) => format!("Edit place #{id}"),
    };

    let line = Line::from(vec![
        Span::styled(
            "Voyager",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Server", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.base_url)),
        Span::styled("View", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {page}")),
    ]);

    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme.surface)),
        area,
    );
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut parts = hints::hints_to_spans(&context_hints(state), theme);

    parts.push(hints::hint_separator(theme));
    let quit = if state.is_typing() {
        KeyHint::new("Ctrl+C", "quit")
    } else {
        KeyHint::new("q", "quit")
    };
    parts.extend(hints::hints_to_spans(&[quit], theme));

    frame.render_widget(
        Paragraph::new(Line::from(parts)).style(Style::default().bg(theme.surface)),
        area,
    );
}

fn context_hints(state: &AppState) -> Vec<KeyHint> {
    match state.screen {
        Screen::List => match state.list.focus {
            ListFocus::Results => hints::common::results(),
            ListFocus::Sidebar => hints::common::sidebar(),
        },
        Screen::Detail(_) => {
            let Some(page) = state.detail.as_ref() else {
                return Vec::new();
            };
            let confirming = page.confirm_delete
                || page.selected_visit().is_some_and(|entry| {
                    entry.mode == crate::app::visits::VisitMode::ConfirmDelete
                });
            if confirming {
                hints::common::confirm()
            } else if page.is_editing() {
                hints::common::form_editing()
            } else {
                hints::common::detail()
            }
        }
        Screen::NewPlace | Screen::EditPlace(_) => hints::common::place_form(),
    }
}
