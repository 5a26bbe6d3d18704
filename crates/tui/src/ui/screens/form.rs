use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use api_types::place::Cost;

use crate::{
    app::{
        AppState, Load,
        form::FormStatus,
        place_form::{FormMode, PlaceField, PlaceForm},
    },
    ui::{
        components::{card::Card, tag_input},
        screens::{field_line, message_line},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let Some(page) = state.form.as_ref() else {
        return;
    };

    let form = match &page.form {
        Load::Loading => {
            Card::new("Edit place", &theme).render_with(
                frame,
                area,
                Paragraph::new(message_line("Loading place…", theme.dim)),
            );
            return;
        }
        Load::Failed(message) => {
            Card::new("Edit place", &theme).render_with(
                frame,
                area,
                Paragraph::new(message_line(
                    format!("Could not load place: {message}"),
                    theme.error,
                ))
                .wrap(Wrap { trim: true }),
            );
            return;
        }
        Load::Loaded(form) => form,
    };

    let title = match form.mode {
        FormMode::Create => "New place",
        FormMode::Edit(_) => "Edit place",
    };
    Card::new(title, &theme)
        .focused(true)
        .render_with(frame, area, Paragraph::new(form_lines(form, &theme)));
}

fn form_lines(form: &PlaceForm, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for field in PlaceField::ORDER {
        let focused = form.focus == field;
        let text = |value: &str| field_line(field.label(), value, focused, theme);
        match field {
            PlaceField::Name => {
                lines.push(text(&form.name));
                if form.google_place_id.is_some() {
                    lines.push(message_line("    linked to a Google place", theme.dim));
                }
                lines.extend(suggestion_lines(form, focused, theme));
            }
            PlaceField::Location => lines.push(text(&form.location)),
            PlaceField::Description => lines.push(text(&form.description)),
            PlaceField::MapsUrl => lines.push(text(&form.google_maps_url)),
            PlaceField::WebsiteUrl => lines.push(text(&form.website_url)),
            PlaceField::Tags => {
                lines.push(field_line(field.label(), "", false, theme));
                for line in tag_input::lines(&form.tag_input, &form.tags, focused, theme) {
                    let mut spans = vec![Span::raw("    ")];
                    spans.extend(line.spans);
                    lines.push(Line::from(spans));
                }
            }
            PlaceField::Cost => lines.push(cost_line(form.cost, focused, theme)),
        }
    }

    lines.push(Line::raw(""));
    match &form.status {
        FormStatus::Idle => {}
        FormStatus::Submitting => lines.push(message_line("Saving…", theme.dim)),
        FormStatus::Error(message) => lines.push(message_line(message.clone(), theme.error)),
    }
    lines
}

fn suggestion_lines(form: &PlaceForm, focused: bool, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(notice) = &form.address.notice {
        lines.push(message_line(format!("    {notice}"), theme.warning));
    }
    if !focused {
        return lines;
    }
    for (index, suggestion) in form.address.suggestions.iter().enumerate() {
        let highlighted = form.address.highlighted == Some(index);
        let marker = if highlighted { "    › " } else { "      " };
        let main_style = if highlighted {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        let mut spans = vec![Span::styled(
            format!("{marker}{}", suggestion.main_text),
            main_style,
        )];
        if let Some(secondary) = &suggestion.secondary_text {
            spans.push(Span::styled(
                format!("  {secondary}"),
                Style::default().fg(theme.dim),
            ));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn cost_line(cost: Option<Cost>, focused: bool, theme: &Theme) -> Line<'static> {
    let marker = if focused { "› " } else { "  " };
    let label_style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };
    let mut spans = vec![Span::styled(
        format!("{marker}{}: ", PlaceField::Cost.label()),
        label_style,
    )];
    for option in Cost::ALL {
        let style = if cost == Some(option) {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(theme.dim)
        };
        spans.push(Span::styled(format!(" {} ", option.label()), style));
    }
    if cost.is_none() {
        spans.push(Span::styled("  unset", Style::default().fg(theme.dim)));
    }
    Line::from(spans)
}
