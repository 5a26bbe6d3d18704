use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
};

use api_types::place::Place;

use crate::{
    app::{
        AppState, DetailPage, Load,
        visits::{DATE_FORMAT, VisitDraft, VisitEntry, VisitField, VisitMode, rating_label},
    },
    ui::{
        components::card::Card,
        screens::{field_line, message_line},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let Some(page) = state.detail.as_ref() else {
        return;
    };

    let place = match &page.place {
        Load::Loading => {
            Card::new("Place", &theme).render_with(
                frame,
                area,
                Paragraph::new(message_line("Loading place…", theme.dim)),
            );
            return;
        }
        Load::Failed(message) => {
            Card::new("Place", &theme).render_with(
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
        Load::Loaded(place) => place,
    };

    let new_visit_height = if page.new_visit.is_some() { 7 } else { 0 };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10),
            Constraint::Min(0),
            Constraint::Length(new_visit_height),
        ])
        .split(area);

    render_place(frame, layout[0], page, place, &theme);
    render_visits(frame, layout[1], page, &theme);
    if let Some(form) = &page.new_visit {
        let mut lines = draft_lines(&form.draft, &theme);
        if form.status.is_submitting() {
            lines.push(message_line("Saving…", theme.dim));
        }
        if let Some(error) = form.status.error() {
            lines.push(message_line(error, theme.error));
        }
        Card::new("Add visit", &theme)
            .focused(true)
            .render_with(frame, layout[2], Paragraph::new(lines));
    }
}

fn render_place(
    frame: &mut Frame<'_>,
    area: Rect,
    page: &DetailPage,
    place: &Place,
    theme: &Theme,
) {
    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<12}"), Style::default().fg(theme.text_muted)),
            Span::styled(value, Style::default().fg(theme.text)),
        ])
    };
    let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let tags = if place.tags.is_empty() {
        "-".to_string()
    } else {
        place
            .tags
            .iter()
            .map(|tag| format!("#{tag}"))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut lines = vec![
        row("Cost", place.cost_label().to_string()),
        row("Location", or_dash(&place.location)),
        row("Tags", tags),
        row("Description", or_dash(&place.description)),
        row("Maps", or_dash(&place.google_maps_url)),
        row("Website", or_dash(&place.website_url)),
    ];

    if page.confirm_delete {
        let text = if page.deleting.is_submitting() {
            "Deleting…".to_string()
        } else {
            format!("Delete \"{}\" and all its visits? (y/n)", place.name)
        };
        lines.push(message_line(text, theme.warning));
    } else if let Some(error) = page.deleting.error() {
        lines.push(message_line(error, theme.error));
    }

    Card::new(&place.name, theme).render_with(
        frame,
        area,
        Paragraph::new(lines).wrap(Wrap { trim: false }),
    );
}

fn render_visits(frame: &mut Frame<'_>, area: Rect, page: &DetailPage, theme: &Theme) {
    let card = Card::new("Visits", theme)
        .focused(page.new_visit.is_none())
        .badge(page.visits.len().to_string());
    if page.visits.is_empty() {
        card.render_with(
            frame,
            area,
            Paragraph::new(message_line("No visits yet. Press a to log one.", theme.dim)),
        );
        return;
    }

    let items: Vec<ListItem> = page
        .visits
        .iter()
        .map(|entry| ListItem::new(visit_lines(entry, theme)))
        .collect();
    let mut list_state = ListState::default();
    list_state.select(Some(page.selected));

    let widget = List::new(items)
        .block(card.block())
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("» ");
    frame.render_stateful_widget(widget, area, &mut list_state);
}

fn visit_lines(entry: &VisitEntry, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = match &entry.mode {
        VisitMode::Edit(draft) => draft_lines(draft, theme),
        VisitMode::Display | VisitMode::ConfirmDelete => {
            let visit = &entry.visit;
            vec![Line::from(vec![
                Span::styled(
                    visit.visit_date.format(DATE_FORMAT).to_string(),
                    Style::default().fg(theme.text),
                ),
                Span::raw("  "),
                Span::styled(entry.rating_label(), Style::default().fg(theme.warning)),
                Span::raw("  "),
                Span::styled(
                    visit.notes.clone().unwrap_or_default(),
                    Style::default().fg(theme.text_muted),
                ),
            ])]
        }
    };
    if entry.mode == VisitMode::ConfirmDelete {
        let text = if entry.status.is_submitting() {
            "  Deleting…"
        } else {
            "  Delete this visit? (y/n)"
        };
        lines.push(message_line(text, theme.warning));
    }
    if entry.status.is_submitting() && matches!(entry.mode, VisitMode::Edit(_)) {
        lines.push(message_line("  Saving…", theme.dim));
    }
    if let Some(error) = entry.status.error() {
        lines.push(message_line(format!("  {error}"), theme.error));
    }
    lines
}

fn draft_lines(draft: &VisitDraft, theme: &Theme) -> Vec<Line<'static>> {
    vec![
        field_line("Date", &draft.visit_date, draft.focus == VisitField::Date, theme),
        field_line(
            "Rating",
            &rating_label(draft.rating),
            draft.focus == VisitField::Rating,
            theme,
        ),
        field_line("Notes", &draft.notes, draft.focus == VisitField::Notes, theme),
    ]
}
