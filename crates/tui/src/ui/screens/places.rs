use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
};

use api_types::place::{Cost, Place};

use crate::{
    app::{
        AppState, ListFocus, Load,
        filters::{FilterField, FilterSidebar},
    },
    ui::{
        components::{card::Card, tag_input},
        screens::{field_line, message_line},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(0)])
        .split(area);

    render_sidebar(frame, layout[0], state, &theme);
    render_results(frame, layout[1], state, &theme);
}

fn render_sidebar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let list = &state.list;
    let sidebar = &list.sidebar;
    let filters = &list.filters;
    let active = list.focus == ListFocus::Sidebar;
    let focused = |field: FilterField| active && sidebar.focus == field;

    let mut lines = vec![
        field_line(
            FilterField::Search.label(),
            filters.text_search.as_deref().unwrap_or(""),
            focused(FilterField::Search),
            theme,
        ),
        cost_slider(filters.max_cost, focused(FilterField::MaxCost), theme),
        field_line(FilterField::Tags.label(), "", false, theme),
    ];
    for line in tag_input::lines(
        &sidebar.tags,
        &filters.tags,
        focused(FilterField::Tags),
        theme,
    ) {
        let mut spans = vec![Span::raw("    ")];
        spans.extend(line.spans);
        lines.push(Line::from(spans));
    }
    lines.push(location_toggle(sidebar, focused(FilterField::UseLocation), theme));
    if let Some(notice) = &sidebar.notice {
        lines.push(message_line(format!("    {notice}"), theme.warning));
    }
    lines.push(field_line(
        FilterField::DistanceFrom.label(),
        filters.distance_from.as_deref().unwrap_or(""),
        focused(FilterField::DistanceFrom),
        theme,
    ));
    lines.push(field_line(
        FilterField::Radius.label(),
        &sidebar.radius_input,
        focused(FilterField::Radius),
        theme,
    ));

    Card::new("Filters", theme)
        .focused(active)
        .render_with(frame, area, Paragraph::new(lines));
}

fn cost_slider(max_cost: Option<u8>, focused: bool, theme: &Theme) -> Line<'static> {
    let marker = if focused { "› " } else { "  " };
    let label_style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };
    let mut spans = vec![Span::styled(
        format!("{marker}{}: ", FilterField::MaxCost.label()),
        label_style,
    )];
    for cost in Cost::ALL {
        let style = if Some(cost.ordinal()) == max_cost {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else if max_cost.is_some_and(|max| cost.ordinal() <= max) {
            Style::default().fg(theme.text)
        } else {
            Style::default().fg(theme.dim)
        };
        spans.push(Span::styled(format!(" {} ", cost.label()), style));
    }
    Line::from(spans)
}

fn location_toggle(sidebar: &FilterSidebar, focused: bool, theme: &Theme) -> Line<'static> {
    let marker = if focused { "› " } else { "  " };
    let check = if sidebar.use_current_location {
        "[x]"
    } else {
        "[ ]"
    };
    let mut spans = vec![
        Span::styled(
            format!("{marker}{check} "),
            Style::default().fg(if focused { theme.accent } else { theme.text }),
        ),
        Span::styled(
            FilterField::UseLocation.label(),
            Style::default().fg(theme.text_muted),
        ),
    ];
    if sidebar.locating {
        spans.push(Span::styled(" locating…", Style::default().fg(theme.dim)));
    }
    Line::from(spans)
}

fn render_results(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let list = &state.list;
    let mut card = Card::new("Places", theme).focused(list.focus == ListFocus::Results);
    if let Load::Loaded(places) = &list.places {
        card = card.badge(match places.len() {
            1 => "1 place".to_string(),
            n => format!("{n} places"),
        });
    }

    let places = match &list.places {
        Load::Loading => {
            card.render_with(
                frame,
                area,
                Paragraph::new(message_line("Loading places…", theme.dim)),
            );
            return;
        }
        Load::Failed(message) => {
            card.render_with(
                frame,
                area,
                Paragraph::new(message_line(
                    format!("Could not load places: {message}"),
                    theme.error,
                ))
                .wrap(Wrap { trim: true }),
            );
            return;
        }
        Load::Loaded(places) => places,
    };

    if places.is_empty() {
        card.render_with(
            frame,
            area,
            Paragraph::new(message_line("No places match these filters.", theme.dim)),
        );
        return;
    }

    let items: Vec<ListItem> = places.iter().map(|place| place_item(place, theme)).collect();
    let mut list_state = ListState::default();
    list_state.select(Some(list.selected));

    let widget = List::new(items)
        .block(card.block())
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");

    frame.render_stateful_widget(widget, area, &mut list_state);
}

fn place_item(place: &Place, theme: &Theme) -> ListItem<'static> {
    let mut first = vec![
        Span::styled(place.name.clone(), Style::default().fg(theme.text)),
        Span::raw("  "),
        Span::styled(place.cost_label(), Style::default().fg(theme.warning)),
    ];
    if let Some(location) = &place.location {
        first.push(Span::styled(
            format!("  {location}"),
            Style::default().fg(theme.dim),
        ));
    }

    let tags = if place.tags.is_empty() {
        String::new()
    } else {
        place
            .tags
            .iter()
            .map(|tag| format!("#{tag}"))
            .collect::<Vec<_>>()
            .join(" ")
    };

    ListItem::new(vec![
        Line::from(first),
        Line::from(Span::styled(
            format!("   {tags}"),
            Style::default().fg(theme.accent),
        )),
    ])
}
