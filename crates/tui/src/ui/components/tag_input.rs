use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::{
    app::tag_input::{TagInput, TagOption},
    ui::theme::Theme,
};

/// Selected tags as chips, the text buffer, and (when open) the option list.
pub fn lines(
    input: &TagInput,
    selected: &[String],
    focused: bool,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut chips: Vec<Span<'static>> = selected
        .iter()
        .flat_map(|tag| {
            [
                Span::styled(
                    format!("#{tag}"),
                    Style::default().fg(theme.accent),
                ),
                Span::raw(" "),
            ]
        })
        .collect();
    chips.push(Span::styled(
        input.buffer.clone(),
        Style::default().fg(theme.text),
    ));
    if focused {
        chips.push(Span::styled("▏", Style::default().fg(theme.accent)));
    } else if selected.is_empty() && input.buffer.is_empty() {
        chips.push(Span::styled("none", Style::default().fg(theme.dim)));
    }

    let mut lines = vec![Line::from(chips)];
    if !(focused && input.open) {
        return lines;
    }

    let options = input.options(selected);
    if options.is_empty() {
        lines.push(Line::from(Span::styled(
            "  no matching tags",
            Style::default().fg(theme.dim),
        )));
    }
    for (index, option) in options.iter().enumerate() {
        let highlighted = input.highlighted == Some(index);
        let marker = if highlighted { "› " } else { "  " };
        let label = match option {
            TagOption::Existing(tag) => tag.clone(),
            TagOption::Create(tag) => format!("Create \"{tag}\""),
        };
        let mut style = Style::default().fg(theme.text_muted);
        if highlighted {
            style = style.fg(theme.accent).add_modifier(Modifier::BOLD);
        }
        lines.push(Line::from(Span::styled(format!("{marker}{label}"), style)));
    }
    lines
}
