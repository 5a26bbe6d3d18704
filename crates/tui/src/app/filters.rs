use api_types::{filter::Filters, place::Cost};

use super::{
    latest::{Latest, Ticket},
    tag_input::TagInput,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Search,
    MaxCost,
    Tags,
    UseLocation,
    DistanceFrom,
    Radius,
}

impl FilterField {
    const ORDER: [FilterField; 6] = [
        Self::Search,
        Self::MaxCost,
        Self::Tags,
        Self::UseLocation,
        Self::DistanceFrom,
        Self::Radius,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Search => "Search",
            Self::MaxCost => "Max cost",
            Self::Tags => "Tags",
            Self::UseLocation => "Use current location",
            Self::DistanceFrom => "Distance from",
            Self::Radius => "Radius (km)",
        }
    }

    fn index(self) -> usize {
        Self::ORDER
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// What a sidebar interaction asks of the list page.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEdit {
    Changed(Filters),
    Locate(Ticket),
    Unchanged,
}

/// Input state for the filter controls. The [`Filters`] value stays with the
/// list page; every edit hands back a copy with exactly one field changed.
#[derive(Debug)]
pub struct FilterSidebar {
    pub focus: FilterField,
    pub tags: TagInput,
    pub use_current_location: bool,
    pub radius_input: String,
    pub locating: bool,
    pub notice: Option<String>,
    locate: Latest,
}

impl FilterSidebar {
    pub fn new(filters: &Filters) -> Self {
        Self {
            focus: FilterField::Search,
            tags: TagInput::default(),
            use_current_location: false,
            radius_input: filters
                .radius_km
                .map(|radius| radius.to_string())
                .unwrap_or_default(),
            locating: false,
            notice: None,
            locate: Latest::default(),
        }
    }

    pub fn next_field(&mut self) {
        self.tags.close();
        self.focus = self.focus.next();
    }

    pub fn prev_field(&mut self) {
        self.tags.close();
        self.focus = self.focus.prev();
    }

    pub fn input(&mut self, ch: char, filters: &Filters) -> FilterEdit {
        match self.focus {
            FilterField::Search => {
                let mut text = filters.text_search.clone().unwrap_or_default();
                text.push(ch);
                changed(filters, |next| next.text_search = non_empty(text))
            }
            FilterField::DistanceFrom => {
                let mut text = filters.distance_from.clone().unwrap_or_default();
                text.push(ch);
                changed(filters, |next| next.distance_from = non_empty(text))
            }
            FilterField::Radius => {
                if !(ch.is_ascii_digit() || ch == '.') {
                    return FilterEdit::Unchanged;
                }
                self.radius_input.push(ch);
                self.radius_edit(filters)
            }
            FilterField::Tags => {
                let mut tags = filters.tags.clone();
                if self.tags.input(ch, &mut tags) {
                    changed(filters, |next| next.tags = tags)
                } else {
                    FilterEdit::Unchanged
                }
            }
            FilterField::UseLocation if ch == ' ' => self.toggle_location(),
            FilterField::UseLocation | FilterField::MaxCost => FilterEdit::Unchanged,
        }
    }

    pub fn backspace(&mut self, filters: &Filters) -> FilterEdit {
        match self.focus {
            FilterField::Search => {
                let mut text = filters.text_search.clone().unwrap_or_default();
                if text.pop().is_none() {
                    return FilterEdit::Unchanged;
                }
                changed(filters, |next| next.text_search = non_empty(text))
            }
            FilterField::DistanceFrom => {
                let mut text = filters.distance_from.clone().unwrap_or_default();
                if text.pop().is_none() {
                    return FilterEdit::Unchanged;
                }
                changed(filters, |next| next.distance_from = non_empty(text))
            }
            FilterField::Radius => {
                if self.radius_input.pop().is_none() {
                    return FilterEdit::Unchanged;
                }
                self.radius_edit(filters)
            }
            FilterField::Tags => {
                let mut tags = filters.tags.clone();
                if self.tags.backspace(&mut tags) {
                    changed(filters, |next| next.tags = tags)
                } else {
                    FilterEdit::Unchanged
                }
            }
            FilterField::UseLocation | FilterField::MaxCost => FilterEdit::Unchanged,
        }
    }

    /// Enter: commits a tag, or flips the location toggle.
    pub fn submit(&mut self, filters: &Filters) -> FilterEdit {
        match self.focus {
            FilterField::Tags => {
                let mut tags = filters.tags.clone();
                if self.tags.commit(&mut tags) {
                    changed(filters, |next| next.tags = tags)
                } else {
                    FilterEdit::Unchanged
                }
            }
            FilterField::UseLocation => self.toggle_location(),
            _ => FilterEdit::Unchanged,
        }
    }

    /// Moves the max-cost slider by one step.
    pub fn slide(&mut self, filters: &Filters, step: i8) -> FilterEdit {
        if self.focus != FilterField::MaxCost {
            return FilterEdit::Unchanged;
        }
        let top = Cost::High.ordinal();
        let current = filters.max_cost.unwrap_or(top).min(top);
        let next = current.saturating_add_signed(step).min(top);
        if next == current {
            return FilterEdit::Unchanged;
        }
        changed(filters, |filters| filters.max_cost = Some(next))
    }

    pub fn highlight(&mut self, filters: &Filters, down: bool) {
        if self.focus != FilterField::Tags {
            return;
        }
        if down {
            self.tags.highlight_next(&filters.tags);
        } else {
            self.tags.highlight_prev();
        }
    }

    fn radius_edit(&self, filters: &Filters) -> FilterEdit {
        let radius = if self.radius_input.trim().is_empty() {
            None
        } else {
            match self.radius_input.trim().parse::<f64>() {
                Ok(radius) => Some(radius),
                Err(_) => return FilterEdit::Unchanged,
            }
        };
        if radius == filters.radius_km {
            return FilterEdit::Unchanged;
        }
        changed(filters, |next| next.radius_km = radius)
    }

    fn toggle_location(&mut self) -> FilterEdit {
        self.use_current_location = !self.use_current_location;
        self.notice = None;
        if self.use_current_location {
            self.locating = true;
            FilterEdit::Locate(self.locate.issue())
        } else {
            self.locating = false;
            self.locate.invalidate();
            FilterEdit::Unchanged
        }
    }

    /// Applies a locate response. Ignored once the toggle is off or a newer
    /// request has been issued.
    pub fn located(
        &mut self,
        ticket: Ticket,
        result: Result<String, String>,
        filters: &Filters,
    ) -> FilterEdit {
        if !self.use_current_location || !self.locate.is_current(ticket) {
            return FilterEdit::Unchanged;
        }
        self.locating = false;
        match result {
            Ok(position) => changed(filters, |next| next.distance_from = Some(position)),
            Err(message) => {
                self.notice = Some(message);
                FilterEdit::Unchanged
            }
        }
    }
}

fn changed(filters: &Filters, edit: impl FnOnce(&mut Filters)) -> FilterEdit {
    let mut next = filters.clone();
    edit(&mut next);
    FilterEdit::Changed(next)
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_changed(edit: FilterEdit) -> Filters {
        match edit {
            FilterEdit::Changed(filters) => filters,
            other => panic!("expected a change, got {other:?}"),
        }
    }

    #[test]
    fn typing_changes_only_the_search_text() {
        let filters = Filters::initial();
        let mut sidebar = FilterSidebar::new(&filters);
        let next = expect_changed(sidebar.input('c', &filters));
        assert_eq!(next.text_search.as_deref(), Some("c"));
        assert_eq!(next.max_cost, filters.max_cost);
        assert_eq!(next.radius_km, filters.radius_km);

        let cleared = expect_changed(sidebar.backspace(&next));
        assert_eq!(cleared.text_search, None);
    }

    #[test]
    fn cost_slider_stays_within_bounds() {
        let filters = Filters::initial();
        let mut sidebar = FilterSidebar::new(&filters);
        sidebar.focus = FilterField::MaxCost;
        assert_eq!(sidebar.slide(&filters, 1), FilterEdit::Unchanged);
        let lower = expect_changed(sidebar.slide(&filters, -1));
        assert_eq!(lower.max_cost, Some(2));
    }

    #[test]
    fn radius_accepts_numbers_and_clears_when_empty() {
        let filters = Filters::initial();
        let mut sidebar = FilterSidebar::new(&filters);
        assert_eq!(sidebar.radius_input, "50");
        sidebar.focus = FilterField::Radius;
        assert_eq!(sidebar.input('x', &filters), FilterEdit::Unchanged);
        let wider = expect_changed(sidebar.input('0', &filters));
        assert_eq!(wider.radius_km, Some(500.0));
        sidebar.backspace(&wider);
        sidebar.backspace(&wider);
        let cleared = expect_changed(sidebar.backspace(&wider));
        assert_eq!(cleared.radius_km, None);
    }

    #[test]
    fn committed_tags_refetch() {
        let filters = Filters::initial();
        let mut sidebar = FilterSidebar::new(&filters);
        sidebar.focus = FilterField::Tags;
        assert_eq!(sidebar.input('F', &filters), FilterEdit::Unchanged);
        let next = expect_changed(sidebar.submit(&filters));
        assert_eq!(next.tags, vec!["f".to_string()]);
    }

    #[test]
    fn locate_result_fills_distance_from() {
        let filters = Filters::initial();
        let mut sidebar = FilterSidebar::new(&filters);
        sidebar.focus = FilterField::UseLocation;
        let FilterEdit::Locate(ticket) = sidebar.input(' ', &filters) else {
            panic!("toggle should request a location");
        };
        let next = expect_changed(sidebar.located(
            ticket,
            Ok("51.500000,-0.127800".to_string()),
            &filters,
        ));
        assert_eq!(next.distance_from.as_deref(), Some("51.500000,-0.127800"));
        assert!(!sidebar.locating);
    }

    #[test]
    fn locate_result_after_toggle_off_is_dropped() {
        let filters = Filters::initial();
        let mut sidebar = FilterSidebar::new(&filters);
        sidebar.focus = FilterField::UseLocation;
        let FilterEdit::Locate(ticket) = sidebar.submit(&filters) else {
            panic!("toggle should request a location");
        };
        sidebar.submit(&filters);
        assert_eq!(
            sidebar.located(ticket, Ok("1.000000,2.000000".to_string()), &filters),
            FilterEdit::Unchanged
        );
    }

    #[test]
    fn stale_locate_result_is_dropped() {
        let filters = Filters::initial();
        let mut sidebar = FilterSidebar::new(&filters);
        sidebar.focus = FilterField::UseLocation;
        let FilterEdit::Locate(first) = sidebar.submit(&filters) else {
            panic!("toggle should request a location");
        };
        sidebar.submit(&filters);
        let FilterEdit::Locate(second) = sidebar.submit(&filters) else {
            panic!("toggle should request a location");
        };
        assert_eq!(
            sidebar.located(first, Ok("1.000000,2.000000".to_string()), &filters),
            FilterEdit::Unchanged
        );
        assert!(matches!(
            sidebar.located(second, Ok("3.000000,4.000000".to_string()), &filters),
            FilterEdit::Changed(_)
        ));
    }
}
