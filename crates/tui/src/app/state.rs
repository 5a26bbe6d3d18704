use std::time::{Duration, Instant};

use api_types::{filter::Filters, place::Place};

use super::{
    filters::FilterSidebar,
    form::FormStatus,
    latest::Latest,
    place_form::PlaceForm,
    visits::{NewVisitForm, VisitEntry, VisitMode},
};

pub const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Detail(i64),
    NewPlace,
    EditPlace(i64),
}

/// Remote data as a page sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum Load<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Load<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn loaded_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFocus {
    Sidebar,
    Results,
}

#[derive(Debug)]
pub struct ListPage {
    pub filters: Filters,
    pub sidebar: FilterSidebar,
    pub places: Load<Vec<Place>>,
    pub selected: usize,
    pub focus: ListFocus,
    pub latest: Latest,
}

impl ListPage {
    pub fn new() -> Self {
        let filters = Filters::initial();
        Self {
            sidebar: FilterSidebar::new(&filters),
            filters,
            places: Load::Loading,
            selected: 0,
            focus: ListFocus::Results,
            latest: Latest::default(),
        }
    }

    pub fn set_places(&mut self, places: Vec<Place>) {
        self.selected = self.selected.min(places.len().saturating_sub(1));
        self.places = Load::Loaded(places);
    }

    pub fn selected_place(&self) -> Option<&Place> {
        self.places.loaded()?.get(self.selected)
    }

    pub fn select_next(&mut self) {
        let count = self.places.loaded().map_or(0, Vec::len);
        if count > 0 {
            self.selected = (self.selected + 1).min(count - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

impl Default for ListPage {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct DetailPage {
    pub id: i64,
    pub place: Load<Place>,
    pub visits: Vec<VisitEntry>,
    pub selected: usize,
    pub new_visit: Option<NewVisitForm>,
    pub confirm_delete: bool,
    pub deleting: FormStatus,
    pub latest: Latest,
}

impl DetailPage {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            place: Load::Loading,
            visits: Vec::new(),
            selected: 0,
            new_visit: None,
            confirm_delete: false,
            deleting: FormStatus::Idle,
            latest: Latest::default(),
        }
    }

    /// Replaces the place and rebuilds the visit log, dropping open edits.
    pub fn set_place(&mut self, place: Place) {
        self.visits = place.visits.iter().cloned().map(VisitEntry::new).collect();
        self.selected = self.selected.min(self.visits.len().saturating_sub(1));
        self.place = Load::Loaded(place);
    }

    pub fn selected_visit(&self) -> Option<&VisitEntry> {
        self.visits.get(self.selected)
    }

    pub fn selected_visit_mut(&mut self) -> Option<&mut VisitEntry> {
        self.visits.get_mut(self.selected)
    }

    pub fn visit_mut(&mut self, visit_id: i64) -> Option<&mut VisitEntry> {
        self.visits.iter_mut().find(|entry| entry.visit.id == visit_id)
    }

    /// True while a visit row or the add-visit form is taking text.
    pub fn is_editing(&self) -> bool {
        self.new_visit.is_some()
            || self
                .selected_visit()
                .is_some_and(|entry| matches!(entry.mode, VisitMode::Edit(_)))
    }

    pub fn select_next(&mut self) {
        if !self.visits.is_empty() {
            self.selected = (self.selected + 1).min(self.visits.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

/// Create or edit page. Edit pages start `Loading` until the place arrives.
#[derive(Debug)]
pub struct FormPage {
    pub form: Load<PlaceForm>,
    pub vocabulary: Vec<String>,
    pub latest: Latest,
}

impl FormPage {
    pub fn create() -> Self {
        Self {
            form: Load::Loaded(PlaceForm::new()),
            vocabulary: Vec::new(),
            latest: Latest::default(),
        }
    }

    pub fn edit() -> Self {
        Self {
            form: Load::Loading,
            vocabulary: Vec::new(),
            latest: Latest::default(),
        }
    }

    pub fn set_place(&mut self, place: &Place) {
        let mut form = PlaceForm::from_place(place);
        form.tag_input.set_vocabulary(self.vocabulary.clone());
        self.form = Load::Loaded(form);
    }

    pub fn set_vocabulary(&mut self, vocabulary: Vec<String>) {
        if let Some(form) = self.form.loaded_mut() {
            form.tag_input.set_vocabulary(vocabulary.clone());
        }
        self.vocabulary = vocabulary;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    pub expires_at: Instant,
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub list: ListPage,
    pub detail: Option<DetailPage>,
    pub form: Option<FormPage>,
    pub toast: Option<ToastState>,
    pub base_url: String,
}

impl AppState {
    pub fn new(base_url: &str) -> Self {
        Self {
            screen: Screen::List,
            list: ListPage::new(),
            detail: None,
            form: None,
            toast: None,
            base_url: base_url.to_string(),
        }
    }

    pub fn toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(ToastState {
            message: message.into(),
            level,
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    pub fn expire_toast(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|toast| now >= toast.expires_at) {
            self.toast = None;
        }
    }

    /// Whether printable keys are text rather than shortcuts.
    pub fn is_typing(&self) -> bool {
        match self.screen {
            Screen::List => self.list.focus == ListFocus::Sidebar,
            Screen::Detail(_) => self.detail.as_ref().is_some_and(DetailPage::is_editing),
            Screen::NewPlace | Screen::EditPlace(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::visit::Visit;
    use chrono::NaiveDate;

    fn place(id: i64, visits: usize) -> Place {
        Place {
            id,
            name: format!("Place {id}"),
            google_place_id: None,
            location: None,
            description: None,
            tags: Vec::new(),
            cost: None,
            google_maps_url: None,
            website_url: None,
            visits: (0..visits)
                .map(|n| Visit {
                    id: n as i64 + 1,
                    visit_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    rating: None,
                    notes: None,
                })
                .collect(),
        }
    }

    #[test]
    fn list_selection_is_clamped_on_reload() {
        let mut page = ListPage::new();
        page.set_places(vec![place(1, 0), place(2, 0), place(3, 0)]);
        page.select_next();
        page.select_next();
        page.select_next();
        assert_eq!(page.selected, 2);
        page.set_places(vec![place(1, 0)]);
        assert_eq!(page.selected_place().map(|p| p.id), Some(1));
        page.set_places(Vec::new());
        assert_eq!(page.selected_place(), None);
    }

    #[test]
    fn reloading_a_place_resets_visit_rows() {
        let mut page = DetailPage::new(1);
        page.set_place(place(1, 2));
        page.select_next();
        if let Some(entry) = page.selected_visit_mut() {
            entry.edit();
        }
        assert!(page.is_editing());
        page.set_place(place(1, 1));
        assert_eq!(page.selected, 0);
        assert!(!page.is_editing());
    }

    #[test]
    fn edit_page_keeps_vocabulary_that_arrives_first() {
        let mut page = FormPage::edit();
        page.set_vocabulary(vec!["park".to_string()]);
        page.set_place(&place(3, 0));
        let form = page.form.loaded().unwrap();
        assert_eq!(form.tag_input.vocabulary(), ["park".to_string()]);
    }

    #[test]
    fn typing_mode_follows_focus() {
        let mut state = AppState::new("http://localhost:8000");
        assert!(!state.is_typing());
        state.list.focus = ListFocus::Sidebar;
        assert!(state.is_typing());
        state.screen = Screen::NewPlace;
        assert!(state.is_typing());
    }
}
