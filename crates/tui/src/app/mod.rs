pub mod debounce;
pub mod filters;
pub mod form;
pub mod latest;
pub mod place_form;
pub mod state;
pub mod tag_input;
pub mod visits;

use std::{
    future::Future,
    time::{Duration, Instant},
};

use api_types::{place::Place, visit::Visit};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    client::{
        Client, ClientError,
        address::{AddressClient, AddressDetails, AddressError, AddressSuggestion},
        geo::{LocateError, Locator},
    },
    config::AppConfig,
    error::{AppError, Result},
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

use self::{
    filters::FilterEdit,
    latest::Ticket,
    place_form::{FormMode, PlaceField},
    visits::{NewVisitForm, VisitDraft, VisitMode},
};

pub use self::state::{
    AppState, DetailPage, FormPage, ListFocus, ListPage, Load, Screen, ToastLevel, ToastState,
};

const TICK_RATE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabularyTarget {
    Sidebar,
    Form,
}

/// Result of a background request, applied by the UI loop.
#[derive(Debug)]
pub enum Outcome {
    Places {
        ticket: Ticket,
        result: std::result::Result<Vec<Place>, ClientError>,
    },
    Place {
        id: i64,
        ticket: Ticket,
        result: std::result::Result<Place, ClientError>,
    },
    Vocabulary {
        target: VocabularyTarget,
        tags: Vec<String>,
    },
    PlaceSaved(std::result::Result<Place, ClientError>),
    PlaceDeleted {
        id: i64,
        result: std::result::Result<(), ClientError>,
    },
    VisitSaved {
        place_id: i64,
        /// `None` for a newly added visit.
        visit_id: Option<i64>,
        result: std::result::Result<Visit, ClientError>,
    },
    VisitDeleted {
        place_id: i64,
        visit_id: i64,
        result: std::result::Result<(), ClientError>,
    },
    Suggestions {
        session: Uuid,
        ticket: Ticket,
        result: std::result::Result<Vec<AddressSuggestion>, AddressError>,
    },
    AddressDetails {
        session: Uuid,
        ticket: Ticket,
        result: std::result::Result<AddressDetails, AddressError>,
    },
    Located {
        ticket: Ticket,
        result: std::result::Result<String, LocateError>,
    },
}

pub struct App {
    client: Client,
    address: AddressClient,
    locator: Locator,
    pub state: AppState,
    tx: mpsc::UnboundedSender<Outcome>,
    rx: mpsc::UnboundedReceiver<Outcome>,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("voyager/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let client = Client::new(&config.base_url, http.clone())?;
        let address = AddressClient::new(
            http.clone(),
            &config.places_api_url,
            config.maps_api_key.clone(),
        );
        let locator = Locator::new(http, &config.geolocation_url);
        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            client,
            address,
            locator,
            state: AppState::new(&config.base_url),
            tx,
            rx,
            should_quit: false,
        })
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Initial fetches for the list page.
    pub fn start(&mut self) {
        self.load_places();
        self.load_vocabulary(VocabularyTarget::Sidebar);
    }

    pub async fn run(&mut self) -> Result<()> {
        self.start();
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        while !self.should_quit {
            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            self.tick(Instant::now());
            while let Ok(outcome) = self.rx.try_recv() {
                self.apply(outcome);
            }
        }

        tracing::info!("voyager exiting");
        Ok(())
    }

    /// Waits for the next background result and applies it. Returns false
    /// once no sender is left.
    pub async fn settle(&mut self) -> bool {
        match self.rx.recv().await {
            Some(outcome) => {
                self.apply(outcome);
                true
            }
            None => false,
        }
    }

    /// Fires due debounces and expires the toast.
    pub fn tick(&mut self, now: Instant) {
        self.state.expire_toast(now);

        let Some(form) = self.current_form() else {
            return;
        };
        let Some((ticket, query)) = form.poll_autocomplete(now) else {
            return;
        };
        let session = form.address.session;
        let address = self.address.clone();
        tracing::debug!(%query, "address autocomplete");
        self.spawn(async move {
            Outcome::Suggestions {
                session,
                ticket,
                result: address.autocomplete(&query, session).await,
            }
        });
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if tx.send(task.await).is_err() {
                tracing::debug!("ui loop gone, dropping outcome");
            }
        });
    }

    fn current_form(&mut self) -> Option<&mut place_form::PlaceForm> {
        self.state.form.as_mut()?.form.loaded_mut()
    }

    // Loading

    fn load_places(&mut self) {
        let list = &mut self.state.list;
        let ticket = list.latest.issue();
        if list.places.loaded().is_none() {
            list.places = Load::Loading;
        }
        let filters = list.filters.clone();
        let client = self.client.clone();
        self.spawn(async move {
            Outcome::Places {
                ticket,
                result: client.list_places(&filters).await,
            }
        });
    }

    fn load_place(&self, id: i64, ticket: Ticket) {
        let client = self.client.clone();
        self.spawn(async move {
            Outcome::Place {
                id,
                ticket,
                result: client.get_place(id).await,
            }
        });
    }

    fn load_vocabulary(&self, target: VocabularyTarget) {
        let client = self.client.clone();
        self.spawn(async move {
            let tags = client.list_tags().await.unwrap_or_else(|err| {
                tracing::warn!("tag vocabulary unavailable: {err}");
                Vec::new()
            });
            Outcome::Vocabulary { target, tags }
        });
    }

    fn reload_detail(&mut self) {
        let Some(page) = self.state.detail.as_mut() else {
            return;
        };
        let id = page.id;
        let ticket = page.latest.issue();
        self.load_place(id, ticket);
    }

    // Navigation

    fn open_list(&mut self) {
        self.state.screen = Screen::List;
        self.state.detail = None;
        self.state.form = None;
        self.load_places();
    }

    fn open_detail(&mut self, id: i64) {
        let mut page = DetailPage::new(id);
        let ticket = page.latest.issue();
        self.state.detail = Some(page);
        self.state.form = None;
        self.state.screen = Screen::Detail(id);
        self.load_place(id, ticket);
    }

    fn open_new_place(&mut self) {
        self.state.form = Some(FormPage::create());
        self.state.screen = Screen::NewPlace;
        self.load_vocabulary(VocabularyTarget::Form);
    }

    fn open_edit_place(&mut self, id: i64) {
        let mut page = FormPage::edit();
        let ticket = page.latest.issue();
        self.state.form = Some(page);
        self.state.screen = Screen::EditPlace(id);
        self.load_place(id, ticket);
        self.load_vocabulary(VocabularyTarget::Form);
    }

    fn leave_form(&mut self) {
        match self.state.screen {
            Screen::EditPlace(id) => self.open_detail(id),
            _ => self.open_list(),
        }
    }

    // Input

    pub fn handle_key(&mut self, key: KeyEvent) {
        let action = map_key(key, self.state.is_typing());
        self.handle_action(action);
    }

    pub fn handle_action(&mut self, action: AppAction) {
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }
        match self.state.screen {
            Screen::List => self.list_action(action),
            Screen::Detail(_) => self.detail_action(action),
            Screen::NewPlace | Screen::EditPlace(_) => self.form_action(action),
        }
    }

    fn list_action(&mut self, action: AppAction) {
        if self.state.list.focus == ListFocus::Sidebar {
            self.sidebar_action(action);
            return;
        }
        match action {
            AppAction::Up => self.state.list.select_prev(),
            AppAction::Down => self.state.list.select_next(),
            AppAction::Submit => {
                if let Some(id) = self.state.list.selected_place().map(|place| place.id) {
                    self.open_detail(id);
                }
            }
            AppAction::NextField | AppAction::Input('/') => {
                self.state.list.focus = ListFocus::Sidebar;
            }
            AppAction::Input('n') => self.open_new_place(),
            AppAction::Input('r') => self.load_places(),
            _ => {}
        }
    }

    fn sidebar_action(&mut self, action: AppAction) {
        let list = &mut self.state.list;
        let sidebar = &mut list.sidebar;
        let edit = match action {
            AppAction::Cancel => {
                if sidebar.tags.open {
                    sidebar.tags.close();
                } else {
                    list.focus = ListFocus::Results;
                }
                FilterEdit::Unchanged
            }
            AppAction::NextField => {
                sidebar.next_field();
                FilterEdit::Unchanged
            }
            AppAction::PrevField => {
                sidebar.prev_field();
                FilterEdit::Unchanged
            }
            AppAction::Up => {
                sidebar.highlight(&list.filters, false);
                FilterEdit::Unchanged
            }
            AppAction::Down => {
                sidebar.highlight(&list.filters, true);
                FilterEdit::Unchanged
            }
            AppAction::Left => sidebar.slide(&list.filters, -1),
            AppAction::Right => sidebar.slide(&list.filters, 1),
            AppAction::Backspace => sidebar.backspace(&list.filters),
            AppAction::Submit => sidebar.submit(&list.filters),
            AppAction::Input(ch) => sidebar.input(ch, &list.filters),
            _ => FilterEdit::Unchanged,
        };
        self.apply_filter_edit(edit);
    }

    fn apply_filter_edit(&mut self, edit: FilterEdit) {
        match edit {
            FilterEdit::Changed(filters) => {
                self.state.list.filters = filters;
                self.load_places();
            }
            FilterEdit::Locate(ticket) => {
                let locator = self.locator.clone();
                self.spawn(async move {
                    Outcome::Located {
                        ticket,
                        result: locator.locate().await,
                    }
                });
            }
            FilterEdit::Unchanged => {}
        }
    }

    fn detail_action(&mut self, action: AppAction) {
        let Some(page) = self.state.detail.as_ref() else {
            return;
        };
        if page.new_visit.is_some() {
            return self.new_visit_action(action);
        }
        match page.selected_visit().map(|entry| entry.mode.clone()) {
            Some(VisitMode::Edit(_)) => return self.visit_edit_action(action),
            Some(VisitMode::ConfirmDelete) => return self.visit_delete_action(action),
            _ => {}
        }
        if page.confirm_delete {
            return self.place_delete_action(action);
        }

        let id = page.id;
        match action {
            AppAction::Cancel | AppAction::Input('b') => self.open_list(),
            AppAction::Input('e') => self.open_edit_place(id),
            AppAction::Input('r') => self.reload_detail(),
            _ => {
                let Some(page) = self.state.detail.as_mut() else {
                    return;
                };
                match action {
                    AppAction::Up => page.select_prev(),
                    AppAction::Down => page.select_next(),
                    AppAction::Input('a') => page.new_visit = Some(NewVisitForm::new()),
                    AppAction::Input('v') => {
                        if let Some(entry) = page.selected_visit_mut() {
                            entry.edit();
                        }
                    }
                    AppAction::Input('x') => {
                        if let Some(entry) = page.selected_visit_mut() {
                            entry.confirm_delete();
                        }
                    }
                    AppAction::Input('D') if page.place.loaded().is_some() => {
                        page.confirm_delete = true;
                    }
                    _ => {}
                }
            }
        }
    }

    fn new_visit_action(&mut self, action: AppAction) {
        let Some(page) = self.state.detail.as_mut() else {
            return;
        };
        let place_id = page.id;
        match action {
            AppAction::Cancel => page.new_visit = None,
            AppAction::Submit => {
                let Some(form) = page.new_visit.as_mut() else {
                    return;
                };
                let payload = match form.draft.payload() {
                    Ok(payload) => payload,
                    Err(message) => return form.status.fail(message),
                };
                if !form.status.begin() {
                    return;
                }
                let client = self.client.clone();
                self.spawn(async move {
                    Outcome::VisitSaved {
                        place_id,
                        visit_id: None,
                        result: client.add_visit(place_id, &payload).await,
                    }
                });
            }
            other => {
                if let Some(form) = page.new_visit.as_mut() {
                    edit_draft(&mut form.draft, other);
                }
            }
        }
    }

    fn visit_edit_action(&mut self, action: AppAction) {
        let Some(page) = self.state.detail.as_mut() else {
            return;
        };
        let place_id = page.id;
        let Some(entry) = page.selected_visit_mut() else {
            return;
        };
        let visit_id = entry.visit.id;
        match action {
            AppAction::Cancel => entry.cancel(),
            AppAction::Submit => {
                let Some(draft) = entry.draft_mut() else {
                    return;
                };
                let payload = match draft.payload() {
                    Ok(payload) => payload,
                    Err(message) => return entry.status.fail(message),
                };
                if !entry.status.begin() {
                    return;
                }
                let client = self.client.clone();
                self.spawn(async move {
                    Outcome::VisitSaved {
                        place_id,
                        visit_id: Some(visit_id),
                        result: client.update_visit(visit_id, &payload).await,
                    }
                });
            }
            other => {
                if let Some(draft) = entry.draft_mut() {
                    edit_draft(draft, other);
                }
            }
        }
    }

    fn visit_delete_action(&mut self, action: AppAction) {
        let Some(page) = self.state.detail.as_mut() else {
            return;
        };
        let place_id = page.id;
        let Some(entry) = page.selected_visit_mut() else {
            return;
        };
        match action {
            AppAction::Input('y') | AppAction::Submit => {
                if !entry.status.begin() {
                    return;
                }
                let visit_id = entry.visit.id;
                let client = self.client.clone();
                self.spawn(async move {
                    Outcome::VisitDeleted {
                        place_id,
                        visit_id,
                        result: client.delete_visit(visit_id).await,
                    }
                });
            }
            AppAction::Input('n') | AppAction::Cancel => entry.cancel(),
            _ => {}
        }
    }

    fn place_delete_action(&mut self, action: AppAction) {
        let Some(page) = self.state.detail.as_mut() else {
            return;
        };
        match action {
            AppAction::Input('y') | AppAction::Submit => {
                if !page.deleting.begin() {
                    return;
                }
                let id = page.id;
                let client = self.client.clone();
                self.spawn(async move {
                    Outcome::PlaceDeleted {
                        id,
                        result: client.delete_place(id).await,
                    }
                });
            }
            AppAction::Input('n') | AppAction::Cancel => {
                if !page.deleting.is_submitting() {
                    page.confirm_delete = false;
                }
            }
            _ => {}
        }
    }

    fn form_action(&mut self, action: AppAction) {
        let now = Instant::now();
        if self.current_form().is_none() {
            if action == AppAction::Cancel {
                self.leave_form();
            }
            return;
        }
        let Some(form) = self.current_form() else {
            return;
        };
        match action {
            AppAction::Cancel => {
                if !form.dismiss() {
                    self.leave_form();
                }
            }
            AppAction::NextField => form.next_field(),
            AppAction::PrevField => form.prev_field(),
            AppAction::Up => form.highlight(false),
            AppAction::Down => form.highlight(true),
            AppAction::Left => form.slide_cost(-1),
            AppAction::Right => form.slide_cost(1),
            AppAction::Backspace => form.backspace(now),
            AppAction::Input(ch) => form.input(ch, now),
            AppAction::Submit => self.form_submit(),
            _ => {}
        }
    }

    /// Enter on the form: picks a dropdown entry when one is pending,
    /// otherwise validates and saves.
    fn form_submit(&mut self) {
        let Some(form) = self.current_form() else {
            return;
        };

        if form.has_pending_choice() {
            match form.focus {
                PlaceField::Name => {
                    let session = form.address.session;
                    if let Some((ticket, place_id)) = form.choose_suggestion() {
                        let address = self.address.clone();
                        self.spawn(async move {
                            Outcome::AddressDetails {
                                session,
                                ticket,
                                result: address.details(&place_id, session).await,
                            }
                        });
                    }
                }
                PlaceField::Tags => {
                    form.tag_input.commit(&mut form.tags);
                }
                _ => {}
            }
            return;
        }

        let payload = match form.payload() {
            Ok(payload) => payload,
            Err(message) => return form.status.fail(message),
        };
        if !form.status.begin() {
            return;
        }
        let mode = form.mode;
        let client = self.client.clone();
        self.spawn(async move {
            let result = match mode {
                FormMode::Create => client.create_place(&payload).await,
                FormMode::Edit(id) => client.update_place(id, &payload).await,
            };
            Outcome::PlaceSaved(result)
        });
    }

    // Outcomes

    pub fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Places { ticket, result } => {
                let list = &mut self.state.list;
                if !list.latest.is_current(ticket) {
                    tracing::debug!("dropping stale place list");
                    return;
                }
                match result {
                    Ok(places) => list.set_places(places),
                    Err(err) => list.places = Load::Failed(err.to_string()),
                }
            }
            Outcome::Place { id, ticket, result } => self.apply_place(id, ticket, result),
            Outcome::Vocabulary { target, tags } => match target {
                VocabularyTarget::Sidebar => self.state.list.sidebar.tags.set_vocabulary(tags),
                VocabularyTarget::Form => {
                    if let Some(page) = self.state.form.as_mut() {
                        page.set_vocabulary(tags);
                    }
                }
            },
            Outcome::PlaceSaved(result) => self.apply_place_saved(result),
            Outcome::PlaceDeleted { id, result } => self.apply_place_deleted(id, result),
            Outcome::VisitSaved {
                place_id,
                visit_id,
                result,
            } => self.apply_visit_saved(place_id, visit_id, result),
            Outcome::VisitDeleted {
                place_id,
                visit_id,
                result,
            } => self.apply_visit_deleted(place_id, visit_id, result),
            Outcome::Suggestions {
                session,
                ticket,
                result,
            } => {
                if let Some(form) = self.form_for_session(session) {
                    form.apply_suggestions(ticket, result.map_err(|err| err.to_string()));
                }
            }
            Outcome::AddressDetails {
                session,
                ticket,
                result,
            } => {
                if let Some(form) = self.form_for_session(session) {
                    form.apply_details(ticket, result.map_err(|err| err.to_string()));
                }
            }
            Outcome::Located { ticket, result } => {
                let list = &mut self.state.list;
                let edit =
                    list.sidebar
                        .located(ticket, result.map_err(|err| err.to_string()), &list.filters);
                self.apply_filter_edit(edit);
            }
        }
    }

    fn form_for_session(&mut self, session: Uuid) -> Option<&mut place_form::PlaceForm> {
        self.current_form()
            .filter(|form| form.address.session == session)
    }

    fn apply_place(
        &mut self,
        id: i64,
        ticket: Ticket,
        result: std::result::Result<Place, ClientError>,
    ) {
        match self.state.screen {
            Screen::Detail(current) if current == id => {
                let Some(page) = self.state.detail.as_mut() else {
                    return;
                };
                if !page.latest.is_current(ticket) {
                    return;
                }
                match result {
                    Ok(place) => page.set_place(place),
                    Err(err) => page.place = Load::Failed(err.to_string()),
                }
            }
            Screen::EditPlace(current) if current == id => {
                let Some(page) = self.state.form.as_mut() else {
                    return;
                };
                if !page.latest.is_current(ticket) {
                    return;
                }
                match result {
                    Ok(place) => page.set_place(&place),
                    Err(err) => page.form = Load::Failed(err.to_string()),
                }
            }
            _ => tracing::debug!(id, "dropping place for a page no longer shown"),
        }
    }

    fn apply_place_saved(&mut self, result: std::result::Result<Place, ClientError>) {
        let Some(form) = self.current_form() else {
            return;
        };
        match result {
            Ok(place) => {
                form.status.succeed();
                tracing::info!(id = place.id, "place saved");
                self.state
                    .toast(ToastLevel::Success, format!("Saved {}", place.name));
                self.open_detail(place.id);
            }
            Err(err) => {
                let message = err.to_string();
                form.status.fail(message.clone());
                self.state.toast(ToastLevel::Error, message);
            }
        }
    }

    fn apply_place_deleted(&mut self, id: i64, result: std::result::Result<(), ClientError>) {
        match result {
            Ok(()) => {
                tracing::info!(id, "place deleted");
                self.state.toast(ToastLevel::Success, "Place deleted");
                if self.state.screen == Screen::Detail(id) {
                    self.open_list();
                }
            }
            Err(err) => {
                let message = err.to_string();
                if let Some(page) = self.state.detail.as_mut().filter(|page| page.id == id) {
                    page.deleting.fail(message.clone());
                    page.confirm_delete = false;
                }
                self.state.toast(ToastLevel::Error, message);
            }
        }
    }

    fn apply_visit_saved(
        &mut self,
        place_id: i64,
        visit_id: Option<i64>,
        result: std::result::Result<Visit, ClientError>,
    ) {
        let Some(page) = self.state.detail.as_mut().filter(|page| page.id == place_id) else {
            return;
        };
        match result {
            Ok(_) => {
                if visit_id.is_none() {
                    page.new_visit = None;
                }
                self.state.toast(ToastLevel::Success, "Visit saved");
                self.reload_detail();
            }
            Err(err) => {
                let message = err.to_string();
                match visit_id {
                    Some(visit_id) => {
                        if let Some(entry) = page.visit_mut(visit_id) {
                            entry.status.fail(message.clone());
                        }
                    }
                    None => {
                        if let Some(form) = page.new_visit.as_mut() {
                            form.status.fail(message.clone());
                        }
                    }
                }
                self.state.toast(ToastLevel::Error, message);
            }
        }
    }

    fn apply_visit_deleted(
        &mut self,
        place_id: i64,
        visit_id: i64,
        result: std::result::Result<(), ClientError>,
    ) {
        let Some(page) = self.state.detail.as_mut().filter(|page| page.id == place_id) else {
            return;
        };
        match result {
            Ok(()) => {
                self.state.toast(ToastLevel::Success, "Visit deleted");
                self.reload_detail();
            }
            Err(err) => {
                let message = err.to_string();
                if let Some(entry) = page.visit_mut(visit_id) {
                    entry.mode = VisitMode::Display;
                    entry.status.fail(message.clone());
                }
                self.state.toast(ToastLevel::Error, message);
            }
        }
    }
}

fn edit_draft(draft: &mut VisitDraft, action: AppAction) {
    match action {
        AppAction::NextField => draft.next_field(),
        AppAction::PrevField => draft.prev_field(),
        AppAction::Left => draft.step_rating(-1),
        AppAction::Right => draft.step_rating(1),
        AppAction::Backspace => draft.backspace(),
        AppAction::Input(ch) => draft.input(ch),
        _ => {}
    }
}
