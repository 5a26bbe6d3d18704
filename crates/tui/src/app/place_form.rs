use std::time::{Duration, Instant};

use api_types::{
    place::{Cost, Place, PlacePayload},
    tag,
};
use uuid::Uuid;

use crate::client::address::{AddressDetails, AddressSuggestion};

use super::{
    debounce::Debounce,
    form::FormStatus,
    latest::{Latest, Ticket},
    tag_input::TagInput,
};

pub const AUTOCOMPLETE_DELAY: Duration = Duration::from_millis(250);
const AUTOCOMPLETE_MIN_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceField {
    Name,
    Location,
    Description,
    Tags,
    Cost,
    MapsUrl,
    WebsiteUrl,
}

impl PlaceField {
    pub const ORDER: [PlaceField; 7] = [
        Self::Name,
        Self::Location,
        Self::Description,
        Self::Tags,
        Self::Cost,
        Self::MapsUrl,
        Self::WebsiteUrl,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Location => "Location (lat,lon)",
            Self::Description => "Description",
            Self::Tags => "Tags",
            Self::Cost => "Cost",
            Self::MapsUrl => "Google Maps URL",
            Self::WebsiteUrl => "Website",
        }
    }

    fn step(self, forward: bool) -> Self {
        let len = Self::ORDER.len();
        let index = Self::ORDER
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0);
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        Self::ORDER[next]
    }
}

/// Address autocomplete attached to the name field.
#[derive(Debug)]
pub struct AddressLookup {
    pub suggestions: Vec<AddressSuggestion>,
    pub highlighted: Option<usize>,
    pub notice: Option<String>,
    /// Shared by every lookup this form makes.
    pub session: Uuid,
    debounce: Debounce,
    latest: Latest,
}

impl Default for AddressLookup {
    fn default() -> Self {
        Self {
            suggestions: Vec::new(),
            highlighted: None,
            notice: None,
            session: Uuid::new_v4(),
            debounce: Debounce::new(AUTOCOMPLETE_DELAY),
            latest: Latest::default(),
        }
    }
}

impl AddressLookup {
    fn clear(&mut self) {
        self.suggestions.clear();
        self.highlighted = None;
    }

    pub fn is_open(&self) -> bool {
        !self.suggestions.is_empty()
    }
}

#[derive(Debug)]
pub struct PlaceForm {
    pub mode: FormMode,
    pub name: String,
    pub google_place_id: Option<String>,
    pub location: String,
    pub description: String,
    pub tags: Vec<String>,
    pub cost: Option<Cost>,
    pub google_maps_url: String,
    pub website_url: String,
    pub focus: PlaceField,
    pub tag_input: TagInput,
    pub status: FormStatus,
    pub address: AddressLookup,
}

impl PlaceForm {
    pub fn new() -> Self {
        Self {
            mode: FormMode::Create,
            name: String::new(),
            google_place_id: None,
            location: String::new(),
            description: String::new(),
            tags: Vec::new(),
            cost: Some(Cost::Free),
            google_maps_url: String::new(),
            website_url: String::new(),
            focus: PlaceField::Name,
            tag_input: TagInput::default(),
            status: FormStatus::Idle,
            address: AddressLookup::default(),
        }
    }

    pub fn from_place(place: &Place) -> Self {
        Self {
            mode: FormMode::Edit(place.id),
            name: place.name.clone(),
            google_place_id: place.google_place_id.clone(),
            location: place.location.clone().unwrap_or_default(),
            description: place.description.clone().unwrap_or_default(),
            tags: tag::normalize_all(&place.tags),
            cost: place.cost.and_then(Cost::from_ordinal),
            google_maps_url: place.google_maps_url.clone().unwrap_or_default(),
            website_url: place.website_url.clone().unwrap_or_default(),
            ..Self::new()
        }
    }

    /// Builds the request body, or the inline error to show instead.
    pub fn payload(&self) -> Result<PlacePayload, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        Ok(PlacePayload {
            name: Some(name.to_string()),
            google_place_id: self.google_place_id.as_deref().and_then(trimmed),
            location: trimmed(&self.location),
            description: trimmed(&self.description),
            tags: Some(tag::normalize_all(&self.tags)),
            cost: self.cost.map(|cost| i64::from(cost.ordinal())),
            google_maps_url: trimmed(&self.google_maps_url),
            website_url: trimmed(&self.website_url),
        })
    }

    pub fn next_field(&mut self) {
        self.leave_field();
        self.focus = self.focus.step(true);
    }

    pub fn prev_field(&mut self) {
        self.leave_field();
        self.focus = self.focus.step(false);
    }

    fn leave_field(&mut self) {
        self.tag_input.close();
        self.address.clear();
    }

    pub fn input(&mut self, ch: char, now: Instant) {
        match self.focus {
            PlaceField::Name => {
                self.name.push(ch);
                self.name_changed(now);
            }
            PlaceField::Location => self.location.push(ch),
            PlaceField::Description => self.description.push(ch),
            PlaceField::MapsUrl => self.google_maps_url.push(ch),
            PlaceField::WebsiteUrl => self.website_url.push(ch),
            PlaceField::Tags => {
                self.tag_input.input(ch, &mut self.tags);
            }
            PlaceField::Cost => {}
        }
    }

    pub fn backspace(&mut self, now: Instant) {
        match self.focus {
            PlaceField::Name => {
                if self.name.pop().is_some() {
                    self.name_changed(now);
                }
            }
            PlaceField::Location => {
                self.location.pop();
            }
            PlaceField::Description => {
                self.description.pop();
            }
            PlaceField::MapsUrl => {
                self.google_maps_url.pop();
            }
            PlaceField::WebsiteUrl => {
                self.website_url.pop();
            }
            PlaceField::Tags => {
                self.tag_input.backspace(&mut self.tags);
            }
            PlaceField::Cost => {}
        }
    }

    /// Steps the cost selector; from unset it starts at Free.
    pub fn slide_cost(&mut self, step: i8) {
        if self.focus != PlaceField::Cost {
            return;
        }
        let next = match self.cost {
            None => 0,
            Some(cost) => cost.ordinal().saturating_add_signed(step),
        };
        if let Some(cost) = Cost::from_ordinal(i64::from(next)) {
            self.cost = Some(cost);
        }
    }

    pub fn highlight(&mut self, down: bool) {
        match self.focus {
            PlaceField::Name => {
                let count = self.address.suggestions.len();
                if count == 0 {
                    return;
                }
                self.address.highlighted = match (self.address.highlighted, down) {
                    (None, true) => Some(0),
                    (Some(index), true) => Some((index + 1).min(count - 1)),
                    (Some(0) | None, false) => None,
                    (Some(index), false) => Some(index - 1),
                };
            }
            PlaceField::Tags if down => self.tag_input.highlight_next(&self.tags),
            PlaceField::Tags => self.tag_input.highlight_prev(),
            _ => {}
        }
    }

    /// Any name edit unlinks the previous place id and restarts the quiet
    /// period before the next autocomplete query.
    fn name_changed(&mut self, now: Instant) {
        self.google_place_id = None;
        self.address.notice = None;
        if self.name.trim().chars().count() >= AUTOCOMPLETE_MIN_CHARS {
            self.address.debounce.schedule(now);
        } else {
            self.address.debounce.cancel();
            self.address.latest.invalidate();
            self.address.clear();
        }
    }

    /// Returns the query to send once the name has been quiet long enough.
    pub fn poll_autocomplete(&mut self, now: Instant) -> Option<(Ticket, String)> {
        if !self.address.debounce.fire(now) {
            return None;
        }
        Some((self.address.latest.issue(), self.name.trim().to_string()))
    }

    pub fn apply_suggestions(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<AddressSuggestion>, String>,
    ) {
        if !self.address.latest.is_current(ticket) {
            return;
        }
        self.address.highlighted = None;
        match result {
            Ok(suggestions) => {
                self.address.suggestions = suggestions;
                self.address.notice = None;
            }
            Err(message) => {
                self.address.suggestions.clear();
                self.address.notice = Some(message);
            }
        }
    }

    /// Takes the highlighted suggestion; returns the details lookup to issue.
    pub fn choose_suggestion(&mut self) -> Option<(Ticket, String)> {
        let index = self.address.highlighted?;
        let suggestion = self.address.suggestions.get(index)?.clone();
        self.name = suggestion.main_text;
        self.google_place_id = Some(suggestion.place_id.clone());
        self.address.clear();
        self.address.debounce.cancel();
        Some((self.address.latest.issue(), suggestion.place_id))
    }

    pub fn apply_details(&mut self, ticket: Ticket, result: Result<AddressDetails, String>) {
        if !self.address.latest.is_current(ticket) {
            return;
        }
        match result {
            Ok(details) => {
                if let Some(location) = details.location {
                    self.location = location;
                }
                if let Some(maps_url) = details.maps_url {
                    self.google_maps_url = maps_url;
                }
            }
            Err(message) => self.address.notice = Some(message),
        }
    }

    /// True when Enter should act on a dropdown rather than submit.
    pub fn has_pending_choice(&self) -> bool {
        match self.focus {
            PlaceField::Name => self.address.highlighted.is_some(),
            PlaceField::Tags => {
                self.tag_input.highlighted.is_some() || !self.tag_input.buffer.trim().is_empty()
            }
            _ => false,
        }
    }

    /// Closes whichever dropdown is open; false when none was.
    pub fn dismiss(&mut self) -> bool {
        if self.address.is_open() {
            self.address.clear();
            return true;
        }
        if self.tag_input.open {
            self.tag_input.close();
            return true;
        }
        false
    }
}

impl Default for PlaceForm {
    fn default() -> Self {
        Self::new()
    }
}

fn trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
