use api_types::visit::{Visit, VisitPayload};
use chrono::{Local, NaiveDate};

use super::form::FormStatus;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitField {
    Date,
    Rating,
    Notes,
}

/// Editable copy of a visit's three fields.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitDraft {
    pub visit_date: String,
    pub rating: Option<u8>,
    pub notes: String,
    pub focus: VisitField,
}

impl VisitDraft {
    pub fn from_visit(visit: &Visit) -> Self {
        Self {
            visit_date: visit.visit_date.format(DATE_FORMAT).to_string(),
            rating: visit.rating,
            notes: visit.notes.clone().unwrap_or_default(),
            focus: VisitField::Date,
        }
    }

    pub fn on(date: NaiveDate) -> Self {
        Self {
            visit_date: date.format(DATE_FORMAT).to_string(),
            rating: None,
            notes: String::new(),
            focus: VisitField::Date,
        }
    }

    pub fn today() -> Self {
        Self::on(Local::now().date_naive())
    }

    pub fn payload(&self) -> Result<VisitPayload, String> {
        let visit_date = NaiveDate::parse_from_str(self.visit_date.trim(), DATE_FORMAT)
            .map_err(|_| "Date must be YYYY-MM-DD".to_string())?;
        let notes = self.notes.trim();
        Ok(VisitPayload {
            visit_date,
            rating: self.rating,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        })
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            VisitField::Date => VisitField::Rating,
            VisitField::Rating => VisitField::Notes,
            VisitField::Notes => VisitField::Date,
        };
    }

    pub fn prev_field(&mut self) {
        self.focus = match self.focus {
            VisitField::Date => VisitField::Notes,
            VisitField::Rating => VisitField::Date,
            VisitField::Notes => VisitField::Rating,
        };
    }

    pub fn input(&mut self, ch: char) {
        match self.focus {
            VisitField::Date => {
                if ch.is_ascii_digit() || ch == '-' {
                    self.visit_date.push(ch);
                }
            }
            VisitField::Rating => match ch {
                '1'..='5' => self.rating = ch.to_digit(10).map(|n| n as u8),
                '0' => self.rating = None,
                _ => {}
            },
            VisitField::Notes => self.notes.push(ch),
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            VisitField::Date => {
                self.visit_date.pop();
            }
            VisitField::Rating => self.rating = None,
            VisitField::Notes => {
                self.notes.pop();
            }
        }
    }

    /// Left/Right on the rating: 0 stands for unrated.
    pub fn step_rating(&mut self, step: i8) {
        if self.focus != VisitField::Rating {
            return;
        }
        let next = self.rating.unwrap_or(0).saturating_add_signed(step).min(5);
        self.rating = (next > 0).then_some(next);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VisitMode {
    Display,
    Edit(VisitDraft),
    ConfirmDelete,
}

/// One row of the visit log.
#[derive(Debug, Clone)]
pub struct VisitEntry {
    pub visit: Visit,
    pub mode: VisitMode,
    pub status: FormStatus,
}

impl VisitEntry {
    pub fn new(visit: Visit) -> Self {
        Self {
            visit,
            mode: VisitMode::Display,
            status: FormStatus::Idle,
        }
    }

    pub fn edit(&mut self) {
        self.mode = VisitMode::Edit(VisitDraft::from_visit(&self.visit));
        self.status = FormStatus::Idle;
    }

    pub fn confirm_delete(&mut self) {
        self.mode = VisitMode::ConfirmDelete;
    }

    /// Drops any unsaved edit.
    pub fn cancel(&mut self) {
        self.mode = VisitMode::Display;
        self.status = FormStatus::Idle;
    }

    pub fn draft_mut(&mut self) -> Option<&mut VisitDraft> {
        match &mut self.mode {
            VisitMode::Edit(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn rating_label(&self) -> String {
        rating_label(self.visit.rating)
    }
}

pub fn rating_label(rating: Option<u8>) -> String {
    rating
        .map(|rating| format!("{rating}/5"))
        .unwrap_or_else(|| "-".to_string())
}

/// The add-visit form on the detail page.
#[derive(Debug, Clone)]
pub struct NewVisitForm {
    pub draft: VisitDraft,
    pub status: FormStatus,
}

impl NewVisitForm {
    pub fn new() -> Self {
        Self {
            draft: VisitDraft::today(),
            status: FormStatus::Idle,
        }
    }
}

impl Default for NewVisitForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit() -> Visit {
        Visit {
            id: 9,
            visit_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            rating: Some(4),
            notes: Some("Great".to_string()),
        }
    }

    #[test]
    fn draft_round_trips_an_unchanged_visit() {
        let draft = VisitDraft::from_visit(&visit());
        assert_eq!(draft.visit_date, "2024-01-05");
        let payload = draft.payload().unwrap();
        assert_eq!(payload.visit_date, visit().visit_date);
        assert_eq!(payload.rating, Some(4));
        assert_eq!(payload.notes.as_deref(), Some("Great"));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let mut draft = VisitDraft::from_visit(&visit());
        draft.visit_date = "2024-13-40".to_string();
        assert_eq!(draft.payload().unwrap_err(), "Date must be YYYY-MM-DD");
    }

    #[test]
    fn blank_notes_are_sent_as_null() {
        let mut draft = VisitDraft::from_visit(&visit());
        draft.notes = "  ".to_string();
        let json = serde_json::to_value(draft.payload().unwrap()).unwrap();
        assert_eq!(json["notes"], serde_json::Value::Null);
    }

    #[test]
    fn rating_keys_stay_in_range() {
        let mut draft = VisitDraft::on(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        draft.focus = VisitField::Rating;
        draft.step_rating(-1);
        assert_eq!(draft.rating, None);
        draft.input('5');
        draft.step_rating(1);
        assert_eq!(draft.rating, Some(5));
        draft.input('9');
        assert_eq!(draft.rating, Some(5));
        draft.backspace();
        assert_eq!(draft.rating, None);
    }

    #[test]
    fn cancel_discards_the_draft() {
        let mut entry = VisitEntry::new(visit());
        entry.edit();
        if let Some(draft) = entry.draft_mut() {
            draft.notes.push_str(" coffee");
        }
        entry.cancel();
        assert_eq!(entry.mode, VisitMode::Display);
        assert_eq!(entry.visit.notes.as_deref(), Some("Great"));
        assert_eq!(entry.rating_label(), "4/5");
    }
}
