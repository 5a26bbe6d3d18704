/// Submit lifecycle shared by every form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormStatus {
    #[default]
    Idle,
    Submitting,
    Error(String),
}

impl FormStatus {
    /// Moves to `Submitting`; false (and no change) if a submit is already
    /// in flight.
    pub fn begin(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        *self = Self::Submitting;
        true
    }

    pub fn succeed(&mut self) {
        *self = Self::Idle;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        *self = Self::Error(message.into());
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_submit_is_refused_while_in_flight() {
        let mut status = FormStatus::default();
        assert!(status.begin());
        assert!(!status.begin());
        status.succeed();
        assert!(status.begin());
    }

    #[test]
    fn failure_allows_retry() {
        let mut status = FormStatus::default();
        status.begin();
        status.fail("boom");
        assert_eq!(status.error(), Some("boom"));
        assert!(status.begin());
        assert_eq!(status.error(), None);
    }
}
