/// Generation counter deciding which in-flight response may still be applied.
///
/// Every request that can be superseded takes a [`Ticket`]; issuing a new one
/// (or calling [`Latest::invalidate`]) makes all earlier tickets stale.
#[derive(Debug, Default)]
pub struct Latest {
    issued: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Latest {
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }

    pub fn invalidate(&mut self) {
        self.issued += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_newest_ticket_is_current() {
        let mut latest = Latest::default();
        let first = latest.issue();
        let second = latest.issue();
        assert!(!latest.is_current(first));
        assert!(latest.is_current(second));
    }

    #[test]
    fn invalidate_discards_outstanding_ticket() {
        let mut latest = Latest::default();
        let ticket = latest.issue();
        latest.invalidate();
        assert!(!latest.is_current(ticket));
    }
}
