use std::time::{Duration, Instant};

/// Deadline that fires once after input has been quiet for `delay`.
#[derive(Debug)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Restarts the quiet period from `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once, on the first call at or after the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(250);

    #[test]
    fn fires_once_after_the_delay() {
        let start = Instant::now();
        let mut debounce = Debounce::new(DELAY);
        debounce.schedule(start);
        assert!(!debounce.fire(start + Duration::from_millis(100)));
        assert!(debounce.fire(start + DELAY));
        assert!(!debounce.fire(start + DELAY * 2));
    }

    #[test]
    fn rescheduling_pushes_the_deadline_back() {
        let start = Instant::now();
        let mut debounce = Debounce::new(DELAY);
        debounce.schedule(start);
        debounce.schedule(start + Duration::from_millis(200));
        assert!(!debounce.fire(start + DELAY));
        assert!(debounce.fire(start + Duration::from_millis(450)));
    }

    #[test]
    fn cancel_clears_the_deadline() {
        let start = Instant::now();
        let mut debounce = Debounce::new(DELAY);
        debounce.schedule(start);
        debounce.cancel();
        assert!(!debounce.is_pending());
        assert!(!debounce.fire(start + DELAY));
    }
}
