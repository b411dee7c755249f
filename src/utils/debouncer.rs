use std::time::{Duration, Instant};

/// Tracks when an action should fire after a period of inactivity.
///
/// Every method takes the current `Instant` so callers (and tests) own the clock.
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// The duration to wait after the last event before triggering
    delay: Duration,
    /// When the last event occurred
    last_event: Option<Instant>,
    /// Whether we have a pending trigger
    pending: bool,
}

impl Debouncer {
    /// Create a new debouncer with the specified delay in milliseconds
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            last_event: None,
            pending: false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Register that an event occurred, restarting the quiet window
    pub fn trigger(&mut self, now: Instant) {
        self.last_event = Some(now);
        self.pending = true;
    }

    /// Returns true exactly once per quiet window that has fully elapsed
    pub fn should_execute(&mut self, now: Instant) -> bool {
        if !self.pending {
            return false;
        }

        if let Some(last) = self.last_event {
            if now.saturating_duration_since(last) >= self.delay {
                self.pending = false;
                self.last_event = None;
                return true;
            }
        }
        false
    }

    /// Get the time remaining before the action will trigger
    /// Returns None if no action is pending
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        if !self.pending {
            return None;
        }

        self.last_event
            .map(|last| self.delay.saturating_sub(now.saturating_duration_since(last)))
    }

    /// Reset the debouncer, canceling any pending action
    pub fn reset(&mut self) {
        self.last_event = None;
        self.pending = false;
    }

    /// Check if there's a pending action
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
