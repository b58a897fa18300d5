use std::time::{Duration, Instant};

use super::WatchEvent;

/// Upper bound on idle sleeps so a closed watch is noticed promptly.
const IDLE_POLL: Duration = Duration::from_millis(500);

/// Pure debouncer: only handles timing and event coalescing for one path.
pub(super) struct Debouncer {
    pub(super) pending: Option<WatchEvent>,
    pub(super) last_event: Option<Instant>,
    window: Duration,
}

impl Debouncer {
    pub(super) fn new(window: Duration) -> Self {
        Self {
            pending: None,
            last_event: None,
            window,
        }
    }

    /// Add an event, applying coalescing rules:
    /// - Invalidated + Changed → Changed (file was replaced in place)
    /// - Changed + Invalidated → Invalidated (file went away)
    /// - Same kind: first event wins
    ///
    /// Every event restarts the quiet period.
    pub(super) fn add(&mut self, event: WatchEvent) {
        use WatchEvent::*;

        self.pending = match (self.pending, event) {
            (None, event) => Some(event),
            (Some(PathInvalidated), ContentChanged) => {
                crate::debug!("watch"; "restore invalidated->changed");
                Some(ContentChanged)
            }
            (Some(ContentChanged), PathInvalidated) => {
                crate::debug!("watch"; "upgrade changed->invalidated");
                Some(PathInvalidated)
            }
            (existing, _) => existing,
        };
        self.last_event = Some(Instant::now());
    }

    /// Take the coalesced event once the quiet period has elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<WatchEvent> {
        if !self.is_ready() {
            return None;
        }
        self.last_event = None;
        self.pending.take()
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };
        last_event.elapsed() >= self.window && self.pending.is_some()
    }

    /// Precise sleep duration until next possible ready time.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return IDLE_POLL;
        };

        self.window
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}
