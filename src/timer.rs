use std::time::{Duration, Instant};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// A repeating one-second schedule driven by the event loop's clock.
///
/// Nothing fires on its own: the owner calls [`TickSchedule::due`] with the
/// current instant and gets back the number of whole ticks that elapsed.
/// Cancelling clears the pending deadline so no stale tick can fire after a
/// pause or reset.
#[derive(Debug, Clone, Default)]
pub struct TickSchedule {
    next_at: Option<Instant>,
}

impl TickSchedule {
    pub fn start(&mut self, now: Instant) {
        self.next_at = Some(now + TICK_INTERVAL);
    }

    pub fn cancel(&mut self) {
        self.next_at = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_at.is_some()
    }

    /// Consume and count every tick whose deadline is at or before `now`.
    pub fn due(&mut self, now: Instant) -> u32 {
        let Some(mut next) = self.next_at else {
            return 0;
        };
        let mut fired = 0;
        while next <= now {
            fired += 1;
            next += TICK_INTERVAL;
        }
        self.next_at = Some(next);
        fired
    }
}
