use std::time::{Duration, Instant};

use crate::session::PlaybackStatus;

/// Paces seek bar refreshes: one sample per interval, and only while playing.
#[derive(Debug)]
pub struct PositionPoller {
    interval: Duration,
    next_due: Option<Instant>,
}

impl PositionPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Start polling on `Playing` (first sample due at once), stop on anything else.
    pub fn on_status(&mut self, status: PlaybackStatus, now: Instant) {
        if status == PlaybackStatus::Playing {
            if self.next_due.is_none() {
                self.next_due = Some(now);
            }
        } else {
            self.next_due = None;
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// True when a sample should be taken at `now`; schedules the next one.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(at) if now >= at => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}
