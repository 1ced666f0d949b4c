use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Repeat {
    Once,
    Every(Duration),
}

/// A deadline owned by whoever polls it. Nothing runs on its own: the owner
/// calls `poll` with the current time, so a cancelled task can never fire.
#[derive(Clone, Copy, Debug)]
pub struct ScheduledTask {
    deadline: Option<Instant>,
    repeat: Repeat,
}

impl Default for ScheduledTask {
    fn default() -> Self {
        Self::idle()
    }
}

impl ScheduledTask {
    pub const fn idle() -> Self {
        Self { deadline: None, repeat: Repeat::Once }
    }

    pub fn once(now: Instant, delay: Duration) -> Self {
        Self { deadline: Some(now + delay), repeat: Repeat::Once }
    }

    pub fn every(now: Instant, interval: Duration) -> Self {
        Self { deadline: Some(now + interval), repeat: Repeat::Every(interval) }
    }

    /// Replaces whatever was pending with a new one-shot.
    pub fn reschedule_once(&mut self, now: Instant, delay: Duration) {
        self.cancel();
        *self = Self::once(now, delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[inline(always)]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true when the deadline has passed. One-shots disarm; periodic
    /// tasks re-arm one interval later, skipping ahead if polling fell behind.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };
        if now < deadline {
            return false;
        }
        self.deadline = match self.repeat {
            Repeat::Once => None,
            Repeat::Every(interval) => {
                let next = deadline + interval;
                Some(if next <= now { now + interval } else { next })
            }
        };
        true
    }
}
