use crate::error::{GameError, Result};
use chrono::{DateTime, Local};
use log::info;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    NotStarted,
    Running,
    Completed,
}

/// One playthrough: which regions were found and when play began.
#[derive(Clone, Debug)]
pub struct GameSession {
    total: usize,
    found: BTreeSet<usize>,
    phase: SessionPhase,
    started_at: Option<Instant>,
    started_wall: Option<DateTime<Local>>,
    completed_after: Option<Duration>,
}

impl GameSession {
    /// A session over `total` regions. Zero regions is not a playable game.
    pub fn new(total: usize) -> Result<Self> {
        if total == 0 {
            return Err(GameError::NoDifferences);
        }
        Ok(Self {
            total,
            found: BTreeSet::new(),
            phase: SessionPhase::NotStarted,
            started_at: None,
            started_wall: None,
            completed_after: None,
        })
    }

    pub fn start(&mut self, now: Instant) {
        self.found.clear();
        self.phase = SessionPhase::Running;
        self.started_at = Some(now);
        self.started_wall = Some(Local::now());
        self.completed_after = None;
        info!("Session started ({} differences).", self.total);
    }

    /// Fresh running state: empty found-set, new start time.
    pub fn restart(&mut self, now: Instant) {
        self.start(now);
    }

    /// Adds `index` to the found-set. Returns false when it was already there
    /// or the session is not running, so nothing is ever counted twice.
    pub fn record_found(&mut self, index: usize, now: Instant) -> Result<bool> {
        if index >= self.total {
            return Err(GameError::InvalidIndex { index, len: self.total });
        }
        if self.phase != SessionPhase::Running || !self.found.insert(index) {
            return Ok(false);
        }
        if self.found.len() == self.total {
            self.phase = SessionPhase::Completed;
            self.completed_after = Some(self.elapsed(now));
            info!(
                "All {} differences found in {}.",
                self.total,
                format_clock(self.elapsed(now))
            );
        }
        Ok(true)
    }

    #[inline(always)]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_completed(&self) -> bool {
        self.found.len() == self.total && self.total > 0
    }

    pub fn is_found(&self, index: usize) -> bool {
        self.found.contains(&index)
    }

    pub fn found(&self) -> &BTreeSet<usize> {
        &self.found
    }

    pub fn progress(&self) -> (usize, usize) {
        (self.found.len(), self.total)
    }

    pub fn score_text(&self) -> String {
        let (found, total) = self.progress();
        format!("{}/{}", found, total)
    }

    /// Time since start; frozen once completed.
    pub fn elapsed(&self, now: Instant) -> Duration {
        if let Some(done) = self.completed_after {
            return done;
        }
        self.started_at.map_or(Duration::ZERO, |t| now.saturating_duration_since(t))
    }

    pub fn started_wall(&self) -> Option<DateTime<Local>> {
        self.started_wall
    }
}

/// `MM:SS`, minutes zero-padded and not wrapped at an hour.
pub fn format_clock(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
