use crate::config::{COMPLETION_BANNER_DELAY, TIMER_TICK_INTERVAL, WRONG_MARK_DURATION};
use crate::core::audio::{Cue, CuePlayer};
use crate::core::schedule::ScheduledTask;
use crate::core::settings::PlayerSettings;
use crate::error::Result;
use crate::game::hint::pick_hint_candidate;
use crate::game::matching::{find_match, normalize_click, DisplayRect, PointerClick};
use crate::game::puzzle::{GameConfig, ImageSide};
use crate::game::region::{DifferenceRegion, ImagePoint};
use crate::game::session::{format_clock, GameSession, SessionPhase};
use log::{debug, info};
use rand::rngs::StdRng;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClickOutcome {
    /// No geometry yet, or the session is over.
    Ignored,
    Found { index: usize, completed: bool },
    Miss { point: ImagePoint },
}

/// Box drawn over a region on both images.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Marker {
    fn for_region(index: usize, region: &DifferenceRegion) -> Self {
        Self { index, x: region.x, y: region.y, width: region.width, height: region.height }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChecklistEntry {
    pub number: usize,
    pub label: String,
    pub found: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionSummary {
    pub time: String,
    pub score: String,
    pub started: Option<String>,
}

/// Everything a renderer needs, recomputed from state on demand.
#[derive(Clone, Debug, PartialEq)]
pub struct GameView {
    pub title: String,
    pub score: String,
    pub timer: String,
    pub found_markers: Vec<Marker>,
    pub hint_marker: Option<Marker>,
    pub wrong_marks: Vec<(ImageSide, ImagePoint)>,
    pub checklist: Vec<ChecklistEntry>,
    pub completion: Option<CompletionSummary>,
    pub sound_enabled: bool,
}

#[derive(Clone, Copy, Debug)]
struct WrongMark {
    side: ImageSide,
    point: ImagePoint,
    expiry: ScheduledTask,
}

pub struct State {
    config: GameConfig,
    session: GameSession,
    tolerance: f64,
    hint_duration: Duration,
    rects: [Option<DisplayRect>; 2],
    cues: CuePlayer,
    rng: StdRng,
    timer_tick: ScheduledTask,
    timer_text: String,
    hint: Option<usize>,
    hint_expiry: ScheduledTask,
    wrong_marks: Vec<WrongMark>,
    banner: ScheduledTask,
    banner_visible: bool,
}

#[inline(always)]
fn side_slot(side: ImageSide) -> usize {
    match side {
        ImageSide::Original => 0,
        ImageSide::Modified => 1,
    }
}

impl State {
    /// Validates the config and starts a running session at `now`.
    pub fn new(
        config: GameConfig,
        settings: &PlayerSettings,
        cues: CuePlayer,
        rng: StdRng,
        now: Instant,
    ) -> Result<Self> {
        config.validate_for_play()?;
        let mut session = GameSession::new(config.differences.len())?;
        session.start(now);
        info!("Starting '{}'.", config.game_title);
        Ok(Self {
            config,
            session,
            tolerance: settings.click_tolerance,
            hint_duration: settings.hint_duration,
            rects: [None, None],
            cues,
            rng,
            timer_tick: ScheduledTask::every(now, TIMER_TICK_INTERVAL),
            timer_text: format_clock(Duration::ZERO),
            hint: None,
            hint_expiry: ScheduledTask::idle(),
            wrong_marks: Vec::new(),
            banner: ScheduledTask::idle(),
            banner_visible: false,
        })
    }

    /// Records where an image ended up on screen. An empty rect means the
    /// image is not laid out yet and clicks on it are ignored.
    pub fn set_display_rect(&mut self, side: ImageSide, rect: DisplayRect) {
        self.rects[side_slot(side)] = rect.is_measured().then_some(rect);
    }

    pub fn handle_click(&mut self, side: ImageSide, click: PointerClick, now: Instant) -> ClickOutcome {
        if self.session.phase() != SessionPhase::Running {
            return ClickOutcome::Ignored;
        }
        let Some(rect) = self.rects[side_slot(side)] else {
            debug!("Click on {:?} before it was measured, ignoring.", side);
            return ClickOutcome::Ignored;
        };

        let point = normalize_click(click, rect);
        debug!("Click at {:.2}%, {:.2}%", point.x, point.y);

        let hit = find_match(point, &self.config.differences, self.session.found(), self.tolerance);
        match hit {
            Some(index) if matches!(self.session.record_found(index, now), Ok(true)) => {
                if self.hint == Some(index) {
                    self.clear_hint();
                }
                self.cues.play(Cue::Found);
                let completed = self.session.is_completed();
                if completed {
                    self.finish(now);
                }
                ClickOutcome::Found { index, completed }
            }
            _ => {
                self.wrong_marks.push(WrongMark {
                    side,
                    point,
                    expiry: ScheduledTask::once(now, WRONG_MARK_DURATION),
                });
                self.cues.play(Cue::Miss);
                ClickOutcome::Miss { point }
            }
        }
    }

    fn finish(&mut self, now: Instant) {
        self.timer_tick.cancel();
        self.timer_text = format_clock(self.session.elapsed(now));
        self.clear_hint();
        self.cues.play(Cue::Complete);
        self.banner.reschedule_once(now, COMPLETION_BANNER_DELAY);
    }

    /// Highlights a random unfound region until the hint expires. Any hint
    /// already showing is replaced, not stacked.
    pub fn show_hint(&mut self, now: Instant) -> Option<usize> {
        if self.session.phase() != SessionPhase::Running {
            return None;
        }
        self.clear_hint();
        let index = pick_hint_candidate(&self.config.differences, self.session.found(), &mut self.rng)?;
        self.hint = Some(index);
        self.hint_expiry.reschedule_once(now, self.hint_duration);
        self.cues.play(Cue::Hint);
        debug!("Hint shows difference {}.", index + 1);
        Some(index)
    }

    fn clear_hint(&mut self) {
        self.hint_expiry.cancel();
        self.hint = None;
    }

    /// Fires whatever is due.
    pub fn tick(&mut self, now: Instant) {
        if self.timer_tick.poll(now) {
            self.timer_text = format_clock(self.session.elapsed(now));
        }
        if self.hint_expiry.poll(now) {
            self.hint = None;
        }
        self.wrong_marks.retain_mut(|mark| !mark.expiry.poll(now));
        if self.banner.poll(now) {
            self.banner_visible = true;
        }
    }

    pub fn restart(&mut self, now: Instant) {
        self.session.restart(now);
        self.clear_hint();
        self.wrong_marks.clear();
        self.banner.cancel();
        self.banner_visible = false;
        self.timer_tick = ScheduledTask::every(now, TIMER_TICK_INTERVAL);
        self.timer_text = format_clock(Duration::ZERO);
    }

    /// Ends this screen. Pending timers go with it.
    pub fn dispose(self) -> GameConfig {
        info!("Leaving '{}' at {}.", self.config.game_title, self.session.score_text());
        self.config
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.cues.toggle()
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn view(&self) -> GameView {
        let regions = &self.config.differences;
        let found_markers = self
            .session
            .found()
            .iter()
            .filter_map(|&i| regions.get(i).map(|r| Marker::for_region(i, r)))
            .collect();
        let hint_marker = self.hint.and_then(|i| regions.get(i).map(|r| Marker::for_region(i, r)));
        let checklist = regions
            .iter()
            .enumerate()
            .map(|(i, r)| ChecklistEntry { number: i + 1, label: r.label(i), found: self.session.is_found(i) })
            .collect();
        let completion = self.banner_visible.then(|| CompletionSummary {
            time: self.timer_text.clone(),
            score: self.session.score_text(),
            started: self
                .session
                .started_wall()
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        });

        GameView {
            title: self.config.game_title.clone(),
            score: self.session.score_text(),
            timer: self.timer_text.clone(),
            found_markers,
            hint_marker,
            wrong_marks: self.wrong_marks.iter().map(|m| (m.side, m.point)).collect(),
            checklist,
            completion,
            sound_enabled: self.cues.is_enabled(),
        }
    }
}
