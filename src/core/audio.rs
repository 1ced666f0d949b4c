use log::{debug, warn};

// Sound effect assets
pub const SFX_CORRECT_PATH: &str = "assets/sounds/correct.mp3";
pub const SFX_WRONG_PATH: &str = "assets/sounds/wrong.mp3";
pub const SFX_HINT_PATH: &str = "assets/sounds/hint.mp3";
pub const SFX_SUCCESS_PATH: &str = "assets/sounds/success.mp3";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Found,
    Miss,
    Hint,
    Complete,
}

impl Cue {
    pub const fn asset_path(self) -> &'static str {
        match self {
            Cue::Found => SFX_CORRECT_PATH,
            Cue::Miss => SFX_WRONG_PATH,
            Cue::Hint => SFX_HINT_PATH,
            Cue::Complete => SFX_SUCCESS_PATH,
        }
    }
}

/// Anything that can make a cue audible.
pub trait CueSink {
    fn play(&mut self, cue: Cue) -> Result<(), String>;
}

/// Headless sink: cues only show up in the log.
#[derive(Debug, Default)]
pub struct LogCues;

impl CueSink for LogCues {
    fn play(&mut self, cue: Cue) -> Result<(), String> {
        debug!("Cue {:?} ({})", cue, cue.asset_path());
        Ok(())
    }
}

/// Wraps a sink with the mute switch. Playback is best-effort.
pub struct CuePlayer {
    sink: Box<dyn CueSink>,
    enabled: bool,
}

impl CuePlayer {
    pub fn new(sink: Box<dyn CueSink>, enabled: bool) -> Self {
        Self { sink, enabled }
    }

    pub fn headless(enabled: bool) -> Self {
        Self::new(Box::new(LogCues), enabled)
    }

    pub fn play(&mut self, cue: Cue) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.sink.play(cue) {
            warn!("Audio playback failed for {:?}: {}", cue, e);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Flips the mute switch and returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }
}
