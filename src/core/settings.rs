use crate::config::{CLICK_TOLERANCE_PERCENT, HINT_DURATION};
use configparser::ini::Ini;
use log::{info, warn};
use std::fs;
use std::path::Path;
use std::time::Duration;

const SECTION: &str = "Game";

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    pub sound_enabled: bool,
    pub hint_duration: Duration,
    pub click_tolerance: f64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            hint_duration: HINT_DURATION,
            click_tolerance: CLICK_TOLERANCE_PERCENT,
        }
    }
}

/// Creates the settings file with default values.
fn create_default_file(path: &Path) -> Result<(), std::io::Error> {
    info!("Settings file not found, creating defaults in '{}'.", path.display());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let defaults = PlayerSettings::default();
    let mut conf = Ini::new_cs();
    conf.set(SECTION, "SoundEnabled", Some(if defaults.sound_enabled { "1" } else { "0" }.to_string()));
    conf.set(SECTION, "HintDurationMs", Some(defaults.hint_duration.as_millis().to_string()));
    conf.set(SECTION, "ClickTolerance", Some(defaults.click_tolerance.to_string()));
    conf.write(path)
}

/// Reads the settings INI, falling back to defaults key by key.
pub fn load(path: &Path) -> PlayerSettings {
    let defaults = PlayerSettings::default();
    if !path.exists() {
        if let Err(e) = create_default_file(path) {
            warn!("Failed to create default settings file: {}", e);
        }
        return defaults;
    }

    let mut conf = Ini::new_cs();
    if let Err(e) = conf.load(path) {
        warn!("Failed to load '{}' ({}), using default settings.", path.display(), e);
        return defaults;
    }
    from_ini(&conf)
}

fn from_ini(conf: &Ini) -> PlayerSettings {
    let defaults = PlayerSettings::default();
    let sound_enabled = match conf.get(SECTION, "SoundEnabled").map(|v| v.trim().parse::<u8>()) {
        Some(Ok(v)) => v != 0,
        Some(Err(_)) => {
            warn!("Ignoring invalid SoundEnabled, using {}.", u8::from(defaults.sound_enabled));
            defaults.sound_enabled
        }
        None => defaults.sound_enabled,
    };
    let hint_duration = match conf.get(SECTION, "HintDurationMs").map(|v| v.trim().parse::<u64>()) {
        Some(Ok(ms)) => Duration::from_millis(ms),
        Some(Err(_)) => {
            warn!("Ignoring invalid HintDurationMs, using {}.", defaults.hint_duration.as_millis());
            defaults.hint_duration
        }
        None => defaults.hint_duration,
    };
    let click_tolerance = match conf.get(SECTION, "ClickTolerance").map(|v| v.trim().parse::<f64>()) {
        Some(Ok(v)) if v.is_finite() && v >= 0.0 => v,
        Some(_) => {
            warn!("Ignoring invalid ClickTolerance, using {}.", defaults.click_tolerance);
            defaults.click_tolerance
        }
        None => defaults.click_tolerance,
    };
    PlayerSettings { sound_enabled, hint_duration, click_tolerance }
}
