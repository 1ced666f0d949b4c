use std::time::Duration;

// Window
pub const WINDOW_TITLE: &str = "Spot the Difference";
pub const DEFAULT_DISPLAY_WIDTH: f64 = 640.0;
pub const DEFAULT_DISPLAY_HEIGHT: f64 = 480.0;

// Paths
pub const DEFAULT_GAME_DATA_PATH: &str = "game-data.json";
pub const DEFAULT_SAVE_PATH: &str = "game-config.json";
pub const SETTINGS_INI_PATH: &str = "save/settings.ini";

// Matching
pub const CLICK_TOLERANCE_PERCENT: f64 = 4.0; // Leniency added to each half-extent, in % of image size
pub const PERCENT_MIN: f64 = 0.0;
pub const PERCENT_MAX: f64 = 100.0;

// Authoring
pub const DEFAULT_REGION_SIZE: f64 = 10.0; // Box dropped around a marked point, in % of image size
pub const MARKING_MESSAGE_DURATION: Duration = Duration::from_millis(3000);

// Timers
pub const TIMER_TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const HINT_DURATION: Duration = Duration::from_millis(3000);
pub const WRONG_MARK_DURATION: Duration = Duration::from_millis(350);
pub const COMPLETION_BANNER_DELAY: Duration = Duration::from_millis(500);
